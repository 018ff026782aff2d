use log::{debug, trace};

use crate::{lexer::prelude::{lex, LexResult, Lexer, Spanned, Token}, utils::prelude::{Position, SrcSpan}};
use super::error::{ParseError, ParseErrorType};
use super::ast::{Parsed, Program, Statement};
use super::expression::{Expression, Identifier};

pub trait Parse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub trait InfixParse<T: Iterator<Item = LexResult>>
    where Self: Sized,
{
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError>;
}

pub struct Parser<T: Iterator<Item = LexResult>> {
    pub current_token: Spanned,
    pub next_token: Spanned,
    pub previous_token: Option<Spanned>,
    pub comments: Vec<SrcSpan>,
    pub errors: Vec<ParseError>,

    panic_mode: bool,
    last_location: SrcSpan,
    last_position: Position,
    tokens: T,
}

impl<T: Iterator<Item = LexResult>> Parser<T> {
    pub fn new(input: T) -> Self {
        let eof = Spanned::new(Token::Eof, SrcSpan::default(), Position::default());

        let mut parser = Self {
            current_token: eof.clone(),
            next_token: eof,
            previous_token: None,
            comments: vec![],
            errors: vec![],

            panic_mode: false,
            last_location: SrcSpan::default(),
            last_position: Position::default(),
            tokens: input,
        };

        parser.step();
        parser.step();
        parser.previous_token = None;

        parser
    }

    pub fn step(&mut self) {
        let _ = self.next_token();
    }

    /// Consumes the current token and returns it.
    pub fn next_token(&mut self) -> Spanned {
        let fetched = self.fetch();
        let next = std::mem::replace(&mut self.next_token, fetched);
        let current = std::mem::replace(&mut self.current_token, next);

        self.previous_token = Some(current.clone());

        current
    }

    fn fetch(&mut self) -> Spanned {
        loop {
            match self.tokens.next() {
                Some(Ok(Spanned { token: Token::Comment, location, .. })) => {
                    self.comments.push(location)
                },
                Some(Err(error)) => {
                    debug!("lexical error {:?} at {}", error.error, error.position);

                    let (span, position) = (error.location, error.position);

                    self.errors.push(ParseError {
                        error: ParseErrorType::LexError { error },
                        span,
                        position,
                    });
                },
                Some(Ok(spanned)) => {
                    self.last_location = SrcSpan::from(spanned.location.end, spanned.location.end);
                    self.last_position = spanned.position;

                    return spanned;
                },
                None => {
                    return Spanned::new(Token::Eof, self.last_location, self.last_position);
                }
            }
        }
    }

    pub fn check(&self, token: &Token) -> bool {
        self.current_token.token == *token
    }

    pub fn is_at_end(&self) -> bool {
        self.check(&Token::Eof)
    }

    /// Consumes the current token when it matches.
    pub fn eat(&mut self, token: &Token) -> Option<Spanned> {
        if self.check(token) {
            Some(self.next_token())
        } else {
            None
        }
    }

    pub fn current_precedence(&self) -> Precedence {
        Precedence::from(&self.current_token.token)
    }

    pub fn error_at_current(&self, error: ParseErrorType) -> ParseError {
        let error = if matches!(error, ParseErrorType::UnexpectedToken { .. }) && self.is_at_end() {
            ParseErrorType::UnexpectedEof
        } else {
            error
        };

        ParseError {
            error,
            span: self.current_token.location,
            position: self.current_token.position,
        }
    }

    pub fn expect_one(&mut self, token: Token) -> Result<Spanned, ParseError> {
        match self.eat(&token) {
            Some(spanned) => Ok(spanned),
            None => Err(self.error_at_current(ParseErrorType::UnexpectedToken {
                token: self.current_token.token.clone(),
                expected: vec![token.as_literal()],
            }))
        }
    }

    pub fn expect_ident(&mut self) -> Result<Identifier, ParseError> {
        match &self.current_token.token {
            Token::Ident(_) => {
                let Spanned { token, location, .. } = self.next_token();

                match token {
                    Token::Ident(value) => Ok(Identifier { value, location }),
                    _ => unreachable!("checked to be an identifier"),
                }
            },
            Token::Eof => Err(self.error_at_current(ParseErrorType::UnexpectedEof)),
            _ => Err(self.error_at_current(ParseErrorType::ExpectedIdent))
        }
    }

    /// A missing `;` is reported right after the previous token.
    pub fn expect_semicolon(&mut self) -> Result<SrcSpan, ParseError> {
        match self.eat(&Token::Semicolon) {
            Some(spanned) => Ok(spanned.location),
            None => {
                let (span, position) = match &self.previous_token {
                    Some(previous) => (
                        SrcSpan::from(previous.location.end, previous.location.end),
                        previous.position
                    ),
                    None => (self.current_token.location, self.current_token.position)
                };

                Err(ParseError { error: ParseErrorType::MissingSemicolon, span, position })
            }
        }
    }

    /// Records a diagnostic unless the parser is already panicking.
    pub fn report(&mut self, error: ParseError) {
        if self.panic_mode {
            trace!("suppressed {:?} while in panic mode", error.error);
            return;
        }

        debug!("syntax error {:?} at {}", error.error, error.position);

        self.panic_mode = true;
        self.errors.push(error);
    }

    /// Skips tokens until a `;` was consumed, or the current token can
    /// start a statement or close a block.
    pub fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(self.previous_token, Some(Spanned { token: Token::Semicolon, .. })) {
                break;
            }

            if self.current_token.token.starts_statement() || self.check(&Token::RBrace) {
                break;
            }

            self.step();
        }

        trace!("synchronized at {:?}", self.current_token.token);
    }

    /// Parses statements until `terminator` (left unconsumed) or end of file,
    /// recovering from every failing statement.
    pub fn parse_statements(&mut self, terminator: &Token) -> Vec<Statement> {
        let mut statements = vec![];

        while !self.check(terminator) && !self.is_at_end() {
            let start = self.current_token.location;
            self.panic_mode = false;

            match Statement::parse(self, None) {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.report(error);
                    self.synchronize();

                    if self.current_token.location == start && !self.is_at_end() {
                        self.step();
                        self.synchronize();
                    }
                }
            }
        }

        statements
    }

    /// Parses the whole token stream, always producing a best-effort program.
    pub fn parse_program(&mut self) -> Parsed {
        let start = self.current_token.location.start;
        let statements = self.parse_statements(&Token::Eof);
        let end = self.current_token.location.end;

        self.errors.sort_by_key(|error| error.span.start);

        Parsed {
            program: Program {
                statements,
                location: SrcSpan { start, end }
            },
            comments: std::mem::take(&mut self.comments),
            errors: std::mem::take(&mut self.errors),
        }
    }

    pub fn parse(&mut self) -> Result<Parsed, Vec<ParseError>> {
        let parsed = self.parse_program();

        if parsed.errors.is_empty() {
            Ok(parsed)
        } else {
            Err(parsed.errors)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Assign,
    Ternary,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equals,
    LessGreater,
    Shift,
    Sum,
    Product,
    Power,
    Prefix,
    Call,
}

impl Precedence {
    /// The precedence right-associative operators parse their right side with.
    pub fn lower(self) -> Self {
        match self {
            Self::Lowest | Self::Assign => Self::Lowest,
            Self::Ternary => Self::Assign,
            Self::Or => Self::Ternary,
            Self::And => Self::Or,
            Self::BitOr => Self::And,
            Self::BitXor => Self::BitOr,
            Self::BitAnd => Self::BitXor,
            Self::Equals => Self::BitAnd,
            Self::LessGreater => Self::Equals,
            Self::Shift => Self::LessGreater,
            Self::Sum => Self::Shift,
            Self::Product => Self::Sum,
            Self::Power => Self::Product,
            Self::Prefix => Self::Power,
            Self::Call => Self::Prefix,
        }
    }
}

impl From<&Token> for Precedence {
    fn from(value: &Token) -> Self {
        match value {
            token if token.is_assignment() => Self::Assign,
            Token::Question => Self::Ternary,
            Token::OrOr => Self::Or,
            Token::AndAnd => Self::And,
            Token::Pipe => Self::BitOr,
            Token::Caret => Self::BitXor,
            Token::Ampersand => Self::BitAnd,
            Token::Equal | Token::NotEqual |
            Token::StrictEqual | Token::StrictNotEqual => Self::Equals,
            Token::LessThan | Token::GreaterThan |
            Token::LessThanOrEqual | Token::GreaterThanOrEqual => Self::LessGreater,
            Token::ShiftLeft | Token::ShiftRight | Token::UnsignedShiftRight => Self::Shift,
            Token::Plus | Token::Minus | Token::DotDot => Self::Sum,
            Token::Star | Token::Slash | Token::Percent => Self::Product,
            Token::StarStar => Self::Power,
            Token::LParen | Token::LSBracket | Token::Dot => Self::Call,
            _ => Self::Lowest,
        }
    }
}

pub fn parse_module(src: &str) -> Result<Parsed, Vec<ParseError>> {
    let mut parser = Parser::new(lex(src));

    parser.parse()
}

pub fn parse_module_from_stream(stream: impl Iterator<Item = char>) -> Parsed {
    let lexer = Lexer::new(stream
        .scan(0, |pos, c| {
            *pos += c.len_utf8() as u32;
            Some((*pos - c.len_utf8() as u32, c))
        })
    );
    let mut parser = Parser::new(lexer);

    parser.parse_program()
}

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan, position: Position) -> Result<T, ParseError> {
    Err(ParseError { error, span, position })
}
