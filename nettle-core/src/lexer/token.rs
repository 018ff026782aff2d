use crate::utils::prelude::{Position, SrcSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // [A-Za-z_$][A-Za-z0-9_$]*
    Ident(String),
    // 42, 0x2A, 0o52, 0b101010
    Int(i64),
    // 4.2, 42e-1
    Float(f64),
    // "..." | '...' | `...`
    String(String),
    // // line | /* block */
    Comment,

    // Declarations
    Var, // var
    Let, // let
    Const, // const
    Net, // net
    Pub, // pub
    Func, // func
    Class, // class
    Extends, // extends

    // Control flow
    Return, // return
    If, // if
    Else, // else
    While, // while
    For, // for
    Break, // break
    Continue, // continue
    Switch, // switch
    Case, // case
    Default, // default
    Try, // try
    Catch, // catch
    Finally, // finally
    Throw, // throw
    Import, // import
    Pass, // pass

    // Input and output
    Print, // print
    Input, // input

    Lambda, // lambda

    // Literals
    True,
    False,
    Null,
    Undefined,

    // Additive group
    Plus, // +
    Minus, // -
    DotDot, // ..

    // Multiplicative group
    Star, // *
    Slash, // /
    Percent, // %
    StarStar, // **

    // Bitwise group
    Ampersand, // &
    Pipe, // |
    Caret, // ^
    ShiftLeft, // <<
    ShiftRight, // >>
    UnsignedShiftRight, // >>>

    // Logical group
    AndAnd, // &&
    OrOr, // ||

    // Relational group
    Equal, // ==
    NotEqual, // !=
    StrictEqual, // ===
    StrictNotEqual, // !==
    LessThan, // <
    LessThanOrEqual, // <=
    GreaterThan, // >
    GreaterThanOrEqual, // >=

    // Unary
    Bang, // !
    Tilde, // ~
    PlusPlus, // ++
    MinusMinus, // --

    // Assignment
    Assign, // =
    PlusAssign, // +=
    MinusAssign, // -=
    StarAssign, // *=
    SlashAssign, // /=
    PercentAssign, // %=
    StarStarAssign, // **=
    DotDotAssign, // ..=
    AmpersandAssign, // &=
    PipeAssign, // |=
    CaretAssign, // ^=
    ShiftLeftAssign, // <<=
    ShiftRightAssign, // >>=
    UnsignedShiftRightAssign, // >>>=

    // Punctuation
    Comma, // ,
    Colon, // :
    Semicolon, // ;
    Dot, // .
    Question, // ?
    FatArrow, // =>
    LParen, // (
    RParen, // )
    LSBracket, // [
    RSBracket, // ]
    LBrace, // {
    RBrace, // }

    Eof,
}

/// A token together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub location: SrcSpan,
    pub position: Position,
}

impl Spanned {
    pub fn new(token: Token, location: SrcSpan, position: Position) -> Self {
        Self { token, location, position }
    }
}

impl Token {
    pub fn is_reserved_word(&self) -> bool {
        matches!(
            self,
            Token::Var
            | Token::Let
            | Token::Const
            | Token::Net
            | Token::Pub
            | Token::Func
            | Token::Class
            | Token::Extends
            | Token::Return
            | Token::If
            | Token::Else
            | Token::While
            | Token::For
            | Token::Break
            | Token::Continue
            | Token::Switch
            | Token::Case
            | Token::Default
            | Token::Try
            | Token::Catch
            | Token::Finally
            | Token::Throw
            | Token::Import
            | Token::Pass
            | Token::Print
            | Token::Input
            | Token::Lambda
            | Token::True
            | Token::False
            | Token::Null
            | Token::Undefined
        )
    }

    /// Tokens that open a statement; used to resynchronize after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            Token::Var
            | Token::Let
            | Token::Const
            | Token::Net
            | Token::Pub
            | Token::Func
            | Token::Class
            | Token::Return
            | Token::If
            | Token::While
            | Token::For
            | Token::Break
            | Token::Continue
            | Token::Switch
            | Token::Try
            | Token::Throw
            | Token::Import
            | Token::Pass
            | Token::Print
        )
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self, Token::Var | Token::Let | Token::Const | Token::Net | Token::Pub)
    }

    pub fn is_assignment(&self) -> bool {
        self.compound_operator().is_some() || *self == Token::Assign
    }

    /// `+=` -> `+`, `>>>=` -> `>>>`, ...
    pub fn compound_operator(&self) -> Option<Token> {
        Some(match self {
            Token::PlusAssign => Token::Plus,
            Token::MinusAssign => Token::Minus,
            Token::StarAssign => Token::Star,
            Token::SlashAssign => Token::Slash,
            Token::PercentAssign => Token::Percent,
            Token::StarStarAssign => Token::StarStar,
            Token::DotDotAssign => Token::DotDot,
            Token::AmpersandAssign => Token::Ampersand,
            Token::PipeAssign => Token::Pipe,
            Token::CaretAssign => Token::Caret,
            Token::ShiftLeftAssign => Token::ShiftLeft,
            Token::ShiftRightAssign => Token::ShiftRight,
            Token::UnsignedShiftRightAssign => Token::UnsignedShiftRight,
            _ => return None,
        })
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::Plus
            | Token::Minus
            | Token::DotDot
            | Token::Star
            | Token::Slash
            | Token::Percent
            | Token::StarStar
            | Token::Ampersand
            | Token::Pipe
            | Token::Caret
            | Token::ShiftLeft
            | Token::ShiftRight
            | Token::UnsignedShiftRight
            | Token::AndAnd
            | Token::OrOr
            | Token::Equal
            | Token::NotEqual
            | Token::StrictEqual
            | Token::StrictNotEqual
            | Token::LessThan
            | Token::LessThanOrEqual
            | Token::GreaterThan
            | Token::GreaterThanOrEqual
        )
    }

    pub fn as_literal(&self) -> String {
        match self {
            Token::Ident(value) => value.to_string(),
            Token::Int(value) => value.to_string(),
            Token::Float(value) => format!("{value:?}"),
            Token::String(value) => format!("\"{}\"", escape(value)),
            Token::Comment => "comment".to_string(),
            Token::Eof => "end of file".to_string(),
            token => token.symbol().to_string(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Net => "net",
            Token::Pub => "pub",
            Token::Func => "func",
            Token::Class => "class",
            Token::Extends => "extends",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::For => "for",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::Throw => "throw",
            Token::Import => "import",
            Token::Pass => "pass",
            Token::Print => "print",
            Token::Input => "input",
            Token::Lambda => "lambda",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Undefined => "undefined",

            Token::Plus => "+",
            Token::Minus => "-",
            Token::DotDot => "..",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::StarStar => "**",
            Token::Ampersand => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::ShiftLeft => "<<",
            Token::ShiftRight => ">>",
            Token::UnsignedShiftRight => ">>>",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Equal => "==",
            Token::NotEqual => "!=",
            Token::StrictEqual => "===",
            Token::StrictNotEqual => "!==",
            Token::LessThan => "<",
            Token::LessThanOrEqual => "<=",
            Token::GreaterThan => ">",
            Token::GreaterThanOrEqual => ">=",
            Token::Bang => "!",
            Token::Tilde => "~",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::MinusAssign => "-=",
            Token::StarAssign => "*=",
            Token::SlashAssign => "/=",
            Token::PercentAssign => "%=",
            Token::StarStarAssign => "**=",
            Token::DotDotAssign => "..=",
            Token::AmpersandAssign => "&=",
            Token::PipeAssign => "|=",
            Token::CaretAssign => "^=",
            Token::ShiftLeftAssign => "<<=",
            Token::ShiftRightAssign => ">>=",
            Token::UnsignedShiftRightAssign => ">>>=",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Dot => ".",
            Token::Question => "?",
            Token::FatArrow => "=>",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LSBracket => "[",
            Token::RSBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",

            Token::Ident(_)
            | Token::Int(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::Comment
            | Token::Eof => "",
        }
    }
}

/// Inverse of the string escapes the lexer decodes.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\0' => escaped.push_str("\\0"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            ch => escaped.push(ch),
        }
    }

    escaped
}
