use std::{fmt::Display, rc::Rc};

use crate::{
    lexer::prelude::{escape, LexResult, Token},
    parser::prelude::{parse_error, InfixParse, Parse, ParseError, ParseErrorType, Parser, Precedence},
    utils::prelude::SrcSpan
};

// expression -> <identifier> | <primitive> | <prefix> | <infix> | <ternary> | <assignment>
//             | <call> | <member> | <index> | <list> | <map> | <lambda> | <input> | "(" <expression> ")"
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Primitive(Primitive),
    Infix(Infix),
    Prefix(Prefix),
    Ternary(Ternary),
    Assignment(Assignment),
    Call(Call),
    Member(Member),
    Index(Index),
    List(List),
    Map(MapLiteral),
    Lambda(Lambda),
    Input(Input),
    Nested {
        expression: Box<Expression>,
        location: SrcSpan
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Expression {
    fn parse(
        parser: &mut Parser<T>,
        precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let mut expr = match &parser.current_token.token {
            Token::Ident(_) => Self::Identifier(parser.expect_ident()?),
            Token::Int(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::True
            | Token::False
            | Token::Null
            | Token::Undefined => Self::Primitive(Primitive::parse(parser, None)?),
            Token::Bang
            | Token::Minus
            | Token::Tilde
            | Token::PlusPlus
            | Token::MinusMinus => Self::Prefix(Prefix::parse(parser, None)?),
            Token::LParen => {
                let start = parser.expect_one(Token::LParen)?.location;

                let expression = Box::new(Expression::parse(parser, None)?);

                let end = parser.expect_one(Token::RParen)?.location;

                Self::Nested {
                    expression,
                    location: start.merge(end)
                }
            },
            Token::LSBracket => Self::List(List::parse(parser, None)?),
            Token::LBrace => Self::Map(MapLiteral::parse(parser, None)?),
            Token::Input => Self::Input(Input::parse(parser, None)?),
            Token::Lambda => Self::Lambda(Lambda::parse(parser, None)?),
            Token::Eof => return Err(parser.error_at_current(ParseErrorType::UnexpectedEof)),
            token => return Err(parser.error_at_current(ParseErrorType::ExpectedExpression {
                token: token.clone()
            }))
        };

        let precedence = precedence.unwrap_or(Precedence::Lowest);

        while precedence < parser.current_precedence() {
            expr = match &parser.current_token.token {
                token if token.is_assignment() => {
                    Self::Assignment(Assignment::parse(parser, expr, Some(precedence))?)
                },
                token if token.is_operator() => {
                    Self::Infix(Infix::parse(parser, expr, Some(precedence))?)
                },
                Token::Question => Self::Ternary(Ternary::parse(parser, expr, Some(precedence))?),
                Token::LParen => Self::Call(Call::parse(parser, expr, Some(precedence))?),
                Token::LSBracket => Self::Index(Index::parse(parser, expr, Some(precedence))?),
                Token::Dot => Self::Member(Member::parse(parser, expr, Some(precedence))?),
                _ => break
            }
        }

        Ok(expr)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(ident) => write!(f, "{ident}"),
            Self::Primitive(primitive) => write!(f, "{primitive}"),
            Self::Infix(infix) => write!(f, "{infix}"),
            Self::Prefix(prefix) => write!(f, "{prefix}"),
            Self::Ternary(ternary) => write!(f, "{ternary}"),
            Self::Assignment(assignment) => write!(f, "{assignment}"),
            Self::Call(call) => write!(f, "{call}"),
            Self::Member(member) => write!(f, "{member}"),
            Self::Index(index) => write!(f, "{index}"),
            Self::List(list) => write!(f, "{list}"),
            Self::Map(map) => write!(f, "{map}"),
            Self::Lambda(lambda) => write!(f, "{lambda}"),
            Self::Input(input) => write!(f, "{input}"),
            Self::Nested { expression, .. } => write!(f, "({expression})")
        }
    }
}

impl Expression {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Identifier(ident) => ident.location,
            Self::Primitive(primitive) => primitive.location(),
            Self::Infix(infix) => infix.location,
            Self::Prefix(prefix) => prefix.location,
            Self::Ternary(ternary) => ternary.location,
            Self::Assignment(assignment) => assignment.location,
            Self::Call(call) => call.location,
            Self::Member(member) => member.location,
            Self::Index(index) => index.location,
            Self::List(list) => list.location,
            Self::Map(map) => map.location,
            Self::Lambda(lambda) => lambda.location,
            Self::Input(input) => input.location,
            Self::Nested { location, .. } => *location
        }
    }
}

/// Parses `item {, item} [,]` up to and including `terminator`.
pub fn parse_expression_list<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>,
    terminator: Token
) -> Result<(Vec<Expression>, SrcSpan), ParseError> {
    let mut items = vec![];

    while !parser.check(&terminator) {
        items.push(Expression::parse(parser, None)?);

        if parser.eat(&Token::Comma).is_none() {
            break;
        }
    }

    let end = parser.expect_one(terminator)?.location;

    Ok((items, end))
}

/// Parses `( name {, name} )`, rejecting repeated names.
pub fn parse_parameters<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>
) -> Result<(Vec<Identifier>, SrcSpan), ParseError> {
    parser.expect_one(Token::LParen)?;

    let mut parameters: Vec<Identifier> = vec![];

    while !parser.check(&Token::RParen) {
        let position = parser.current_token.position;
        let parameter = parser.expect_ident()?;

        if parameters.iter().any(|existing| existing.value == parameter.value) {
            return parse_error(
                ParseErrorType::DuplicateParameter { name: parameter.value },
                parameter.location,
                position
            );
        }

        parameters.push(parameter);

        if parser.eat(&Token::Comma).is_none() {
            break;
        }
    }

    let end = parser.expect_one(Token::RParen)?.location;

    Ok((parameters, end))
}

// identifier -> (<letter> | _ | $) { <letter> | <digit> | _ | $ }
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
    pub location: SrcSpan
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

// primitive -> <int> | <float> | <string> | true | false | null | undefined
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int {
        value: i64,
        location: SrcSpan
    },
    Float {
        value: f64,
        location: SrcSpan
    },
    String {
        value: String,
        location: SrcSpan
    },
    Bool {
        value: bool,
        location: SrcSpan
    },
    Null {
        location: SrcSpan
    },
    Undefined {
        location: SrcSpan
    }
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Primitive {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let span = parser.next_token();
        let location = span.location;

        Ok(match span.token {
            Token::Int(value) => Self::Int { value, location },
            Token::Float(value) => Self::Float { value, location },
            Token::String(value) => Self::String { value, location },
            Token::True => Self::Bool { value: true, location },
            Token::False => Self::Bool { value: false, location },
            Token::Null => Self::Null { location },
            Token::Undefined => Self::Undefined { location },
            token => return parse_error(
                ParseErrorType::ExpectedExpression { token },
                location,
                span.position
            )
        })
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // folded negatives keep their sign attached when re-parsed
            Self::Int { value, .. } if *value < 0 => write!(f, "({value})"),
            Self::Int { value, .. } => write!(f, "{value}"),
            Self::Float { value, .. } => write!(f, "{value:?}"),
            Self::String { value, .. } => write!(f, "\"{}\"", escape(value)),
            Self::Bool { value, .. } => write!(f, "{value}"),
            Self::Null { .. } => write!(f, "null"),
            Self::Undefined { .. } => write!(f, "undefined")
        }
    }
}

impl Primitive {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Int { location, .. }
            | Self::Float { location, .. }
            | Self::String { location, .. }
            | Self::Bool { location, .. }
            | Self::Null { location }
            | Self::Undefined { location } => *location
        }
    }
}

// infix -> <expression> <operator> <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub left: Box<Expression>,
    pub operator: Token,
    pub right: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Infix {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let precedence = parser.current_precedence();

        let SrcSpan { start, .. } = left.location();

        let operator = parser.next_token().token;

        let right_precedence = match operator {
            Token::StarStar => precedence.lower(),
            _ => precedence
        };

        let right = Expression::parse(parser, Some(right_precedence))?;

        let SrcSpan { end, .. } = right.location();

        Ok(Self {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            location: SrcSpan { start, end }
        })
    }
}

impl Display for Infix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.as_literal(), self.right)
    }
}

// prefix -> (! | - | ~ | ++ | --) <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub operator: Token,
    pub expression: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Prefix {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let operator = parser.next_token();

        let expression = Expression::parse(parser, Some(Precedence::Prefix))?;

        if matches!(operator.token, Token::PlusPlus | Token::MinusMinus)
            && !matches!(expression, Expression::Identifier(_))
        {
            return parse_error(
                ParseErrorType::InvalidIncrementTarget,
                expression.location(),
                operator.position
            );
        }

        let end = expression.location().end;

        Ok(Self {
            operator: operator.token,
            expression: Box::new(expression),
            location: SrcSpan { start: operator.location.start, end }
        })
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operand = self.expression.to_string();

        // `- -x` must not print as `--x`
        if operand.starts_with(['-', '+']) {
            write!(f, "{} {}", self.operator.as_literal(), operand)
        } else {
            write!(f, "{}{}", self.operator.as_literal(), operand)
        }
    }
}

// ternary -> <expression> ? <expression> : <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Ternary {
    pub condition: Box<Expression>,
    pub resolution: Box<Expression>,
    pub alternative: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Ternary {
    fn parse(
        parser: &mut Parser<T>,
        condition: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::Question)?;

        let resolution = Expression::parse(parser, None)?;

        parser.expect_one(Token::Colon)?;

        let alternative = Expression::parse(parser, Some(Precedence::Ternary.lower()))?;

        let location = condition.location().merge(alternative.location());

        Ok(Self {
            condition: Box::new(condition),
            resolution: Box::new(resolution),
            alternative: Box::new(alternative),
            location
        })
    }
}

impl Display for Ternary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ? {} : {}", self.condition, self.resolution, self.alternative)
    }
}

// assignment -> <identifier> (= | += | -= | ... | >>>=) <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Identifier,
    pub operator: Token,
    pub value: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Assignment {
    fn parse(
        parser: &mut Parser<T>,
        left: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let target = match left {
            Expression::Identifier(identifier) => identifier,
            other => return parse_error(
                ParseErrorType::InvalidAssignmentTarget,
                other.location(),
                parser.current_token.position
            )
        };

        let operator = parser.next_token().token;

        let value = Expression::parse(parser, Some(Precedence::Lowest))?;

        let location = target.location.merge(value.location());

        Ok(Self {
            target,
            operator,
            value: Box::new(value),
            location
        })
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.target, self.operator.as_literal(), self.value)
    }
}

// call -> <expression> ( [<expression> {, <expression>}] )
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Call {
    fn parse(
        parser: &mut Parser<T>,
        callee: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::LParen)?;

        let (arguments, end) = parse_expression_list(parser, Token::RParen)?;

        let location = callee.location().merge(end);

        Ok(Self {
            callee: Box::new(callee),
            arguments,
            location
        })
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.callee, join(&self.arguments))
    }
}

// member -> <expression> . <identifier>
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub object: Box<Expression>,
    pub name: Identifier,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Member {
    fn parse(
        parser: &mut Parser<T>,
        object: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::Dot)?;

        let name = match parser.expect_ident() {
            Ok(name) => name,
            Err(err) => return parse_error(ParseErrorType::ExpectedMember, err.span, err.position)
        };

        let location = object.location().merge(name.location);

        Ok(Self {
            object: Box::new(object),
            name,
            location
        })
    }
}

impl Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.object, self.name)
    }
}

// index -> <expression> [ <expression> ]
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> InfixParse<T> for Index {
    fn parse(
        parser: &mut Parser<T>,
        object: Expression,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        parser.expect_one(Token::LSBracket)?;

        let index = Expression::parse(parser, None)?;

        let end = parser.expect_one(Token::RSBracket)?.location;

        let location = object.location().merge(end);

        Ok(Self {
            object: Box::new(object),
            index: Box::new(index),
            location
        })
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.object, self.index)
    }
}

// list -> [ [<expression> {, <expression>}] ]
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub items: Vec<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for List {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::LSBracket)?.location;

        let (items, end) = parse_expression_list(parser, Token::RSBracket)?;

        Ok(Self {
            items,
            location: start.merge(end)
        })
    }
}

impl Display for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.items))
    }
}

// map -> { [<key> : <expression> {, <key> : <expression>}] }
#[derive(Debug, Clone, PartialEq)]
pub struct MapLiteral {
    pub entries: Vec<MapEntry>,
    pub location: SrcSpan
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for MapLiteral {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::LBrace)?.location;

        let mut entries = vec![];

        while !parser.check(&Token::RBrace) {
            let key_span = parser.next_token();

            let key = match key_span.token {
                Token::Ident(key) | Token::String(key) => key,
                _ => return parse_error(
                    ParseErrorType::InvalidMapKey,
                    key_span.location,
                    key_span.position
                )
            };

            parser.expect_one(Token::Colon)?;

            let value = Expression::parse(parser, None)?;
            let location = key_span.location.merge(value.location());

            entries.push(MapEntry { key, value, location });

            if parser.eat(&Token::Comma).is_none() {
                break;
            }
        }

        let end = parser.expect_one(Token::RBrace)?.location;

        Ok(Self {
            entries,
            location: start.merge(end)
        })
    }
}

impl Display for MapLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.iter()
            .map(|entry| format!("\"{}\": {}", escape(&entry.key), entry.value))
            .collect::<Vec<String>>();

        write!(f, "{{{}}}", entries.join(", "))
    }
}

// lambda -> lambda ( [<identifier> {, <identifier>}] ) => <expression>
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub parameters: Vec<Identifier>,
    pub body: Rc<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Lambda {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Lambda)?.location;

        let (parameters, _) = parse_parameters(parser)?;

        parser.expect_one(Token::FatArrow)?;

        let body = Expression::parse(parser, None)?;
        let location = start.merge(body.location());

        Ok(Self {
            parameters,
            body: Rc::new(body),
            location
        })
    }
}

impl Display for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lambda({}) => {}", join(&self.parameters), self.body)
    }
}

// input -> input ( [<expression>] )
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub prompt: Option<Box<Expression>>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Input {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Input)?.location;

        parser.expect_one(Token::LParen)?;

        let prompt = match parser.check(&Token::RParen) {
            true => None,
            false => Some(Box::new(Expression::parse(parser, None)?))
        };

        let end = parser.expect_one(Token::RParen)?.location;

        Ok(Self {
            prompt,
            location: start.merge(end)
        })
    }
}

impl Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prompt {
            Some(prompt) => write!(f, "input({prompt})"),
            None => write!(f, "input()")
        }
    }
}

pub(crate) fn join<D: Display>(items: &[D]) -> String {
    items.iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
