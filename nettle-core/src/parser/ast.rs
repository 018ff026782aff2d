use std::{fmt::Display, rc::Rc};

use crate::{
    lexer::prelude::{escape, LexResult, Token},
    parser::prelude::{
        join, parse_error, parse_expression_list, parse_parameters, Expression, Identifier,
        Parse, ParseError, ParseErrorType, Parser, Precedence
    },
    utils::prelude::SrcSpan
};

#[derive(Debug)]
pub struct Parsed {
    pub program: Program,
    pub comments: Vec<SrcSpan>,
    pub errors: Vec<ParseError>,
}

// program -> { <statement> }
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub location: SrcSpan
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements = self.statements.iter()
            .map(|statement| format!("{}", statement))
            .collect::<Vec<String>>();

        write!(f, "{}", statements.join("\n"))
    }
}

// statement -> <declaration> | <function> | <class> | <block> | <conditional> | <conditional_loop>
//            | <fixed_loop> | <switch> | <return> | <break> | <continue> | <throw> | <try>
//            | <import> | <output> | <pass> | <expression> ;
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Block(Block),
    If(Conditional),
    While(ConditionalLoop),
    For(FixedLoop),
    Switch(Switch),
    Return(Return),
    Break(Break),
    Continue(Continue),
    Throw(Throw),
    Try(Try),
    Import(Import),
    Print(Output),
    Pass(Pass),
    Expression(ExpressionStatement),
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Statement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let res = match &parser.current_token.token {
            token if token.is_declaration() => Self::Declaration(Declaration::parse(parser, None)?),
            Token::Func => Self::Function(FunctionDeclaration::parse(parser, None)?),
            Token::Class => Self::Class(ClassDeclaration::parse(parser, None)?),
            Token::LBrace => Self::Block(Block::parse(parser, None)?),
            Token::If => Self::If(Conditional::parse(parser, None)?),
            Token::While => Self::While(ConditionalLoop::parse(parser, None)?),
            Token::For => Self::For(FixedLoop::parse(parser, None)?),
            Token::Switch => Self::Switch(Switch::parse(parser, None)?),
            Token::Return => Self::Return(Return::parse(parser, None)?),
            Token::Break => Self::Break(Break::parse(parser, None)?),
            Token::Continue => Self::Continue(Continue::parse(parser, None)?),
            Token::Throw => Self::Throw(Throw::parse(parser, None)?),
            Token::Try => Self::Try(Try::parse(parser, None)?),
            Token::Import => Self::Import(Import::parse(parser, None)?),
            Token::Print => Self::Print(Output::parse(parser, None)?),
            Token::Pass => Self::Pass(Pass::parse(parser, None)?),
            _ => Self::Expression(ExpressionStatement::parse(parser, None)?)
        };

        Ok(res)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declaration(declaration) => write!(f, "{declaration}"),
            Self::Function(function) => write!(f, "{function}"),
            Self::Class(class) => write!(f, "{class}"),
            Self::Block(block) => write!(f, "{block}"),
            Self::If(conditional) => write!(f, "{conditional}"),
            Self::While(loop_) => write!(f, "{loop_}"),
            Self::For(loop_) => write!(f, "{loop_}"),
            Self::Switch(switch) => write!(f, "{switch}"),
            Self::Return(ret) => write!(f, "{ret}"),
            Self::Break(_) => write!(f, "break;"),
            Self::Continue(_) => write!(f, "continue;"),
            Self::Throw(throw) => write!(f, "{throw}"),
            Self::Try(try_) => write!(f, "{try_}"),
            Self::Import(import) => write!(f, "{import}"),
            Self::Print(output) => write!(f, "{output}"),
            Self::Pass(_) => write!(f, "pass;"),
            Self::Expression(statement) => write!(f, "{};", statement.expression)
        }
    }
}

impl Statement {
    pub fn location(&self) -> SrcSpan {
        match self {
            Self::Declaration(declaration) => declaration.location,
            Self::Function(function) => function.location,
            Self::Class(class) => class.location,
            Self::Block(block) => block.location,
            Self::If(conditional) => conditional.location,
            Self::While(loop_) => loop_.location,
            Self::For(loop_) => loop_.location,
            Self::Switch(switch) => switch.location,
            Self::Return(ret) => ret.location,
            Self::Break(brk) => brk.location,
            Self::Continue(cont) => cont.location,
            Self::Throw(throw) => throw.location,
            Self::Try(try_) => try_.location,
            Self::Import(import) => import.location,
            Self::Print(output) => output.location,
            Self::Pass(pass) => pass.location,
            Self::Expression(statement) => statement.location
        }
    }

    /// Statements after this one in the same block can never run.
    pub fn is_jump(&self) -> bool {
        matches!(self, Self::Return(_) | Self::Break(_) | Self::Continue(_) | Self::Throw(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclarationKind {
    Var,
    Let,
    Pub,
    Const,
    Net
}

impl DeclarationKind {
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Const | Self::Net)
    }
}

impl Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Pub => "pub",
            Self::Const => "const",
            Self::Net => "net"
        };

        write!(f, "{kind}")
    }
}

impl TryFrom<&Token> for DeclarationKind {
    type Error = ();

    fn try_from(value: &Token) -> Result<Self, Self::Error> {
        match value {
            Token::Var => Ok(Self::Var),
            Token::Let => Ok(Self::Let),
            Token::Pub => Ok(Self::Pub),
            Token::Const => Ok(Self::Const),
            Token::Net => Ok(Self::Net),
            _ => Err(())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Identifier,
    pub value: Option<Expression>
}

impl Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} = {}", self.name, value),
            None => write!(f, "{}", self.name)
        }
    }
}

// declaration -> (var | let | pub | const | net) <identifier> [= <expression>] {, <identifier> [= <expression>]} ;
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub bindings: Vec<Binding>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Declaration {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let keyword = parser.next_token();

        let kind = match DeclarationKind::try_from(&keyword.token) {
            Ok(kind) => kind,
            Err(_) => return parse_error(
                ParseErrorType::UnexpectedToken {
                    token: keyword.token,
                    expected: vec!["a declaration".to_string()]
                },
                keyword.location,
                keyword.position
            )
        };

        let mut bindings = vec![];

        loop {
            let name = parser.expect_ident()?;

            let value = match parser.eat(&Token::Assign) {
                Some(_) => Some(Expression::parse(parser, None)?),
                None if kind.is_constant() => {
                    return Err(parser.error_at_current(ParseErrorType::MissingInitializer {
                        name: name.value
                    }))
                },
                None => None
            };

            bindings.push(Binding { name, value });

            if parser.eat(&Token::Comma).is_none() {
                break;
            }
        }

        let end = parser.expect_semicolon()?;

        Ok(Self {
            kind,
            bindings,
            location: keyword.location.merge(end)
        })
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {};", self.kind, join(&self.bindings))
    }
}

// function -> func <identifier> ( [<identifier> {, <identifier>}] ) <block>
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Rc<Block>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for FunctionDeclaration {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Func)?.location;

        let name = parser.expect_ident()?;
        let (parameters, _) = parse_parameters(parser)?;

        let body = Block::parse(parser, None)?;
        let location = start.merge(body.location);

        Ok(Self {
            name,
            parameters,
            body: Rc::new(body),
            location
        })
    }
}

impl Display for FunctionDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "func {}({}) {}", self.name, join(&self.parameters), self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(Declaration),
    Method(FunctionDeclaration)
}

impl Display for ClassMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(field) => write!(f, "{field}"),
            Self::Method(method) => write!(f, "{method}")
        }
    }
}

// class -> class <identifier> [extends <identifier>] { { <declaration> | <function> } }
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: Identifier,
    pub parent: Option<Identifier>,
    pub members: Vec<ClassMember>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for ClassDeclaration {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Class)?.location;

        let name = parser.expect_ident()?;

        let parent = match parser.eat(&Token::Extends) {
            Some(_) => Some(parser.expect_ident()?),
            None => None
        };

        parser.expect_one(Token::LBrace)?;

        let mut members = vec![];

        while !parser.check(&Token::RBrace) {
            let member = match &parser.current_token.token {
                token if token.is_declaration() => ClassMember::Field(Declaration::parse(parser, None)?),
                Token::Func => ClassMember::Method(FunctionDeclaration::parse(parser, None)?),
                token => return Err(parser.error_at_current(ParseErrorType::UnexpectedToken {
                    token: token.clone(),
                    expected: vec!["a field declaration".to_string(), "func".to_string()]
                }))
            };

            members.push(member);
        }

        let end = parser.expect_one(Token::RBrace)?.location;

        Ok(Self {
            name,
            parent,
            members,
            location: start.merge(end)
        })
    }
}

impl Display for ClassDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members = self.members.iter()
            .map(|member| format!("{member} "))
            .collect::<String>();

        match &self.parent {
            Some(parent) => write!(f, "class {} extends {} {{ {}}}", self.name, parent, members),
            None => write!(f, "class {} {{ {}}}", self.name, members)
        }
    }
}

// block -> { { <statement> } }
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Block {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::LBrace)?.location;

        let statements = parser.parse_statements(&Token::RBrace);

        let end = parser.expect_one(Token::RBrace)?.location;

        Ok(Self {
            statements,
            location: start.merge(end)
        })
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let statements = self.statements.iter()
            .map(|statement| format!("{statement} "))
            .collect::<String>();

        write!(f, "{{ {}}}", statements)
    }
}

fn parse_bracketed<T: Iterator<Item = LexResult>>(
    parser: &mut Parser<T>
) -> Result<Expression, ParseError> {
    parser.expect_one(Token::LSBracket)?;

    let expression = Expression::parse(parser, None)?;

    parser.expect_one(Token::RSBracket)?;

    Ok(expression)
}

// conditional -> if [ <expression> ] <statement> [else <statement>]
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub condition: Expression,
    pub resolution: Box<Statement>,
    pub alternative: Option<Box<Statement>>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Conditional {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::If)?.location;

        let condition = parse_bracketed(parser)?;

        let resolution = Box::new(Statement::parse(parser, None)?);

        let mut end = resolution.location();

        let alternative = match parser.eat(&Token::Else) {
            Some(_) => {
                let alternative = Statement::parse(parser, None)?;

                end = alternative.location();

                Some(Box::new(alternative))
            },
            None => None
        };

        Ok(Self {
            condition,
            resolution,
            alternative,
            location: start.merge(end)
        })
    }
}

impl Display for Conditional {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if [{}] {}", self.condition, self.resolution)?;

        if let Some(alternative) = &self.alternative {
            write!(f, " else {alternative}")?;
        }

        Ok(())
    }
}

// conditional_loop -> while [ <expression> ] <statement>
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalLoop {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for ConditionalLoop {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::While)?.location;

        let condition = parse_bracketed(parser)?;

        let body = Box::new(Statement::parse(parser, None)?);
        let location = start.merge(body.location());

        Ok(Self {
            condition,
            body,
            location
        })
    }
}

impl Display for ConditionalLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while [{}] {}", self.condition, self.body)
    }
}

// fixed_loop -> for [ [<declaration> | <expression>] ; [<expression>] ; [<expression>] ] <statement>
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLoop {
    pub initializer: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for FixedLoop {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::For)?.location;

        parser.expect_one(Token::LSBracket)?;

        // the initializer consumes its own `;`
        let initializer = match &parser.current_token.token {
            Token::Semicolon => {
                parser.step();
                None
            },
            token if token.is_declaration() => {
                Some(Box::new(Statement::Declaration(Declaration::parse(parser, None)?)))
            },
            _ => Some(Box::new(Statement::Expression(ExpressionStatement::parse(parser, None)?)))
        };

        let condition = match parser.check(&Token::Semicolon) {
            true => None,
            false => Some(Expression::parse(parser, None)?)
        };

        parser.expect_semicolon()?;

        let update = match parser.check(&Token::RSBracket) {
            true => None,
            false => Some(Expression::parse(parser, None)?)
        };

        parser.expect_one(Token::RSBracket)?;

        let body = Box::new(Statement::parse(parser, None)?);
        let location = start.merge(body.location());

        Ok(Self {
            initializer,
            condition,
            update,
            body,
            location
        })
    }
}

impl Display for FixedLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let initializer = match &self.initializer {
            Some(initializer) => initializer.to_string(),
            None => ";".to_string()
        };

        let condition = self.condition.as_ref()
            .map(|condition| format!(" {condition}"))
            .unwrap_or_default();

        let update = self.update.as_ref()
            .map(|update| format!(" {update}"))
            .unwrap_or_default();

        write!(f, "for [{initializer}{condition};{update}] {}", self.body)
    }
}

// case -> (case <expression> | default) : <statement>
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub value: Option<Expression>,
    pub body: Statement,
    pub location: SrcSpan
}

impl Display for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "case {}: {}", value, self.body),
            None => write!(f, "default: {}", self.body)
        }
    }
}

// switch -> switch [ <expression> ] { { <case> } }
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub subject: Expression,
    pub cases: Vec<Case>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Switch {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Switch)?.location;

        let subject = parse_bracketed(parser)?;

        parser.expect_one(Token::LBrace)?;

        let mut cases = vec![];

        while !parser.check(&Token::RBrace) {
            let case_start = parser.current_token.location;

            let value = match &parser.current_token.token {
                Token::Case => {
                    parser.step();
                    Some(Expression::parse(parser, None)?)
                },
                Token::Default => {
                    parser.step();
                    None
                },
                token => return Err(parser.error_at_current(ParseErrorType::UnexpectedToken {
                    token: token.clone(),
                    expected: vec!["case".to_string(), "default".to_string()]
                }))
            };

            parser.expect_one(Token::Colon)?;

            let body = Statement::parse(parser, None)?;
            let location = case_start.merge(body.location());

            cases.push(Case { value, body, location });
        }

        let end = parser.expect_one(Token::RBrace)?.location;

        Ok(Self {
            subject,
            cases,
            location: start.merge(end)
        })
    }
}

impl Display for Switch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cases = self.cases.iter()
            .map(|case| format!("{case} "))
            .collect::<String>();

        write!(f, "switch [{}] {{ {}}}", self.subject, cases)
    }
}

// return -> return [<expression>] ;
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Option<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Return {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Return)?.location;

        let value = match parser.check(&Token::Semicolon) {
            true => None,
            false => Some(Expression::parse(parser, None)?)
        };

        let end = parser.expect_semicolon()?;

        Ok(Self {
            value,
            location: start.merge(end)
        })
    }
}

impl Display for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "return {value};"),
            None => write!(f, "return;")
        }
    }
}

// break -> break ;
#[derive(Debug, Clone, PartialEq)]
pub struct Break {
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Break {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Break)?.location;
        let end = parser.expect_semicolon()?;

        Ok(Self { location: start.merge(end) })
    }
}

// continue -> continue ;
#[derive(Debug, Clone, PartialEq)]
pub struct Continue {
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Continue {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Continue)?.location;
        let end = parser.expect_semicolon()?;

        Ok(Self { location: start.merge(end) })
    }
}

// pass -> pass ;
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Pass {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Pass)?.location;
        let end = parser.expect_semicolon()?;

        Ok(Self { location: start.merge(end) })
    }
}

// throw -> throw <expression> ;
#[derive(Debug, Clone, PartialEq)]
pub struct Throw {
    pub value: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Throw {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Throw)?.location;

        let value = Expression::parse(parser, None)?;

        let end = parser.expect_semicolon()?;

        Ok(Self {
            value,
            location: start.merge(end)
        })
    }
}

impl Display for Throw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "throw {};", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catch {
    pub parameter: Option<Identifier>,
    pub body: Block
}

// try -> try <block> [catch [( <identifier> )] <block>] [finally <block>]
#[derive(Debug, Clone, PartialEq)]
pub struct Try {
    pub body: Block,
    pub catch: Option<Catch>,
    pub finally: Option<Block>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Try {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Try)?.location;

        let body = Block::parse(parser, None)?;
        let mut end = body.location;

        let catch = match parser.eat(&Token::Catch) {
            Some(_) => {
                let parameter = match parser.eat(&Token::LParen) {
                    Some(_) => {
                        let parameter = parser.expect_ident()?;
                        parser.expect_one(Token::RParen)?;

                        Some(parameter)
                    },
                    None => None
                };

                let body = Block::parse(parser, None)?;
                end = body.location;

                Some(Catch { parameter, body })
            },
            None => None
        };

        let finally = match parser.eat(&Token::Finally) {
            Some(_) => {
                let body = Block::parse(parser, None)?;
                end = body.location;

                Some(body)
            },
            None => None
        };

        if catch.is_none() && finally.is_none() {
            return Err(parser.error_at_current(ParseErrorType::MissingCatchOrFinally));
        }

        Ok(Self {
            body,
            catch,
            finally,
            location: start.merge(end)
        })
    }
}

impl Display for Try {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "try {}", self.body)?;

        match &self.catch {
            Some(Catch { parameter: Some(parameter), body }) => write!(f, " catch ({parameter}) {body}")?,
            Some(Catch { parameter: None, body }) => write!(f, " catch {body}")?,
            None => {}
        }

        if let Some(finally) = &self.finally {
            write!(f, " finally {finally}")?;
        }

        Ok(())
    }
}

// import -> import (<identifier> | <string>) ;
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub target: String,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Import {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Import)?.location;

        let target = parser.next_token();

        let target = match target.token {
            Token::Ident(target) | Token::String(target) => target,
            token => return parse_error(
                ParseErrorType::UnexpectedToken {
                    token,
                    expected: vec!["a module name".to_string(), "a path string".to_string()]
                },
                target.location,
                target.position
            )
        };

        let end = parser.expect_semicolon()?;

        Ok(Self {
            target,
            location: start.merge(end)
        })
    }
}

impl Display for Import {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "import \"{}\";", escape(&self.target))
    }
}

// output -> print ( [<expression> {, <expression>}] ) ;
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub values: Vec<Expression>,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for Output {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let start = parser.expect_one(Token::Print)?.location;

        parser.expect_one(Token::LParen)?;

        let (values, _) = parse_expression_list(parser, Token::RParen)?;

        let end = parser.expect_semicolon()?;

        Ok(Self {
            values,
            location: start.merge(end)
        })
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "print({});", join(&self.values))
    }
}

// expression_statement -> <expression> ;
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub location: SrcSpan
}

impl<T: Iterator<Item = LexResult>> Parse<T> for ExpressionStatement {
    fn parse(
        parser: &mut Parser<T>,
        _precedence: Option<Precedence>
    ) -> Result<Self, ParseError> {
        let expression = Expression::parse(parser, None)?;

        let end = parser.expect_semicolon()?;
        let location = expression.location().merge(end);

        Ok(Self {
            expression,
            location
        })
    }
}
