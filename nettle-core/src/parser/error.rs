use crate::{lexer::prelude::{LexicalError, Token}, utils::prelude::{Position, SrcSpan}};

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    ExpectedIdent,
    ExpectedExpression {
        token: Token,
    },
    ExpectedMember,
    InvalidAssignmentTarget,
    InvalidIncrementTarget,
    InvalidMapKey,
    MissingInitializer {
        name: String,
    },
    DuplicateParameter {
        name: String,
    },
    MissingCatchOrFinally,
    MissingSemicolon,
    UnexpectedEof,
    UnexpectedToken {
        token: Token,
        expected: Vec<String>,
    },
    LexError { error: LexicalError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan,
    pub position: Position,
}

impl ParseError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::ExpectedIdent => ("Expected identifier", vec![]),
            ParseErrorType::ExpectedExpression { token } => (
                "Expected expression",
                vec![format!("Found {}", describe(token))]
            ),
            ParseErrorType::ExpectedMember => ("Expected member name after `.`", vec![]),
            ParseErrorType::InvalidAssignmentTarget => (
                "Invalid assignment target",
                vec!["Only variables can be assigned to".to_string()]
            ),
            ParseErrorType::InvalidIncrementTarget => (
                "Invalid increment target",
                vec!["`++` and `--` only apply to variables".to_string()]
            ),
            ParseErrorType::InvalidMapKey => (
                "Invalid map key",
                vec!["Map keys are identifiers or strings".to_string()]
            ),
            ParseErrorType::MissingInitializer { name } => (
                "Missing initializer",
                vec![format!("Constant `{name}` must be given a value")]
            ),
            ParseErrorType::DuplicateParameter { name } => (
                "Duplicate parameter",
                vec![format!("Parameter `{name}` is declared more than once")]
            ),
            ParseErrorType::MissingCatchOrFinally => ("Expected `catch` or `finally` after `try` block", vec![]),
            ParseErrorType::MissingSemicolon => ("Missing semicolon", vec![]),
            ParseErrorType::UnexpectedEof => ("Unexpected end of file", vec![]),
            ParseErrorType::UnexpectedToken { token, expected } => {
                let found = describe(token);

                let messages = std::iter::once(format!("Found {found}, expected one of: "))
                    .chain(expected.iter().map(|s| format!("- {s}")))
                    .collect();

                ("Not expected this", messages)
            },
            ParseErrorType::LexError { error } => error.details()
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (message, extra) = self.details();
        let kind = match self.error {
            ParseErrorType::LexError { .. } => "lexical error",
            _ => "syntax error",
        };

        write!(f, "[line {}:{}] {kind}: {message}", self.position.line, self.position.column)?;

        if !extra.is_empty() {
            write!(f, " ({})", extra.join(" "))?;
        }

        Ok(())
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(_) => "an Int".to_string(),
        Token::Float(_) => "a Float".to_string(),
        Token::String(_) => "a String".to_string(),
        Token::Ident(_) => "an Identifier".to_string(),
        Token::Eof => "the end of file".to_string(),
        _ if token.is_reserved_word() => format!("the keyword `{}`", token.as_literal()),
        _ => format!("`{}`", token.as_literal())
    }
}
