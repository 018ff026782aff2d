use crate::utils::prelude::{Position, SrcSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorType {
    UnrecognizedToken { tok: char },
    UnterminatedString,
    UnterminatedTemplate,
    MissingCommentEnd,
    MissingDigitsAfterExponent,
    MissingDigitsAfterRadix,
    DigitOutOfRadix,
    NumberOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub location: SrcSpan,
    pub position: Position,
}

impl LexicalError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match self.error {
            LexicalErrorType::UnrecognizedToken { tok } => {
                ("Unrecognized character", vec![format!("`{tok}` is not part of the language")])
            },
            LexicalErrorType::UnterminatedString => {
                ("Unterminated string literal", vec!["Add the closing quote".to_string()])
            },
            LexicalErrorType::UnterminatedTemplate => {
                ("Unterminated template literal", vec!["Add the closing backtick".to_string()])
            },
            LexicalErrorType::MissingCommentEnd => {
                ("Missing `*/` at the end of the block comment", vec![])
            },
            LexicalErrorType::MissingDigitsAfterExponent => {
                ("Missing digits after the exponent", vec![])
            },
            LexicalErrorType::MissingDigitsAfterRadix => {
                ("Missing digits after the radix prefix", vec![])
            },
            LexicalErrorType::DigitOutOfRadix => {
                ("Digit is out of range for this radix", vec![])
            },
            LexicalErrorType::NumberOutOfRange => {
                ("Number does not fit into a 64-bit integer", vec![])
            }
        }
    }
}

impl std::fmt::Display for LexicalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {}:{}] lexical error: {}", self.position.line, self.position.column, self.details().0)
    }
}
