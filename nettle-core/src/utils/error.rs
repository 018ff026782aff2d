use std::path::PathBuf;

use termcolor::Buffer;
use thiserror::Error;

use crate::{
    eval::prelude::{RuntimeError, RuntimeErrorType},
    parser::prelude::{ParseError, ParseErrorType},
    utils::prelude::SrcSpan,
};
use super::diagnostic::{Diagnostic, Label, Level, Location};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("failed to parse source code")]
    Parse {
        path: PathBuf,
        src: String,
        errors: Vec<ParseError>
    },
    #[error("{error}")]
    Runtime {
        path: PathBuf,
        src: String,
        error: RuntimeError
    },
    #[error("IO operation failed")]
    StdIo {
        err: std::io::ErrorKind
    }
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor);
        String::from_utf8_lossy(&nocolor.into_inner()).into_owned()
    }

    pub fn pretty(&self, buf: &mut Buffer) {
        use std::io::Write;

        for diagnostic in self.to_diagnostics() {
            diagnostic.write(buf);
            writeln!(buf).expect("write new line diagnostic");
        }
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Parse { path, src, errors } => errors.iter()
                .map(|error| {
                    let (label, extra) = error.details();

                    let (title, hint) = match error.error {
                        ParseErrorType::LexError { .. } => ("Lexical error", None),
                        ParseErrorType::MissingSemicolon => (
                            "Syntax error",
                            Some("Statements end with `;`".to_string())
                        ),
                        _ => ("Syntax error", None)
                    };

                    let span = match error.error {
                        ParseErrorType::UnexpectedEof => SrcSpan::from(src.len() as u32, src.len() as u32),
                        _ => error.span
                    };

                    Diagnostic {
                        title: format!("{title} at {}", error.position),
                        text: extra.join("\n"),
                        hint,
                        level: Level::Error,
                        location: Some(Location {
                            src,
                            path: path.clone(),
                            label: Label::new(Some(label), span),
                            extra_labels: vec![],
                        }),
                    }
                })
                .collect(),
            Error::Runtime { path, src, error } => {
                let (label, extra) = error.details();

                let hint = match error.error {
                    RuntimeErrorType::StackOverflow { .. } => {
                        Some("Raise the limit with `--max-call-depth`".to_string())
                    },
                    RuntimeErrorType::UndefinedVariable { .. } => {
                        Some("Declare it first with `var`, or run with `--implicit-declarations`".to_string())
                    },
                    _ => None
                };

                vec![Diagnostic {
                    title: "Runtime error".into(),
                    text: extra.join("\n"),
                    hint,
                    level: Level::Error,
                    location: Some(Location {
                        src,
                        path: path.clone(),
                        label: Label::new(Some(label), error.span),
                        extra_labels: vec![],
                    }),
                }]
            },
            Error::StdIo { err } => {
                vec![Diagnostic {
                    title: "Standard IO error".into(),
                    text: format!("{err}"),
                    hint: None,
                    level: Level::Error,
                    location: None,
                }]
            }
        }
    }
}
