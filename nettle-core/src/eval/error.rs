use crate::{environment::prelude::Value, utils::prelude::SrcSpan};

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    UndefinedVariable {
        name: String
    },
    UndefinedFunction {
        name: String
    },
    ConstantReassignment {
        name: String
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize
    },
    InvalidOperands {
        operator: String,
        left: &'static str,
        right: &'static str
    },
    InvalidOperand {
        operator: String,
        operand: &'static str
    },
    IntegerOverflow {
        operator: String
    },
    NotCallable {
        type_name: &'static str
    },
    NotIndexable {
        type_name: &'static str
    },
    InvalidIndex {
        container: &'static str,
        index: &'static str
    },
    NoMembers {
        type_name: &'static str
    },
    UnknownMember {
        name: String
    },
    InvalidParent {
        name: String,
        type_name: &'static str
    },
    StackOverflow {
        depth: usize
    },
    BreakOutsideLoop,
    ContinueOutsideLoop,
    UncaughtThrow {
        value: String
    },
    Native {
        name: String,
        message: String
    },
    Io {
        message: String
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub span: SrcSpan,
}

impl RuntimeError {
    pub fn new(error: RuntimeErrorType, span: SrcSpan) -> Self {
        Self { error, span }
    }

    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            RuntimeErrorType::UndefinedVariable { name } => (
                "Undefined variable",
                vec![format!("`{name}` is not declared in this scope")]
            ),
            RuntimeErrorType::UndefinedFunction { name } => (
                "Undefined function",
                vec![format!("No function or native named `{name}`")]
            ),
            RuntimeErrorType::ConstantReassignment { name } => (
                "Reassignment of constant",
                vec![format!("`{name}` was declared constant")]
            ),
            RuntimeErrorType::ArityMismatch { name, expected, got } => (
                "Wrong number of arguments",
                vec![format!("`{name}` expects {expected} argument(s), got {got}")]
            ),
            RuntimeErrorType::InvalidOperands { operator, left, right } => (
                "Invalid operands",
                vec![format!("Cannot apply `{operator}` to `{left}` and `{right}`")]
            ),
            RuntimeErrorType::InvalidOperand { operator, operand } => (
                "Invalid operand",
                vec![format!("Cannot apply `{operator}` to `{operand}`")]
            ),
            RuntimeErrorType::IntegerOverflow { operator } => (
                "Integer overflow",
                vec![format!("The result of `{operator}` does not fit in 64 bits")]
            ),
            RuntimeErrorType::NotCallable { type_name } => (
                "Not callable",
                vec![format!("A value of type `{type_name}` cannot be called")]
            ),
            RuntimeErrorType::NotIndexable { type_name } => (
                "Not indexable",
                vec![format!("A value of type `{type_name}` cannot be indexed")]
            ),
            RuntimeErrorType::InvalidIndex { container, index } => (
                "Invalid index",
                vec![format!("`{container}` cannot be indexed by `{index}`")]
            ),
            RuntimeErrorType::NoMembers { type_name } => (
                "No members",
                vec![format!("A value of type `{type_name}` has no members")]
            ),
            RuntimeErrorType::UnknownMember { name } => (
                "Unknown member",
                vec![format!("No member named `{name}`")]
            ),
            RuntimeErrorType::InvalidParent { name, type_name } => (
                "Invalid parent class",
                vec![format!("`{name}` is a `{type_name}`, not a class")]
            ),
            RuntimeErrorType::StackOverflow { depth } => (
                "Stack overflow",
                vec![format!("Call depth exceeded the limit of {depth}")]
            ),
            RuntimeErrorType::BreakOutsideLoop => ("`break` outside of a loop", vec![]),
            RuntimeErrorType::ContinueOutsideLoop => ("`continue` outside of a loop", vec![]),
            RuntimeErrorType::UncaughtThrow { value } => (
                "Uncaught throw",
                vec![format!("Thrown value: {value}")]
            ),
            RuntimeErrorType::Native { name, message } => (
                "Native function failed",
                vec![format!("`{name}`: {message}")]
            ),
            RuntimeErrorType::Io { message } => ("Input/output failed", vec![message.clone()]),
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (message, extra) = self.details();

        write!(f, "runtime error: {message}")?;

        if !extra.is_empty() {
            write!(f, " ({})", extra.join(" "))?;
        }

        Ok(())
    }
}

impl std::error::Error for RuntimeError {}

/// Non-local outcome of evaluating a node. Each variant is consumed by
/// the construct that owns it: calls take `Return`, loops take `Break`
/// and `Continue`, `try` takes `Throw`.
#[derive(Debug, Clone)]
pub enum Signal {
    Return(Value),
    Break(SrcSpan),
    Continue(SrcSpan),
    Throw(Value, SrcSpan),
    Error(Box<RuntimeError>),
}

impl From<RuntimeError> for Signal {
    fn from(value: RuntimeError) -> Self {
        Signal::Error(Box::new(value))
    }
}

pub type EvalResult = Result<Value, Signal>;

pub fn runtime_error<T>(error: RuntimeErrorType, span: SrcSpan) -> Result<T, Signal> {
    Err(Signal::Error(Box::new(RuntimeError { error, span })))
}
