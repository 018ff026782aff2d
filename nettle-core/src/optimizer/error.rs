use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problems {
    warnings: Vec<Warning>,
}

impl Problems {
    pub fn warning(&mut self, warning: Warning) {
        self.warnings.push(warning)
    }

    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn sort(&mut self) {
        self.warnings.sort_by_key(|w| w.location().start);
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Warning {
    /// A literal zero on the right of `/` or `%`; evaluates to `undefined`.
    ///
    /// Example:
    /// ```text
    /// var half = total / 0; <- Division by zero
    /// ```
    DivisionByZero {
        location: SrcSpan
    },
    /// Statements following `return`, `break`, `continue` or `throw`
    /// in the same block.
    UnreachableCode {
        location: SrcSpan
    },
    UnreachableIfClause {
        location: SrcSpan
    },
    UnreachableElseClause {
        location: SrcSpan
    },
}

impl Warning {
    pub fn location(&self) -> SrcSpan {
        match self {
            Warning::DivisionByZero { location }
            | Warning::UnreachableCode { location }
            | Warning::UnreachableIfClause { location }
            | Warning::UnreachableElseClause { location } => *location
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Warning::DivisionByZero { .. } => "Division by zero",
            Warning::UnreachableCode { .. } => "Unreachable code",
            Warning::UnreachableIfClause { .. } => "Unreachable if clause",
            Warning::UnreachableElseClause { .. } => "Unreachable else clause",
        }
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            Warning::DivisionByZero { .. } => Some("This always evaluates to `undefined`"),
            Warning::UnreachableCode { .. } => Some("This code is never executed"),
            Warning::UnreachableIfClause { .. } | Warning::UnreachableElseClause { .. } => None,
        }
    }
}
