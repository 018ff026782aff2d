pub mod error;
pub mod parser;
pub mod ast;
pub mod expression;

pub mod prelude {
    pub use super::{
        error::*,
        parser::*,
        ast::*,
        expression::*
    };
}

#[cfg(test)]
mod tests;
