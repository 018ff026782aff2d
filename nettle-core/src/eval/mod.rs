pub mod error;
pub mod interpreter;
pub mod operators;
pub mod stdlib;

pub mod prelude {
    pub use super::{
        error::*,
        interpreter::*,
        operators::*
    };
}

#[cfg(test)]
mod tests;
