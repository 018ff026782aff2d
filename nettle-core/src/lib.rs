pub mod lexer;
pub mod parser;
pub mod optimizer;
pub mod environment;
pub mod eval;
pub mod utils;
