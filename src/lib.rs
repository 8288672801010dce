pub mod checker;
pub mod context;
pub mod control;
pub mod interpreter;
pub mod lexer;
mod native;
pub mod parser;
pub mod string;
pub mod value;

/// Deepest expression nesting the checker and evaluator will descend into.
pub const MAX_NESTING_DEPTH: usize = 128;
