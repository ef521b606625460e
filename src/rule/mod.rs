//! Rule compilation and evaluation
//!
//! This module tokenizes rule strings like "age > 30 AND department == Sales",
//! parses them into an AST, combines several rules into one conjunction and
//! evaluates the result against a [`Record`](crate::record::Record).

mod ast;
pub mod cache;
pub mod combiner;
mod encoding;
mod evaluator;
pub mod lexer;
pub mod parser;


pub use ast::*;
pub use cache::*;
pub use combiner::*;
pub use evaluator::*;
pub use lexer::{is_word, tokenize, tokenize_strict, Token, TokenKind};
pub use parser::*;
