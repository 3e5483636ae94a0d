//! Lenient markdown-like parser producing the document AST

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{contains_block_markup, parse, parse_inlines};
