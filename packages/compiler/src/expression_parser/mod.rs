//! Expression Parser Module
//!
//! Lexer, AST and parser for the expressions embedded in templates.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use parser::{split_interpolation, Parser, TemplateBindingParseResult};
pub use serializer::serialize;
