//! Output Module
//!
//! The output AST emitted by the render3 compilers.

pub mod output_ast;
