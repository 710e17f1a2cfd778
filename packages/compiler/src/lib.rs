#![deny(clippy::all)]

//! Angular Template Compiler
//!
//! Template parsing, directive matching and the render3 definition compilers
//! used by the ngtsc compiler. Everything here works on in-memory ASTs; the
//! TypeScript side lives in the `angular-compiler-cli` crate.

pub mod chars;
pub mod constant_pool;
pub mod core;
pub mod directive_matching;
pub mod injectable_compiler_2;
pub mod parse_util;

// Parsers
pub mod expression_parser;
pub mod ml_parser;

// Compilation
pub mod output;
pub mod render3;

pub use constant_pool::ConstantPool;
pub use injectable_compiler_2::{compile_injectable, R3InjectableMetadata, R3InjectableProvider};
