//! Angular TypeScript Compiler (ngtsc)
//!
//! Compiles Angular decorators on the classes of a TypeScript program into
//! Ivy static definition fields, and generates the type-check blocks used to
//! check component templates.

pub mod annotations;
pub mod diagnostics;
pub mod imports;
pub mod logging;
pub mod partial_evaluator;
pub mod program;
pub mod reflection;
pub mod resource;
pub mod scope;
pub mod transform;
pub mod translator;
pub mod typecheck;
pub mod util;

pub use program::{nocollapse_hack, EmittedFile, NgtscProgram, TypeCheckOracle};
