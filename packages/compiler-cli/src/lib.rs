#![deny(clippy::all)]

//! Angular Compiler CLI - Rust Implementation
//!
//! The ngtsc compiler core: decorator analysis, Ivy definition emit and
//! template type-check blocks over a `ts::Program`.

// Re-export compiler for convenience
pub use angular_compiler as compiler;

pub mod config;
pub mod ngtsc;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
