//! Render3 View Module
//!
//! Template parsing, binding and compilation of directive and component
//! definitions.

pub mod api;
pub mod compiler;
pub mod query_generation;
pub mod t2_api;
pub mod t2_binder;
pub mod template;

pub use api::*;
pub use compiler::*;
pub use t2_api::*;
pub use t2_binder::*;
pub use template::*;
