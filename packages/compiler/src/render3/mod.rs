//! Render3 Module
//!
//! Compilers for the Ivy (render3) runtime definitions.

pub mod r3_ast;
pub mod r3_class_metadata_compiler;
pub mod r3_factory;
pub mod r3_identifiers;
pub mod r3_injector_compiler;
pub mod r3_module_compiler;
pub mod r3_pipe_compiler;
pub mod r3_template_transform;
pub mod util;
pub mod view;

pub use r3_class_metadata_compiler::*;
pub use r3_factory::*;
pub use r3_identifiers::Identifiers;
pub use r3_injector_compiler::*;
pub use r3_module_compiler::*;
pub use r3_pipe_compiler::*;
pub use util::*;
