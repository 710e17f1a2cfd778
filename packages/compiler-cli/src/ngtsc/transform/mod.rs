//! Ivy compilation
//!
//! Drives the decorator handlers over a program and rewrites the emitted
//! sources and declarations with the static fields they produce.

pub mod src {
    pub mod api;
    pub mod compilation;
    pub mod declaration;
    pub mod transform;
}

pub use src::api::{Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult};
pub use src::compilation::{ClassRecord, IvyCompilation};
pub use src::declaration::{DtsFileTransformer, IvyDeclarationField};
pub use src::transform::{import_manager_for, transform_ivy_source_file};

#[cfg(test)]
mod test;
