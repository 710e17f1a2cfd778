// TypeCheck API Module

pub mod api;

// Re-exports
pub use api::{TypeCheckBlockMetadata, TypeCheckableDirectiveMeta, TypeCtorFields, TypeCtorMetadata};
