//! Template type-checking
//!
//! Generates type check blocks for component templates and type
//! constructors for the directives they use, so that a regular TypeScript
//! type checker reports template errors.

pub mod api;

pub mod src {
    pub mod context;
    pub mod expression;
    pub mod type_check_block;
    pub mod type_constructor;
}

pub use api::{TypeCheckBlockMetadata, TypeCheckableDirectiveMeta, TypeCtorFields, TypeCtorMetadata};
pub use src::context::TypeCheckContext;
pub use src::type_check_block::generate_type_check_block;
pub use src::type_constructor::generate_type_ctor;

#[cfg(test)]
mod test;
