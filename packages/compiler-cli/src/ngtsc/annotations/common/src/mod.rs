// Annotations Common Source Module

pub mod di;
pub mod evaluation;
pub mod metadata;
pub mod util;

// Re-exports
pub use di::get_constructor_dependencies;
pub use evaluation::{decorator_object_literal, AnalysisContext};
pub use metadata::generate_set_class_metadata_call;
pub use util::{
    expand_forward_ref, extract_directive_guards, find_angular_decorator, is_angular_core, is_angular_decorator,
    is_angular_decorator_named, parse_field_to_property_mapping, resolve_string_array, unwrap_expression,
    unwrap_forward_ref, wrap_expression, DirectiveGuards, ForwardRefResolver,
};
