// Annotations Directive Source Module

pub mod handler;
pub mod shared;

// Re-exports
pub use handler::{DirectiveAnalysis, DirectiveDecoratorHandler};
pub use shared::{
    extract_directive_metadata, extract_queries_from_decorator, extract_query_metadata, has_angular_class_decorator,
    members_with_decorator, parse_decorated_fields, queries_from_fields, type_checkable_meta, DecoratorQueries,
    DirectiveExtraction,
};
