// Scope Source Module

pub mod api;
pub mod dependency;
pub mod selector_scope;

// Re-exports
pub use api::{CompilationScope, ModuleData, ScopeDirective};
pub use dependency::DependencyScopeReader;
pub use selector_scope::SelectorScopeRegistry;
