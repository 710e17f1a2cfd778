// Annotations NgModule Source Module

pub mod handler;
pub mod module_with_providers;

pub use handler::{NgModuleAnalysis, NgModuleDecoratorHandler};
pub use module_with_providers::ModuleWithProvidersResolver;
