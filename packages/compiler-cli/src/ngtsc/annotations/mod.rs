//! Decorator handlers
//!
//! One handler per Angular class decorator. Each reads its decorator through
//! the reflection host and the partial evaluator, records what it learns in
//! the selector scope registry and produces the static fields of the class.

pub mod base_def;
pub mod common;
pub mod component;
pub mod directive;
pub mod injectable;
pub mod ng_module;
pub mod pipe;

pub use base_def::{BaseDefAnalysis, BaseDefDecoratorHandler};
pub use component::{ComponentAnalysis, ComponentDecoratorHandler};
pub use directive::{DirectiveAnalysis, DirectiveDecoratorHandler};
pub use injectable::{InjectableAnalysis, InjectableDecoratorHandler};
pub use ng_module::{NgModuleAnalysis, NgModuleDecoratorHandler};
pub use pipe::{PipeAnalysis, PipeDecoratorHandler};

#[cfg(test)]
mod test;
