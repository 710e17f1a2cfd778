// Annotations Component Source Module

pub mod handler;

pub use handler::{ComponentAnalysis, ComponentDecoratorHandler};
