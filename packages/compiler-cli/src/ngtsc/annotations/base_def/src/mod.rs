// Annotations Base Definition Source Module

pub mod handler;

pub use handler::{BaseDefAnalysis, BaseDefDecoratorHandler};
