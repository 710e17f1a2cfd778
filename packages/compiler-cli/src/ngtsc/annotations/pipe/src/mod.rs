// Annotations Pipe Source Module

pub mod handler;

pub use handler::{PipeAnalysis, PipeDecoratorHandler};
