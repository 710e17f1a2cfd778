// Annotations Injectable Source Module

pub mod handler;

pub use handler::{InjectableAnalysis, InjectableDecoratorHandler};
