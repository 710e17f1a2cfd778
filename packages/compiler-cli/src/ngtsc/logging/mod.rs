pub mod src {
    pub mod console_logger;
    pub mod logger;
    pub mod tracing_logger;
}

pub use src::console_logger::ConsoleLogger;
pub use src::logger::{LogLevel, Logger, NullLogger, UnknownLogLevel};
pub use src::tracing_logger::TracingLogger;

#[cfg(test)]
mod test;
