// Tracing Logger
//
// Forwards log messages to `tracing` events so that embedders can route
// compiler output through their own subscriber.

use super::logger::{LogLevel, Logger};

const TARGET: &str = "ngtsc";

pub struct TracingLogger {
    level: LogLevel,
}

impl TracingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for TracingLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn write(&self, level: LogLevel, msg: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: TARGET, "{}", msg),
            LogLevel::Info => tracing::info!(target: TARGET, "{}", msg),
            LogLevel::Warn => tracing::warn!(target: TARGET, "{}", msg),
            LogLevel::Error => tracing::error!(target: TARGET, "{}", msg),
        }
    }
}
