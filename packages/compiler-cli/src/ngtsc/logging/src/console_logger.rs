// Console Logger
//
// Writes `ngtsc [level] message` lines to stderr, or to any sink handed in
// by the embedder.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use super::logger::{LogLevel, Logger};

pub struct ConsoleLogger {
    level: LogLevel,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleLogger {
    pub fn new(level: LogLevel) -> Self {
        Self::with_sink(level, Box::new(io::stderr()))
    }

    pub fn with_sink(level: LogLevel, sink: Box<dyn Write + Send>) -> Self {
        Self {
            level,
            sink: Mutex::new(sink),
        }
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn write(&self, level: LogLevel, msg: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed stderr is not worth failing a compilation over.
        let _ = writeln!(sink, "ngtsc [{}] {}", level, msg);
    }
}
