// Logging Tests

use super::*;

mod log_level_tests {
    use super::*;

    #[test]
    fn should_order_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn should_parse_level_names() {
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" WARN ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn should_reject_unknown_level() {
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert_eq!(err, UnknownLogLevel("verbose".to_string()));
        assert!(err.to_string().contains("'verbose'"));
    }
}

mod console_logger_tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn should_check_level_enabled() {
        let logger = ConsoleLogger::new(LogLevel::Warn);
        assert_eq!(logger.level(), LogLevel::Warn);
        assert!(!logger.is_enabled(LogLevel::Debug));
        assert!(!logger.is_enabled(LogLevel::Info));
        assert!(logger.is_enabled(LogLevel::Warn));
        assert!(logger.is_enabled(LogLevel::Error));
    }

    #[test]
    fn should_write_prefixed_lines_at_or_above_level() {
        let buffer = Buffer::default();
        let logger = ConsoleLogger::with_sink(LogLevel::Info, Box::new(buffer.clone()));
        logger.debug("skipped");
        logger.info("analyzing /app/main.ts");
        logger.error("failed");
        assert_eq!(
            buffer.contents(),
            "ngtsc [info] analyzing /app/main.ts\nngtsc [error] failed\n"
        );
    }
}

mod tracing_logger_tests {
    use super::*;

    #[test]
    fn should_default_to_debug() {
        let logger = TracingLogger::default();
        assert!(logger.is_enabled(LogLevel::Debug));
        // No subscriber is installed, so these are dropped.
        logger.debug("analyzing /app/a.ts");
        logger.warn("second handler ignored");
    }
}

mod null_logger_tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn should_disable_every_level() {
        let logger: Arc<dyn Logger> = Arc::new(NullLogger::new());
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error] {
            assert!(!logger.is_enabled(level));
        }
        logger.error("error message");
    }
}
