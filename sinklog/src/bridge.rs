// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Forwards records from the `log` facade to a `Logger`, so that libraries
//! using `log` end up in the same sink as everything else.

use crate::logger::in_sink;
use crate::*;
use log::{LevelFilter, Metadata, Record};
use std::sync::Arc;

/// A `log::Log` implementation backed by a `Logger`. `Trace` records are
/// treated as `Debug`.
pub struct LogBridge {
    logger: Option<Arc<Logger>>,
}

impl LogBridge {
    /// Forwards to a specific logger.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger: Some(logger),
        }
    }

    /// Forwards to whichever logger is the default at the time of each
    /// record.
    pub fn global() -> Self {
        Self { logger: None }
    }

    fn target(&self) -> Arc<Logger> {
        match &self.logger {
            Some(logger) => logger.clone(),
            None => logger(),
        }
    }

    /// Registers the bridge with the `log` crate. This can only succeed once
    /// per process.
    pub fn install(self) -> Result<()> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(LevelFilter::Trace);
        Ok(())
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !in_sink() && self.target().enabled(Severity::from(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        // eg: a broker client logging from inside `Producer::send`
        if in_sink() {
            return;
        }

        let call_site = match (record.file_static(), record.line()) {
            (Some(file), Some(line)) => Some(CallSite::new(file, line)),
            _ => None,
        };
        self.target()
            .log_at(Severity::from(record.level()), record.args(), call_site);
    }

    fn flush(&self) {
        self.target().flush();
    }
}

/// Installs a bridge to the default logger.
pub fn install_log_bridge() -> Result<()> {
    LogBridge::global().install()
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Lines(Arc<Mutex<Vec<String>>>);

    impl Sink for Lines {
        fn name(&self) -> String {
            "lines".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn write(&self, text: &str) -> Result<()> {
            self.0.lock().push(text.to_string());
            Ok(())
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn destroy(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn forwards_records() {
        let lines = Lines::default();
        let logger = Arc::new(
            Logger::builder()
                .sink(lines.clone())
                .level(Severity::Informational)
                .call_site(true)
                .build()
                .unwrap(),
        );
        let bridge = LogBridge::new(logger);

        let warn = Metadata::builder().level(log::Level::Warn).build();
        let trace = Metadata::builder().level(log::Level::Trace).build();
        assert!(bridge.enabled(&warn));
        assert!(!bridge.enabled(&trace));

        bridge.log(
            &Record::builder()
                .level(log::Level::Warn)
                .args(format_args!("from {}", "log"))
                .file_static(Some("src/net.rs"))
                .line(Some(12))
                .build(),
        );
        bridge.log(
            &Record::builder()
                .level(log::Level::Debug)
                .args(format_args!("filtered"))
                .build(),
        );

        let lines = lines.0.lock();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" [src/net.rs:12] [W] from log\n"));
    }

    /// Logs through a bridge while holding its own lock, like a broker
    /// client which logs from inside `send`.
    struct Chatty {
        bridge: Arc<Mutex<Option<LogBridge>>>,
        lines: Lines,
    }

    impl Sink for Chatty {
        fn name(&self) -> String {
            "chatty".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn write(&self, text: &str) -> Result<()> {
            let bridge = self.bridge.lock();
            if let Some(bridge) = &*bridge {
                let metadata = Metadata::builder().level(log::Level::Debug).build();
                assert!(!bridge.enabled(&metadata));
                bridge.log(
                    &Record::builder()
                        .level(log::Level::Debug)
                        .args(format_args!("sent {} bytes", text.len()))
                        .build(),
                );
            }
            self.lines.write(text)
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn destroy(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn records_from_inside_a_sink_are_dropped() {
        for buffer in [None, Some(2)] {
            let lines = Lines::default();
            let slot = Arc::new(Mutex::new(None));
            let mut builder = Logger::builder()
                .sink(Chatty {
                    bridge: slot.clone(),
                    lines: lines.clone(),
                })
                .layout(|info: &MessageInfo| format!("{}\n", info.text()));
            if let Some(buffer) = buffer {
                builder = builder.buffer(buffer);
            }
            let logger = Arc::new(builder.build().unwrap());
            *slot.lock() = Some(LogBridge::new(logger.clone()));

            logger.info("hello");
            logger.info("again");
            logger.flush();
            assert_eq!(*lines.0.lock(), ["hello\n", "again\n"], "buffer: {buffer:?}");

            // breaks the cycle between the sink and the bridge
            slot.lock().take();
            logger.close();
        }
    }
}
