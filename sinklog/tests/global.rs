// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use sinklog::*;
use std::sync::Arc;

#[derive(Clone, Default)]
struct Lines {
    lines: Arc<Mutex<Vec<String>>>,
    destroyed: Arc<Mutex<bool>>,
}

impl Lines {
    fn get(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Sink for Lines {
    fn name(&self) -> String {
        "lines".to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn write(&self, text: &str) -> Result<()> {
        self.lines.lock().push(text.to_string());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        *self.destroyed.lock() = true;
        Ok(())
    }
}

fn text(info: &MessageInfo) -> String {
    format!("{}\n", info.text())
}

// the default logger is process wide, so this is a single test
#[test]
fn default_logger() {
    let first = Lines::default();
    let previous = set_logger(Logger::builder().sink(first.clone()).layout(text).build().unwrap());
    assert!(previous.is_none());

    info!("to first {}", 1);
    debug!(logger: logger(), "explicit {}", "logger");
    logger().set_level(Severity::Notice);
    info!("filtered");

    let second = Lines::default();
    let previous = set_logger(
        Logger::builder()
            .sink(second.clone())
            .layout(text)
            .buffer(8)
            .build()
            .unwrap(),
    )
    .unwrap();
    drop(previous);
    assert!(*first.destroyed.lock());

    warn!("to second");
    install_log_bridge().unwrap();
    log::warn!("bridged {}", 2);
    log::trace!("trace as debug");
    flush();

    assert_eq!(first.get(), ["to first 1\n", "explicit logger\n"]);
    assert_eq!(
        second.get(),
        ["to second\n", "bridged 2\n", "trace as debug\n"]
    );

    assert!(install_log_bridge().is_err());
}
