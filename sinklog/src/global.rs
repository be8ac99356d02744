// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The process wide default logger used by the logging macros.

use crate::*;
use parking_lot::RwLock;
use std::sync::Arc;

static DEFAULT: RwLock<Option<Arc<Logger>>> = parking_lot::const_rwlock(None);

/// Replaces the default logger and returns the previous one, if any. The
/// previous logger is closed once the last reference to it is dropped.
pub fn set_logger(logger: Logger) -> Option<Arc<Logger>> {
    DEFAULT.write().replace(Arc::new(logger))
}

/// Returns the default logger. Until `set_logger` is called this is a
/// synchronous console logger at `Severity::Debug`.
pub fn logger() -> Arc<Logger> {
    if let Some(logger) = &*DEFAULT.read() {
        return logger.clone();
    }

    DEFAULT
        .write()
        .get_or_insert_with(|| Arc::new(Logger::new(ConsoleSink::new())))
        .clone()
}

/// Flushes the default logger, if one has been created.
pub fn flush() {
    let logger = DEFAULT.read().clone();
    if let Some(logger) = logger {
        logger.flush();
    }
}
