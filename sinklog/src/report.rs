// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The diagnostic channel. Sink and rotation failures are never written into
//! a sink's own output; they are handed to a `Reporter` instead.

use crate::Error;
use std::io::Write;
use std::sync::Arc;

/// Receives errors that cannot be returned to the caller, such as failed
/// writes on the logging hot path or failed rotations.
pub trait Reporter: Send + Sync {
    /// `source` names the component that failed, eg: the sink name.
    fn report(&self, source: &str, error: &Error);
}

/// Writes diagnostics to standard error.
#[derive(Copy, Clone, Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn report(&self, source: &str, error: &Error) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "sinklog: {source}: {error}");
    }
}

pub(crate) fn default_reporter() -> Arc<dyn Reporter> {
    Arc::new(StderrReporter)
}
