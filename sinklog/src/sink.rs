// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Result;

/// A backend which durably stores or transmits formatted log text.
///
/// Methods take `&self` so that a sink may be shared between the logger,
/// its background worker and any housekeeping the sink runs on its own.
/// Implementations serialize their mutable state internally.
pub trait Sink: Send + Sync {
    /// A short name used when reporting errors, eg: `file(app.log)`.
    fn name(&self) -> String;

    /// Prepares the backend for writing. Called at most once by the logger,
    /// before the first write.
    fn initialize(&self) -> Result<()>;

    /// Appends `text` verbatim. Calls made in sequence by one writer must be
    /// observed by the backend in the same order.
    fn write(&self, text: &str) -> Result<()>;

    /// Forces buffered data to be durable or transmitted.
    fn flush(&self) -> Result<()>;

    /// Releases backend resources. Called once at end of life; no further
    /// writes follow.
    fn destroy(&self) -> Result<()>;
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn initialize(&self) -> Result<()> {
        (**self).initialize()
    }

    fn write(&self, text: &str) -> Result<()> {
        (**self).write(text)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn destroy(&self) -> Result<()> {
        (**self).destroy()
    }
}

impl<T: Sink + ?Sized> Sink for std::sync::Arc<T> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn initialize(&self) -> Result<()> {
        (**self).initialize()
    }

    fn write(&self, text: &str) -> Result<()> {
        (**self).write(text)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn destroy(&self) -> Result<()> {
        (**self).destroy()
    }
}
