// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! This crate provides a leveled logging core which lays out messages and
//! writes them to a single pluggable `Sink`.
//!
//! A `Logger` is constructed with a `LogBuilder`. It filters messages by
//! `Severity`, optionally records the call site of each logging call, lays
//! the message out as a single line of text and hands it to its sink. By
//! default this happens on the calling thread. With a buffer configured the
//! text is queued instead and a background worker writes it, in order, to the
//! sink. `flush` and `close` wait for everything queued before them to be
//! written.
//!
//! Three sinks are provided:
//!
//! * `ConsoleSink` writes to standard output
//! * `FileSink` writes to a file and rotates it by size and at midnight,
//!   removing rotated files once they are older than a retention period
//! * `QueueSink` publishes each line to a message broker through a
//!   user-provided `Producer`
//!
//! The logging macros (`info!`, `warn!`, ...) use a process wide default
//! logger, which can be replaced with `set_logger`. Records from the `log`
//! crate can be forwarded with `install_log_bridge`.
//!
//! Errors which happen while logging are never returned to the caller. They
//! are passed to a `Reporter`, which writes to standard error by default.
//!
//! ```no_run
//! use sinklog::*;
//!
//! let sink = FileSink::builder("/var/log/app.log")
//!     .max_size(64 * 1024 * 1024)
//!     .max_days(7)
//!     .build()
//!     .expect("bad log config");
//!
//! let logger = Logger::builder()
//!     .level(Severity::Informational)
//!     .buffer(DEFAULT_BUFFER)
//!     .sink(sink)
//!     .build()
//!     .expect("failed to start logger");
//!
//! set_logger(logger);
//! info!("started");
//! flush();
//! ```

#[macro_use]
mod macros;

mod bridge;
mod console;
mod error;
mod file;
mod format;
mod global;
mod logger;
mod message;
mod queue;
mod report;
mod severity;
mod sink;

pub use bridge::*;
pub use console::*;
pub use error::*;
pub use file::*;
pub use format::*;
pub use global::*;
pub use logger::*;
pub use message::*;
pub use queue::*;
pub use report::{Reporter, StderrReporter};
pub use severity::*;
pub use sink::*;

pub(crate) use report::default_reporter;

#[cfg(feature = "metrics")]
mod metrics;

#[cfg(feature = "metrics")]
use metrics::*;
