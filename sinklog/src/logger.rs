// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use core::fmt::Display;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::{Once, RwLock};
use std::cell::Cell;
use std::panic::Location;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Queue length used by `LogBuilder::buffer` when none is given explicitly.
pub const DEFAULT_BUFFER: usize = 1024;

/// A logger which lays out messages that pass its severity threshold and
/// writes them to a single `Sink`, either directly from the calling thread
/// or through a background worker.
///
/// The logging methods never fail. Errors from the sink are handed to the
/// logger's `Reporter`.
///
/// Calling any logging method after `close` is a misuse: the message is
/// discarded.
pub struct Logger {
    threshold: AtomicU8,
    call_site: AtomicBool,
    layout: Box<dyn Layout>,
    sink: Arc<SinkHandle>,
    pipeline: RwLock<Pipeline>,
}

thread_local! {
    static IN_SINK: Cell<bool> = const { Cell::new(false) };
}

/// Returns true while the current thread is running sink code for a logger.
/// Anything logged from there is discarded, it would re-enter the sink.
pub(crate) fn in_sink() -> bool {
    IN_SINK.with(Cell::get)
}

/// Marks the current thread as inside a sink until dropped.
struct SinkGuard(bool);

impl SinkGuard {
    fn enter() -> Self {
        Self(IN_SINK.with(|flag| flag.replace(true)))
    }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        IN_SINK.with(|flag| flag.set(self.0));
    }
}

/// Signals sent from the logger to its background worker. Each carries a
/// channel on which the worker acknowledges completion.
enum Control {
    Flush(Sender<()>),
    Close(Sender<()>),
}

enum Pipeline {
    Sync,
    Async(Worker),
    Closed,
}

struct Worker {
    sink: Arc<SinkHandle>,
    data: Sender<String>,
    control: Sender<Control>,
    thread: JoinHandle<()>,
}

/// The sink together with its one-time initialization and error reporting.
struct SinkHandle {
    sink: Box<dyn Sink>,
    name: String,
    init: Once,
    reporter: Arc<dyn Reporter>,
}

impl SinkHandle {
    fn report(&self, error: &Error) {
        self.reporter.report(&self.name, error);
    }

    fn write(&self, text: &str) {
        let _guard = SinkGuard::enter();
        self.init.call_once(|| {
            if let Err(e) = self.sink.initialize() {
                self.report(&e);
            }
        });

        metrics! {
            LOG_WRITE.increment();
        }

        match self.sink.write(text) {
            Ok(()) => {
                metrics! {
                    LOG_WRITE_BYTE.add(text.len() as u64);
                }
            }
            Err(e) => {
                metrics! {
                    LOG_WRITE_EX.increment();
                }
                self.report(&e);
            }
        }
    }

    fn flush(&self) {
        let _guard = SinkGuard::enter();
        metrics! {
            LOG_FLUSH.increment();
        }
        if let Err(e) = self.sink.flush() {
            metrics! {
                LOG_FLUSH_EX.increment();
            }
            self.report(&e);
        }
    }

    fn destroy(&self) {
        let _guard = SinkGuard::enter();
        if let Err(e) = self.sink.destroy() {
            self.report(&e);
        }
    }
}

impl Worker {
    fn spawn(sink: Arc<SinkHandle>, buffer: usize) -> Result<Self> {
        let (data, data_rx) = bounded(buffer.max(1));
        // zero capacity, a signal is handed directly to the worker
        let (control, control_rx) = bounded(0);

        let worker_sink = sink.clone();
        let thread = std::thread::Builder::new()
            .name("sinklog-worker".to_string())
            .spawn(move || run(&worker_sink, data_rx, control_rx))
            .map_err(|source| Error::Spawn {
                name: "log worker",
                source,
            })?;

        Ok(Self {
            sink,
            data,
            control,
            thread,
        })
    }

    fn signal(&self, signal: fn(Sender<()>) -> Control) {
        let (ack, done) = bounded(1);
        let acked = self.control.send(signal(ack)).is_ok() && done.recv().is_ok();
        if !acked {
            self.sink.report(&Error::WorkerStopped);
        }
    }

    fn close(self) {
        self.signal(Control::Close);
        drop(self.data);
        drop(self.control);
        let _ = self.thread.join();
    }
}

fn run(sink: &SinkHandle, data: Receiver<String>, control: Receiver<Control>) {
    loop {
        select! {
            recv(data) -> text => match text {
                Ok(text) => sink.write(&text),
                Err(_) => break,
            },
            recv(control) -> signal => {
                // deliver what was queued ahead of the signal
                for _ in 0..data.len() {
                    match data.try_recv() {
                        Ok(text) => sink.write(&text),
                        Err(_) => break,
                    }
                }

                match signal {
                    Ok(Control::Flush(ack)) => {
                        sink.flush();
                        let _ = ack.send(());
                    }
                    Ok(Control::Close(ack)) => {
                        sink.flush();
                        sink.destroy();
                        let _ = ack.send(());
                        break;
                    }
                    Err(_) => break,
                }
            }
        }
    }
}

impl Logger {
    /// Returns a builder for a `Logger`.
    pub fn builder() -> LogBuilder {
        LogBuilder::new()
    }

    /// A synchronous logger at `Severity::Debug` with the default layout.
    pub fn new<S: Sink + 'static>(sink: S) -> Self {
        Self::from_parts(
            Box::new(sink),
            Box::new(BaseLayout),
            default_reporter(),
            Severity::Debug,
            false,
        )
    }

    fn from_parts(
        sink: Box<dyn Sink>,
        layout: Box<dyn Layout>,
        reporter: Arc<dyn Reporter>,
        level: Severity,
        call_site: bool,
    ) -> Self {
        metrics! {
            LOG_CREATE.increment();
            LOG_CURR.increment();
        }

        let name = sink.name();
        Self {
            threshold: AtomicU8::new(level as u8),
            call_site: AtomicBool::new(call_site),
            layout,
            sink: Arc::new(SinkHandle {
                sink,
                name,
                init: Once::new(),
                reporter,
            }),
            pipeline: RwLock::new(Pipeline::Sync),
        }
    }

    /// Sets the most verbose severity which will be emitted.
    pub fn set_level(&self, level: Severity) {
        self.threshold.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> Severity {
        Severity::from_u8(self.threshold.load(Ordering::Relaxed)).unwrap_or(Severity::Debug)
    }

    /// Include the `file:line` of each logging call in the output.
    pub fn set_call_site(&self, enabled: bool) {
        self.call_site.store(enabled, Ordering::Relaxed);
    }

    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.permitted_by(self.level())
    }

    pub fn is_async(&self) -> bool {
        matches!(*self.pipeline.read(), Pipeline::Async(_))
    }

    /// Moves delivery onto a background worker with a queue of `buffer`
    /// messages. Once the queue is full, logging calls block until the
    /// worker catches up. Has no effect if the logger is already
    /// asynchronous or has been closed.
    pub fn set_async(&self, buffer: usize) -> Result<()> {
        let mut pipeline = self.pipeline.write();
        if matches!(*pipeline, Pipeline::Sync) {
            *pipeline = Pipeline::Async(Worker::spawn(self.sink.clone(), buffer)?);
        }
        Ok(())
    }

    /// Logs `message` at `severity`. Nothing is formatted if the severity is
    /// filtered out.
    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl Display) {
        if !self.enabled(severity) {
            return;
        }
        let call_site = CallSite::from(Location::caller());
        self.emit(severity, message.to_string(), Some(call_site));
    }

    /// Logs a template with arguments, see `render` for the rules.
    ///
    /// ```
    /// # use sinklog::*;
    /// let logger = Logger::new(ConsoleSink::new());
    /// logger.logv(Severity::Notice, "user %s logged in", &[&"alice"]);
    /// logger.logv(Severity::Notice, "connected", &[&"db1", &5432]);
    /// ```
    #[track_caller]
    pub fn logv(&self, severity: Severity, template: &str, args: &[&dyn Display]) {
        if !self.enabled(severity) {
            return;
        }
        let call_site = CallSite::from(Location::caller());
        self.emit(severity, render(template, args), Some(call_site));
    }

    #[track_caller]
    pub fn emergency(&self, message: impl Display) {
        self.log(Severity::Emergency, message)
    }

    #[track_caller]
    pub fn alert(&self, message: impl Display) {
        self.log(Severity::Alert, message)
    }

    #[track_caller]
    pub fn critical(&self, message: impl Display) {
        self.log(Severity::Critical, message)
    }

    #[track_caller]
    pub fn error(&self, message: impl Display) {
        self.log(Severity::Error, message)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Display) {
        self.log(Severity::Warning, message)
    }

    #[track_caller]
    pub fn notice(&self, message: impl Display) {
        self.log(Severity::Notice, message)
    }

    #[track_caller]
    pub fn info(&self, message: impl Display) {
        self.log(Severity::Informational, message)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        self.log(Severity::Debug, message)
    }

    /// Logs with a call site which was captured elsewhere, eg: from a
    /// `log::Record`.
    pub(crate) fn log_at(
        &self,
        severity: Severity,
        message: impl Display,
        call_site: Option<CallSite>,
    ) {
        if !self.enabled(severity) {
            return;
        }
        self.emit(severity, message.to_string(), call_site);
    }

    fn emit(&self, severity: Severity, text: String, call_site: Option<CallSite>) {
        let call_site = call_site.filter(|_| self.call_site.load(Ordering::Relaxed));
        let info = MessageInfo::new(severity, text, call_site);
        self.submit(self.layout.layout(&info));
    }

    fn submit(&self, text: String) {
        if in_sink() {
            metrics! {
                LOG_DROP.increment();
                LOG_DROP_BYTE.add(text.len() as u64);
            }
            return;
        }

        match &*self.pipeline.read() {
            Pipeline::Sync => self.sink.write(&text),
            Pipeline::Async(worker) => {
                // blocks while the queue is full
                if let Err(_unsent) = worker.data.send(text) {
                    metrics! {
                        LOG_DROP.increment();
                        LOG_DROP_BYTE.add(_unsent.0.len() as u64);
                    }
                    self.sink.report(&Error::WorkerStopped);
                }
            }
            Pipeline::Closed => {}
        }
    }

    /// Forces everything logged so far through to the sink and flushes it.
    /// In asynchronous mode this waits for the worker to acknowledge.
    pub fn flush(&self) {
        // the worker cannot acknowledge a flush requested from its own sink
        if in_sink() {
            return;
        }

        match &*self.pipeline.read() {
            Pipeline::Sync => self.sink.flush(),
            Pipeline::Async(worker) => worker.signal(Control::Flush),
            Pipeline::Closed => {}
        }
    }

    /// Delivers everything already queued, flushes and destroys the sink,
    /// and stops the worker if there is one. Calling `close` again has no
    /// effect.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.pipeline.write(), Pipeline::Closed);
        match previous {
            Pipeline::Sync => {
                self.sink.flush();
                self.sink.destroy();
            }
            Pipeline::Async(worker) => worker.close(),
            Pipeline::Closed => return,
        }

        metrics! {
            LOG_DESTROY.increment();
            LOG_CURR.decrement();
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Settings for a `Logger`, as they might appear in a config file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogConfig {
    pub level: Severity,
    pub call_site: bool,
    /// Queue length for asynchronous delivery. `None` logs synchronously.
    pub buffer: Option<usize>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Severity::Debug,
            call_site: false,
            buffer: None,
        }
    }
}

/// A type to construct a `Logger`.
pub struct LogBuilder {
    config: LogConfig,
    sink: Option<Box<dyn Sink>>,
    layout: Option<Box<dyn Layout>>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self {
            config: LogConfig::default(),
            sink: None,
            layout: None,
            reporter: None,
        }
    }
}

impl LogBuilder {
    /// Create a new log builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Takes the level, call site and buffer settings from `config`.
    pub fn config(mut self, config: &LogConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Sets the most verbose severity which will be emitted.
    pub fn level(mut self, level: Severity) -> Self {
        self.config.level = level;
        self
    }

    /// Include the call site of each message.
    pub fn call_site(mut self, enabled: bool) -> Self {
        self.config.call_site = enabled;
        self
    }

    /// Deliver messages asynchronously through a queue of `buffer` slots.
    pub fn buffer(mut self, buffer: usize) -> Self {
        self.config.buffer = Some(buffer);
        self
    }

    /// Sets the sink. Required.
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Sets the layout. Defaults to `BaseLayout`.
    pub fn layout<L: Layout + 'static>(mut self, layout: L) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    /// Where sink errors are reported. Defaults to standard error.
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Consumes the builder and returns a `Logger`.
    pub fn build(self) -> Result<Logger> {
        let sink = self.sink.ok_or(Error::MissingSink)?;
        let logger = Logger::from_parts(
            sink,
            self.layout.unwrap_or_else(|| Box::new(BaseLayout)),
            self.reporter.unwrap_or_else(default_reporter),
            self.config.level,
            self.config.call_site,
        );
        if let Some(buffer) = self.config.buffer {
            logger.set_async(buffer)?;
        }
        Ok(logger)
    }
}
