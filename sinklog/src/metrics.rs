// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use metriken::{metric, Counter, Gauge};

#[metric(name = "log_create", description = "loggers created")]
pub static LOG_CREATE: Counter = Counter::new();

#[metric(name = "log_destroy", description = "loggers closed")]
pub static LOG_DESTROY: Counter = Counter::new();

#[metric(name = "log_curr", description = "current number of open loggers")]
pub static LOG_CURR: Gauge = Gauge::new();

#[metric(
    name = "log_open",
    description = "number of times a log file has been opened"
)]
pub static LOG_OPEN: Counter = Counter::new();

#[metric(name = "log_rotate", description = "number of log file rotations")]
pub static LOG_ROTATE: Counter = Counter::new();

#[metric(
    name = "log_rotate_ex",
    description = "number of exceptions while rotating log files"
)]
pub static LOG_ROTATE_EX: Counter = Counter::new();

#[metric(
    name = "log_cleanup",
    description = "number of expired log files removed"
)]
pub static LOG_CLEANUP: Counter = Counter::new();

#[metric(
    name = "log_cleanup_ex",
    description = "number of exceptions while removing expired log files"
)]
pub static LOG_CLEANUP_EX: Counter = Counter::new();

#[metric(name = "log_write", description = "number of writes to sinks")]
pub static LOG_WRITE: Counter = Counter::new();

#[metric(
    name = "log_write_byte",
    description = "number of bytes written to sinks"
)]
pub static LOG_WRITE_BYTE: Counter = Counter::new();

#[metric(
    name = "log_write_ex",
    description = "number of exceptions while writing to sinks"
)]
pub static LOG_WRITE_EX: Counter = Counter::new();

#[metric(
    name = "log_drop",
    description = "number of log messages dropped, logged from inside a sink or after the worker stopped"
)]
pub static LOG_DROP: Counter = Counter::new();

#[metric(
    name = "log_drop_byte",
    description = "number of bytes in dropped log messages"
)]
pub static LOG_DROP_BYTE: Counter = Counter::new();

#[metric(name = "log_flush", description = "number of times sinks have been flushed")]
pub static LOG_FLUSH: Counter = Counter::new();

#[metric(
    name = "log_flush_ex",
    description = "number of exceptions while flushing sinks"
)]
pub static LOG_FLUSH_EX: Counter = Counter::new();
