// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by message queue producers and connectors.
pub type ProducerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while constructing loggers and sinks, or reported to the
/// diagnostic channel while they are running.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    #[error("log file path is empty")]
    EmptyPath,
    #[error("log file path must have an extension: {0}")]
    MissingExtension(PathBuf),
    #[error("invalid permission string {0:?}, expected an octal mode")]
    InvalidPermission(String),
    #[error("no sink was provided to the log builder")]
    MissingSink,
    #[error("unable to install the log bridge: {0}")]
    Install(#[from] log::SetLoggerError),
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        source: io::Error,
    },
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("flush failed: {0}")]
    Flush(#[source] io::Error),
    #[error("sink is closed")]
    Closed,
    #[error("log worker has stopped, message discarded")]
    WorkerStopped,
    #[error("producer error: {0}")]
    Producer(#[source] ProducerError),
    #[error("cannot find a free sequence number to rotate {0}")]
    SequenceExhausted(PathBuf),
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("failed to set permissions on {path}: {source}")]
    Permissions { path: PathBuf, source: io::Error },
    #[error("unable to delete expired log {path}: {source}")]
    Cleanup { path: PathBuf, source: io::Error },
}

/// Broad classification of an [`Error`], used to decide whether it is fatal
/// at construction time or only reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Write,
    Rotation,
    Cleanup,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPath
            | Self::MissingExtension(_)
            | Self::InvalidPermission(_)
            | Self::MissingSink
            | Self::Install(_)
            | Self::Spawn { .. } => ErrorKind::Configuration,
            Self::Write(_)
            | Self::Flush(_)
            | Self::Closed
            | Self::WorkerStopped
            | Self::Producer(_) => ErrorKind::Write,
            Self::Open { .. }
            | Self::SequenceExhausted(_)
            | Self::Rename { .. }
            | Self::Permissions { .. } => ErrorKind::Rotation,
            Self::Cleanup { .. } => ErrorKind::Cleanup,
        }
    }
}
