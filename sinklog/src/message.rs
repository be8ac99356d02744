// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Severity;
use clocksource::precise::UnixInstant;
use core::fmt;
use std::panic::Location;

/// Source location of a logging call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single message which passed the level filter and is ready to be laid
/// out. It is not modified after construction.
#[derive(Clone, Debug)]
pub struct MessageInfo {
    severity: Severity,
    text: String,
    timestamp: UnixInstant,
    call_site: Option<CallSite>,
}

impl MessageInfo {
    pub fn new(severity: Severity, text: String, call_site: Option<CallSite>) -> Self {
        Self::with_timestamp(severity, text, UnixInstant::now(), call_site)
    }

    pub fn with_timestamp(
        severity: Severity,
        text: String,
        timestamp: UnixInstant,
        call_site: Option<CallSite>,
    ) -> Self {
        Self {
            severity,
            text,
            timestamp,
            call_site,
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> UnixInstant {
        self.timestamp
    }

    pub fn call_site(&self) -> Option<CallSite> {
        self.call_site
    }
}
