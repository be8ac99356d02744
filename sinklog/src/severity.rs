// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;
use core::str::FromStr;

/// RFC 5424 message severities, ordered from least to most verbose.
///
/// A logger configured with a threshold of `Warning` emits `Emergency`
/// through `Warning` and discards `Notice`, `Informational` and `Debug`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Informational = 6,
    Debug = 7,
}

const TAGS: [&str; 8] = ["[M]", "[A]", "[C]", "[E]", "[W]", "[N]", "[I]", "[D]"];

const NAMES: [&str; 8] = [
    "emergency",
    "alert",
    "critical",
    "error",
    "warning",
    "notice",
    "informational",
    "debug",
];

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Informational,
        Severity::Debug,
    ];

    /// The short tag written in front of each message, eg: `[W]`.
    pub fn tag(self) -> &'static str {
        TAGS[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        NAMES[self as usize]
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Returns true if a message of this severity passes a logger whose
    /// threshold is `threshold`.
    #[inline]
    pub fn permitted_by(self, threshold: Severity) -> bool {
        self <= threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseSeverityError(String);

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity: {:?}", self.0)
    }
}

impl std::error::Error for ParseSeverityError {}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Accepts the full name, a few common aliases, or the numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let severity = match lower.as_str() {
            "emergency" | "emerg" => Severity::Emergency,
            "alert" => Severity::Alert,
            "critical" | "crit" => Severity::Critical,
            "error" | "err" => Severity::Error,
            "warning" | "warn" => Severity::Warning,
            "notice" => Severity::Notice,
            "informational" | "info" => Severity::Informational,
            "debug" => Severity::Debug,
            other => other
                .parse::<u8>()
                .ok()
                .and_then(Severity::from_u8)
                .ok_or_else(|| ParseSeverityError(s.to_string()))?,
        };
        Ok(severity)
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info => Severity::Informational,
            log::Level::Debug | log::Level::Trace => Severity::Debug,
        }
    }
}

impl From<Severity> for log::LevelFilter {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                log::LevelFilter::Error
            }
            Severity::Warning => log::LevelFilter::Warn,
            Severity::Notice | Severity::Informational => log::LevelFilter::Info,
            Severity::Debug => log::LevelFilter::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Emergency < Severity::Debug);
        assert!(Severity::Warning.permitted_by(Severity::Warning));
        assert!(Severity::Error.permitted_by(Severity::Warning));
        assert!(!Severity::Notice.permitted_by(Severity::Warning));
    }

    #[test]
    fn tags() {
        let tags: Vec<&str> = Severity::ALL.iter().map(|s| s.tag()).collect();
        assert_eq!(tags, ["[M]", "[A]", "[C]", "[E]", "[W]", "[N]", "[I]", "[D]"]);
    }

    #[test]
    fn parse() {
        assert_eq!("warn".parse(), Ok(Severity::Warning));
        assert_eq!("Informational".parse(), Ok(Severity::Informational));
        assert_eq!("7".parse(), Ok(Severity::Debug));
        assert!("8".parse::<Severity>().is_err());
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn log_levels() {
        assert_eq!(Severity::from(log::Level::Trace), Severity::Debug);
        assert_eq!(Severity::from(log::Level::Warn), Severity::Warning);
        assert_eq!(
            log::LevelFilter::from(Severity::Critical),
            log::LevelFilter::Error
        );
    }
}
