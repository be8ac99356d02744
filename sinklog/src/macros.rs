// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Logs a message at the given `Severity`, using the default logger unless
/// one is given with `logger:`. The arguments are only formatted if the
/// severity passes the logger's threshold.
///
/// ```
/// # use sinklog::*;
/// let logger = Logger::new(ConsoleSink::new());
/// log!(logger: logger, Severity::Notice, "listening on {}", 8080);
/// log!(Severity::Informational, "using the default logger");
/// ```
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::Severity = $level;
        if logger.enabled(level) {
            logger.log(level, format_args!($($arg)+));
        }
    }};
    ($level:expr, $($arg:tt)+) => {{
        let logger = $crate::logger();
        $crate::log!(logger: logger, $level, $($arg)+)
    }};
}

#[macro_export]
macro_rules! emergency {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Emergency, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Emergency, $($arg)+));
}

#[macro_export]
macro_rules! alert {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Alert, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Alert, $($arg)+));
}

#[macro_export]
macro_rules! critical {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Critical, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Critical, $($arg)+));
}

#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Error, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Error, $($arg)+));
}

#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Warning, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Warning, $($arg)+));
}

#[macro_export]
macro_rules! notice {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Notice, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Notice, $($arg)+));
}

#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Informational, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Informational, $($arg)+));
}

#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => ($crate::log!(logger: $logger, $crate::Severity::Debug, $($arg)+));
    ($($arg:tt)+) => ($crate::log!($crate::Severity::Debug, $($arg)+));
}

#[cfg(feature = "metrics")]
macro_rules! metrics {
    { $( $tt:tt )* } => { $( $tt )* }
}

#[cfg(not(feature = "metrics"))]
macro_rules! metrics {
    { $( $tt:tt)* } => {}
}
