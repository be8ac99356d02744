// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::*;

use clocksource::datetime::DateTime;
use core::fmt::{Display, Write};

/// Turns a `MessageInfo` into the final line of text handed to a sink. The
/// returned text must end with a newline.
pub trait Layout: Send + Sync {
    fn layout(&self, info: &MessageInfo) -> String;
}

impl<F> Layout for F
where
    F: Fn(&MessageInfo) -> String + Send + Sync,
{
    fn layout(&self, info: &MessageInfo) -> String {
        self(info)
    }
}

/// The default layout:
///
/// `2024-01-02T03:04:05.678+00:00 [src/main.rs:10] [I] message`
///
/// where the call site is only present if it was captured.
#[derive(Copy, Clone, Debug, Default)]
pub struct BaseLayout;

impl Layout for BaseLayout {
    fn layout(&self, info: &MessageInfo) -> String {
        let mut out = String::with_capacity(info.text().len() + 48);
        let _ = write!(out, "{} ", DateTime::from(info.timestamp()));
        if let Some(site) = info.call_site() {
            let _ = write!(out, "[{site}] ");
        }
        out.push_str(info.severity().tag());
        out.push(' ');
        out.push_str(info.text());
        out.push('\n');
        out
    }
}

/// Renders a template with arguments.
///
/// * without arguments the template is returned unchanged
/// * if the template contains `%` directives (eg: `%s`, `%d`, `%v`, `%5.2f`)
///   each directive is replaced, in order, by the next argument.
///   Directives without a matching argument are left as-is and leftover
///   arguments are appended.
/// * otherwise every argument is appended, preceded by a single space
///
/// With arguments, `%%` is always written as a single percent sign.
pub fn render(template: &str, args: &[&dyn Display]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut args = args.iter();

    if has_directive(template) {
        let mut rest = template;
        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            match directive_len(tail) {
                Some(1) => {
                    // "%%"
                    out.push('%');
                    rest = &tail[2..];
                }
                Some(len) => {
                    match args.next() {
                        Some(arg) => {
                            let _ = write!(out, "{arg}");
                        }
                        None => out.push_str(&tail[..len]),
                    }
                    rest = &tail[len..];
                }
                None => {
                    out.push('%');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
    } else {
        out.push_str(&template.replace("%%", "%"));
    }

    for arg in args {
        let _ = write!(out, " {arg}");
    }

    out
}

fn has_directive(template: &str) -> bool {
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        let tail = &rest[start..];
        match directive_len(tail) {
            Some(1) => rest = &tail[2..],
            Some(_) => return true,
            None => rest = &tail[1..],
        }
    }
    false
}

/// For text beginning with `%`, returns the byte length of the directive.
/// `Some(1)` marks an escaped `%%`, `None` a lone percent sign.
fn directive_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    match bytes.get(1) {
        Some(b'%') => return Some(1),
        None => return None,
        _ => {}
    }
    let mut i = 1;
    while i < bytes.len() && matches!(bytes[i], b'+' | b'-' | b'#' | b' ' | b'0'..=b'9' | b'.') {
        i += 1;
    }
    match bytes.get(i) {
        Some(c) if c.is_ascii_alphabetic() => Some(i + 1),
        _ => None,
    }
}
