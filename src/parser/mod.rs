//! Access log line parser.
//!
//! This module provides a pure parsing function for converting one line written
//! with nginx's `ui_short` log format into a [`LogRecord`]:
//!
//! ```text
//! log_format ui_short '$remote_addr  $remote_user $http_x_real_ip [$time_local] "$request" '
//!                     '$status $body_bytes_sent "$http_referer" '
//!                     '"$http_user_agent" "$http_x_forwarded_for" "$http_X_REQUEST_ID" "$http_X_RB_USER" '
//!                     '$request_time';
//! ```
//!
//! Malformed lines are expected and frequent, so a non-matching line is reported as
//! `None` rather than as an error.

use crate::model::{LogRecord, RequestLine};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Placeholder nginx writes for an absent variable.
const ABSENT: &str = "-";

/// Grammar of a `ui_short` line, anchored at the start only.
///
/// Anything after `$request_time` (line terminator, extra fields) is ignored.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+) ", // $remote_addr
        r"([\da-f]+|-)\s{1,2}",                // $remote_user
        r"(.|-) ",                             // $http_x_real_ip
        r"\[([0-9]+/\w+/[0-9]+:[0-9]+:[0-9]+:[0-9]+ [+-][0-9]+)\] ", // [$time_local]
        r#""((?:(?:GET|POST|HEAD|PUT|OPTIONS) .+)|0)" "#, // $request
        r"([0-9]+) ",                          // $status
        r"([0-9]+) ",                          // $body_bytes_sent
        r#""(.*)" "#,                          // $http_referer
        r#""(.*)" "#,                          // $http_user_agent
        r#""(.*)" "#,                          // $http_x_forwarded_for
        r#""([0-9]+-[0-9]+-[0-9]+-[0-9]+|.+)" "#, // $http_X_REQUEST_ID
        r#""(.+)" "#,                          // $http_X_RB_USER
        r"([0-9]+\.[0-9]+)",                   // $request_time
    ))
    .expect("access log pattern is valid")
});

/// Parse a single access log line.
///
/// Returns `None` if the line does not match the grammar at any point; no partial
/// record is ever produced. Numeric fields that match the grammar but do not fit
/// their type (a status code above `u16::MAX`, say) are also treated as no match.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = LINE_PATTERN.captures(line)?;

    Some(LogRecord {
        remote_addr: group(&caps, 1).to_string(),
        remote_user: optional(group(&caps, 2)),
        real_ip: optional(group(&caps, 3)),
        time_local: group(&caps, 4).to_string(),
        request: RequestLine::new(group(&caps, 5)),
        status: group(&caps, 6).parse().ok()?,
        body_bytes_sent: group(&caps, 7).parse().ok()?,
        referer: group(&caps, 8).to_string(),
        user_agent: group(&caps, 9).to_string(),
        forwarded_for: group(&caps, 10).to_string(),
        request_id: group(&caps, 11).to_string(),
        rb_user: group(&caps, 12).to_string(),
        request_time: group(&caps, 13).parse().ok()?,
    })
}

/// Text of a capture group that the pattern always sets on a match.
fn group<'a>(caps: &Captures<'a>, index: usize) -> &'a str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn optional(value: &str) -> Option<String> {
    (value != ABSENT).then(|| value.to_string())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
