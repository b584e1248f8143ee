//! Parsed access log records.
//!
//! A [`LogRecord`] is the immutable output of the line parser: one field per
//! `log_format ui_short` variable, with `-` placeholders turned into `None`.

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Format of nginx `$time_local` without the surrounding brackets.
const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Literal nginx writes for `$request` when the client sent no request line.
pub const EMPTY_REQUEST: &str = "0";

/// HTTP methods accepted by the access log grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `HEAD`
    Head,
    /// `PUT`
    Put,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Parse an exact, upper-case method token.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "HEAD" => Some(Self::Head),
            "PUT" => Some(Self::Put),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Method name as it appears in the log.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Head => "HEAD",
            Self::Put => "PUT",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The quoted `$request` field: `<METHOD> <path> <protocol>` or the `0` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine(String);

impl RequestLine {
    /// Wrap raw request text exactly as it appeared between the quotes.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw request text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the `0` sentinel nginx writes for empty requests.
    pub fn is_empty_request(&self) -> bool {
        self.0 == EMPTY_REQUEST
    }

    /// Leading method token, if it is one of the supported methods.
    pub fn method(&self) -> Option<HttpMethod> {
        self.0.split_whitespace().next().and_then(HttpMethod::parse)
    }

    /// Aggregation key for this request.
    ///
    /// The second whitespace-delimited token (the path) when present, otherwise the
    /// first token. The fallback covers the `0` sentinel and method-only requests.
    pub fn endpoint_key(&self) -> &str {
        let mut tokens = self.0.split_whitespace();
        let first = tokens.next().unwrap_or("");
        tokens.next().unwrap_or(first)
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One successfully parsed access log line.
///
/// # Invariants
///
/// - `request_time >= 0.0` (the grammar only admits unsigned decimals)
/// - `request` is either the `0` sentinel or starts with a supported method token
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// `$remote_addr`, an IPv4 literal.
    pub remote_addr: String,
    /// `$remote_user`; `None` for `-`.
    pub remote_user: Option<String>,
    /// `$http_x_real_ip`; `None` for `-`.
    pub real_ip: Option<String>,
    /// `$time_local` without brackets, kept verbatim.
    pub time_local: String,
    /// `$request`.
    pub request: RequestLine,
    /// `$status`.
    pub status: u16,
    /// `$body_bytes_sent`.
    pub body_bytes_sent: u64,
    /// `$http_referer`, possibly empty or `-`.
    pub referer: String,
    /// `$http_user_agent`, possibly empty or `-`.
    pub user_agent: String,
    /// `$http_x_forwarded_for`, possibly empty or `-`.
    pub forwarded_for: String,
    /// `$http_X_REQUEST_ID`.
    pub request_id: String,
    /// `$http_X_RB_USER`.
    pub rb_user: String,
    /// `$request_time` in seconds.
    pub request_time: f64,
}

impl LogRecord {
    /// Aggregation key, see [`RequestLine::endpoint_key`].
    pub fn endpoint_key(&self) -> &str {
        self.request.endpoint_key()
    }

    /// `$time_local` parsed as a zoned timestamp.
    ///
    /// `None` when the text has the right shape but is not a real date
    /// (for example an unknown month abbreviation).
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.time_local, TIME_LOCAL_FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_key_uses_path_token() {
        let request = RequestLine::new("GET /api/v2/banner/25019354 HTTP/1.1");
        assert_eq!(request.endpoint_key(), "/api/v2/banner/25019354");
    }

    #[test]
    fn endpoint_key_falls_back_to_sentinel() {
        let request = RequestLine::new("0");
        assert!(request.is_empty_request());
        assert_eq!(request.endpoint_key(), "0");
    }

    #[test]
    fn endpoint_key_falls_back_to_method_only() {
        let request = RequestLine::new("GET  ");
        assert_eq!(request.endpoint_key(), "GET");
    }

    #[test]
    fn endpoint_key_of_blank_request_is_empty() {
        assert_eq!(RequestLine::new("   ").endpoint_key(), "");
    }

    #[test]
    fn method_parses_known_tokens() {
        assert_eq!(
            RequestLine::new("OPTIONS /x HTTP/1.1").method(),
            Some(HttpMethod::Options)
        );
        assert_eq!(RequestLine::new("0").method(), None);
        assert_eq!(RequestLine::new("get /x").method(), None);
    }

    #[test]
    fn method_display_matches_log_token() {
        for token in ["GET", "POST", "HEAD", "PUT", "OPTIONS"] {
            let method = HttpMethod::parse(token).expect("known method");
            assert_eq!(method.to_string(), token);
        }
    }
}
