//! Access log format module
//!
//! Supported formats:
//! - `combined` (Apache/Nginx combined format, also used for unknown names)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)

use chrono::{DateTime, Local};
use std::fmt::Write;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request, as written to the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Request path including the query string, if any
    pub uri: String,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Start an entry stamped with the current time
    pub fn new(remote_addr: String, method: String, uri: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            uri,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.method,
            self.uri,
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Common format followed by `"$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push('{');
        push_field(&mut out, "remote_addr", Some(&self.remote_addr));
        push_field(&mut out, "time", Some(&self.time.to_rfc3339()));
        push_field(&mut out, "method", Some(&self.method));
        push_field(&mut out, "uri", Some(&self.uri));
        push_field(&mut out, "http_version", Some(&self.http_version));
        let _ = write!(
            out,
            "\"status\":{},\"body_bytes\":{},\"request_time_us\":{},",
            self.status, self.body_bytes, self.request_time_us
        );
        push_field(&mut out, "referer", self.referer.as_deref());
        push_field(&mut out, "user_agent", self.user_agent.as_deref());
        out.pop(); // trailing comma
        out.push('}');
        out
    }
}

fn push_field(out: &mut String, key: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            let _ = write!(out, "\"{key}\":\"{}\",", escape_json(v));
        }
        None => {
            let _ = write!(out, "\"{key}\":null,");
        }
    }
}

fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(result, "\\u{:04x}", c as u32);
            }
            c => result.push(c),
        }
    }
    result
}
