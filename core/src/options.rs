//! Typed transport options.
//!
//! Each variant maps to exactly one typed setter on the HTTP engine. Options
//! can also be given by their libcurl name (`CURLOPT_TIMEOUT`, `timeout`, ...);
//! names outside this table are rejected rather than looked up dynamically.

use std::mem;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::OptionError;

/// HTTP protocol version requested from the engine. Only HTTP/1.x is offered:
/// the decomposer reads `HTTP/<d>.<d>` status lines, which HTTP/2 transfers
/// do not produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    V10,
    V11,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOption {
    Timeout(Duration),
    ConnectTimeout(Duration),
    FollowLocation(bool),
    MaxRedirections(u32),
    HttpVersion(HttpVersion),
    UserAgent(String),
    Referer(String),
    AutoReferer(bool),
    Proxy(String),
    NoProxy(String),
    SslVerifyPeer(bool),
    SslVerifyHost(bool),
    AcceptEncoding(String),
    CaInfo(PathBuf),
}

impl TransportOption {
    /// Parse an option from its libcurl name and a textual value.
    pub fn from_name(name: &str, value: &str) -> Result<Self, OptionError> {
        let upper = name.trim().to_ascii_uppercase();
        let key = upper.strip_prefix("CURLOPT_").unwrap_or(&upper);
        let invalid = || OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        let option = match key {
            "TIMEOUT" => TransportOption::Timeout(Duration::from_secs(parse_number(value).ok_or_else(invalid)?)),
            "TIMEOUT_MS" => TransportOption::Timeout(Duration::from_millis(parse_number(value).ok_or_else(invalid)?)),
            "CONNECTTIMEOUT" => {
                TransportOption::ConnectTimeout(Duration::from_secs(parse_number(value).ok_or_else(invalid)?))
            }
            "CONNECTTIMEOUT_MS" => {
                TransportOption::ConnectTimeout(Duration::from_millis(parse_number(value).ok_or_else(invalid)?))
            }
            "FOLLOWLOCATION" => TransportOption::FollowLocation(parse_flag(value).ok_or_else(invalid)?),
            "MAXREDIRS" => {
                let max = parse_number(value).ok_or_else(invalid)?;
                TransportOption::MaxRedirections(u32::try_from(max).map_err(|_| invalid())?)
            }
            "HTTP_VERSION" => TransportOption::HttpVersion(parse_http_version(value).ok_or_else(invalid)?),
            "USERAGENT" => TransportOption::UserAgent(value.to_string()),
            "REFERER" => TransportOption::Referer(value.to_string()),
            "AUTOREFERER" => TransportOption::AutoReferer(parse_flag(value).ok_or_else(invalid)?),
            "PROXY" => TransportOption::Proxy(value.to_string()),
            "NOPROXY" => TransportOption::NoProxy(value.to_string()),
            "SSL_VERIFYPEER" => TransportOption::SslVerifyPeer(parse_flag(value).ok_or_else(invalid)?),
            // libcurl treats 2 as "verify"; 1 is a legacy alias.
            "SSL_VERIFYHOST" => TransportOption::SslVerifyHost(parse_flag(value).ok_or_else(invalid)?),
            "ENCODING" | "ACCEPT_ENCODING" => TransportOption::AcceptEncoding(value.to_string()),
            "CAINFO" => TransportOption::CaInfo(PathBuf::from(value)),
            _ => return Err(OptionError::Unknown(name.to_string())),
        };
        Ok(option)
    }

    /// True when both options configure the same engine setting.
    pub fn same_kind(&self, other: &TransportOption) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

fn parse_number(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "2" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_http_version(value: &str) -> Option<HttpVersion> {
    let upper = value.trim().to_ascii_uppercase();
    let version = upper.strip_prefix("CURL_HTTP_VERSION_").unwrap_or(&upper);
    match version {
        "1_0" | "1.0" => Some(HttpVersion::V10),
        "1_1" | "1.1" => Some(HttpVersion::V11),
        _ => None,
    }
}
