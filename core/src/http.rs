//! HTTP request types for the host-does-IO split.
//!
//! # Design
//! `Client::build_request` turns configuration plus call arguments into an
//! `HttpRequest` value; a `Transport` executes it. Everything the transport
//! needs is in the value, so request building is testable without a network
//! and a transport never reads client state.

use std::fmt;
use std::path::PathBuf;

use crate::options::TransportOption;
use crate::types::HeaderFields;

/// HTTP method for a request. `Custom` verbs are sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Custom(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Custom(verb) => verb,
        }
    }

    /// GET and HEAD carry their payload in the query string.
    pub fn is_bodyless(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl From<&str> for HttpMethod {
    fn from(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Custom(verb.to_string()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding for structured request payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Enctype {
    #[default]
    FormUrlEncoded,
    Multipart,
}

impl Enctype {
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().eq_ignore_ascii_case("multipart/form-data") {
            Enctype::Multipart
        } else {
            Enctype::FormUrlEncoded
        }
    }
}

/// Request body as handed to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    None,
    Encoded(String),
    Multipart(Vec<(String, String)>),
}

impl RequestBody {
    pub fn is_none(&self) -> bool {
        matches!(self, RequestBody::None)
    }
}

/// Basic-auth credentials. A missing password is sent as empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A fully prepared HTTP request described as plain data.
///
/// `options` are applied by the transport after every other setting, so they
/// can override anything derived from the remaining fields.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderFields,
    pub body: RequestBody,
    pub user_agent: String,
    pub cookie_file: Option<PathBuf>,
    pub credentials: Option<Credentials>,
    pub options: Vec<TransportOption>,
}

impl HttpRequest {
    /// Header lines in `Name: value` form, in insertion order.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect()
    }
}
