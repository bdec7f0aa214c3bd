//! Parsed HTTP response.
//!
//! A `Response` is built once from the transport's raw output and its request
//! metadata and never changes afterwards. Every keyed accessor returns
//! `None` for a missing key.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::decompose::{decompose, parse_request_headers};
use crate::error::ParseError;
use crate::types::{HeaderFields, RequestInfo, REQUEST_HEADER};

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    #[serde(serialize_with = "serialize_lossy")]
    body: Vec<u8>,
    headers: HeaderFields,
    request_headers: HeaderFields,
    info: RequestInfo,
}

impl Response {
    /// Decompose raw transport output (header blocks inline with the body)
    /// together with the transport's request metadata.
    pub fn parse(raw: &[u8], info: RequestInfo) -> Result<Self, ParseError> {
        let decomposed = decompose(raw)?;
        let request_headers = info
            .get(REQUEST_HEADER)
            .and_then(|value| value.as_str())
            .map(parse_request_headers)
            .unwrap_or_default();

        Ok(Self {
            body: decomposed.body,
            headers: decomposed.headers,
            request_headers,
            info,
        })
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// All response headers of the final header block, including the
    /// synthetic `Http-Version`, `Status-Code` and `Status` entries.
    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    /// A single response header by exact (case-sensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Headers of the request as the transport sent it, plus `Method`, `Path`
    /// and `Version`.
    pub fn request_headers(&self) -> &HeaderFields {
        &self.request_headers
    }

    pub fn request_header(&self, name: &str) -> Option<&str> {
        self.request_headers.get(name)
    }

    /// Status code followed by the reason phrase, e.g. `"200 OK"`.
    pub fn status(&self) -> Option<&str> {
        self.header("Status")
    }

    pub fn status_code(&self) -> Option<&str> {
        self.header("Status-Code")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    pub fn info(&self) -> &RequestInfo {
        &self.info
    }

    pub fn info_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.info.get(key)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

fn serialize_lossy<S: serde::Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}
