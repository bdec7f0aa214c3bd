//! Minimal HTTP client over libcurl.
//!
//! # Overview
//! `Client` issues GET/HEAD/POST/PUT/DELETE (or any custom verb) requests with
//! configured headers, a cookie jar, basic auth and raw transport options.
//! The transport returns the response with its header blocks inline; the
//! decomposer turns that into a `Response` exposing status, headers, body,
//! the headers the request was actually sent with, and transport metadata.
//!
//! # Design
//! - `Client::build_request` produces an `HttpRequest` as plain data; the
//!   `Transport` trait is the only place that performs I/O.
//! - `CurlTransport` is the default transport. Tests swap in an in-memory one.
//! - Header-block scanning is a finite byte scan: every block is stripped
//!   from the body, the last one supplies the parsed headers.

pub mod client;
mod decompose;
pub mod error;
pub mod http;
pub mod options;
pub mod response;
pub mod transport;
pub mod types;

pub use client::Client;
pub use error::{Error, OptionError, ParseError, TransportError};
pub use http::{Credentials, Enctype, HttpMethod, HttpRequest, RequestBody};
pub use options::{HttpVersion, TransportOption};
pub use response::Response;
pub use transport::{CurlTransport, Exchange, Transport};
pub use types::{HeaderFields, RequestInfo, Vars, REQUEST_HEADER};
