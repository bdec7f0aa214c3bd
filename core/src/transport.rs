//! The I/O seam: executing a prepared `HttpRequest`.
//!
//! # Design
//! A `Transport` returns the response exactly as the engine emitted it, with
//! every received header block inline ahead of the body, plus a metadata map
//! holding the literal outgoing request header block under `request_header`.
//! The decomposer depends on that format only, so any engine able to produce
//! it can stand in for `CurlTransport` (tests use an in-memory one).
//!
//! `CurlTransport` drives libcurl. Each call gets its own easy handle, which
//! is dropped before `execute` returns; dropping it also flushes the cookie
//! jar. Concurrent transfers sharing one jar path are not coordinated.

use curl::easy::{Auth, Easy, Form, HttpVersion as CurlHttpVersion, InfoType, List};
use log::{trace, warn};
use serde_json::Value;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, RequestBody};
use crate::options::{HttpVersion, TransportOption};
use crate::types::{RequestInfo, REQUEST_HEADER};

/// Raw output of one transfer.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    pub raw: Vec<u8>,
    pub info: RequestInfo,
}

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<Exchange, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<Exchange, TransportError> {
        (**self).execute(request)
    }
}

/// libcurl-backed transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlTransport;

impl CurlTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for CurlTransport {
    fn execute(&self, request: &HttpRequest) -> Result<Exchange, TransportError> {
        let mut easy = Easy::new();
        configure(&mut easy, request)?;

        let mut raw = Vec::new();
        let mut request_header = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                raw.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.debug_function(|kind, data| {
                if matches!(kind, InfoType::HeaderOut) {
                    capture_request_header(&mut request_header, data);
                }
            })?;
            transfer.perform().map_err(|err| {
                warn!("{} {} failed: {err}", request.method, request.url);
                TransportError::from(err)
            })?;
        }

        let request_header = String::from_utf8_lossy(&request_header).into_owned();
        trace!("sent request headers {request_header:?}");
        let info = collect_info(&mut easy, request_header)?;
        Ok(Exchange { raw, info })
    }
}

impl From<curl::Error> for TransportError {
    fn from(err: curl::Error) -> Self {
        TransportError::new(err.to_string(), i64::from(err.code()))
    }
}

fn configure(easy: &mut Easy, request: &HttpRequest) -> Result<(), TransportError> {
    match &request.method {
        HttpMethod::Head => easy.nobody(true)?,
        HttpMethod::Get => easy.get(true)?,
        HttpMethod::Post => easy.post(true)?,
        other => easy.custom_request(other.as_str())?,
    }
    easy.url(&request.url)?;

    match &request.body {
        RequestBody::None if request.method == HttpMethod::Post => easy.post_field_size(0)?,
        RequestBody::None => {}
        RequestBody::Encoded(body) => easy.post_fields_copy(body.as_bytes())?,
        RequestBody::Multipart(fields) => {
            let mut form = Form::new();
            for (name, value) in fields {
                form.part(name)
                    .contents(value.as_bytes())
                    .add()
                    .map_err(|err| TransportError::new(err.to_string(), -1))?;
            }
            easy.httppost(form)?;
        }
    }

    easy.verbose(true)?;
    easy.show_header(true)?;
    easy.http_version(CurlHttpVersion::V11)?;
    easy.useragent(&request.user_agent)?;

    if let Some(path) = &request.cookie_file {
        easy.cookie_file(path)?;
        easy.cookie_jar(path)?;
    }

    if let Some(credentials) = &request.credentials {
        let mut auth = Auth::new();
        auth.basic(true);
        easy.http_auth(&auth)?;
        easy.username(&credentials.username)?;
        easy.password(credentials.password.as_deref().unwrap_or(""))?;
    }

    let mut headers = List::new();
    for line in request.header_lines() {
        headers.append(&line)?;
    }
    easy.http_headers(headers)?;

    for option in &request.options {
        apply_option(easy, option)?;
    }
    Ok(())
}

fn apply_option(easy: &mut Easy, option: &TransportOption) -> Result<(), curl::Error> {
    match option {
        TransportOption::Timeout(timeout) => easy.timeout(*timeout),
        TransportOption::ConnectTimeout(timeout) => easy.connect_timeout(*timeout),
        TransportOption::FollowLocation(on) => easy.follow_location(*on),
        TransportOption::MaxRedirections(max) => easy.max_redirections(*max),
        TransportOption::HttpVersion(version) => easy.http_version(match version {
            HttpVersion::V10 => CurlHttpVersion::V10,
            HttpVersion::V11 => CurlHttpVersion::V11,
        }),
        TransportOption::UserAgent(agent) => easy.useragent(agent),
        TransportOption::Referer(referer) => easy.referer(referer),
        TransportOption::AutoReferer(on) => easy.autoreferer(*on),
        TransportOption::Proxy(proxy) => easy.proxy(proxy),
        TransportOption::NoProxy(hosts) => easy.noproxy(hosts),
        TransportOption::SslVerifyPeer(on) => easy.ssl_verify_peer(*on),
        TransportOption::SslVerifyHost(on) => easy.ssl_verify_host(*on),
        TransportOption::AcceptEncoding(encoding) => easy.accept_encoding(encoding),
        TransportOption::CaInfo(path) => easy.cainfo(path),
    }
}

/// Keep only the most recent request header block; the engine sends a new one
/// for every redirect or auth round trip.
fn capture_request_header(buffer: &mut Vec<u8>, data: &[u8]) {
    if buffer.ends_with(b"\r\n\r\n") {
        buffer.clear();
    }
    buffer.extend_from_slice(data);
}

fn collect_info(easy: &mut Easy, request_header: String) -> Result<RequestInfo, TransportError> {
    let mut info = RequestInfo::new();
    info.insert("url".into(), optional(easy.effective_url()?));
    info.insert("content_type".into(), optional(easy.content_type()?));
    info.insert("http_code".into(), Value::from(easy.response_code()?));
    info.insert("header_size".into(), Value::from(easy.header_size()?));
    info.insert("request_size".into(), Value::from(easy.request_size()?));
    info.insert("redirect_count".into(), Value::from(easy.redirect_count()?));
    info.insert("redirect_url".into(), optional(easy.redirect_url()?));
    info.insert("total_time".into(), Value::from(easy.total_time()?.as_secs_f64()));
    info.insert("namelookup_time".into(), Value::from(easy.namelookup_time()?.as_secs_f64()));
    info.insert("connect_time".into(), Value::from(easy.connect_time()?.as_secs_f64()));
    info.insert("pretransfer_time".into(), Value::from(easy.pretransfer_time()?.as_secs_f64()));
    info.insert("starttransfer_time".into(), Value::from(easy.starttransfer_time()?.as_secs_f64()));
    info.insert("redirect_time".into(), Value::from(easy.redirect_time()?.as_secs_f64()));
    info.insert("primary_ip".into(), optional(easy.primary_ip()?));
    info.insert("primary_port".into(), Value::from(easy.primary_port()?));
    info.insert("local_ip".into(), optional(easy.local_ip()?));
    info.insert("local_port".into(), Value::from(easy.local_port()?));
    info.insert(REQUEST_HEADER.into(), Value::from(request_header));
    Ok(info)
}

fn optional(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}
