//! Configurable HTTP client.
//!
//! # Design
//! `Client` is a move-style builder: every setter consumes the client and
//! returns it, and request methods only borrow it. Each request method is
//! split into `build_request`, which turns configuration plus call arguments
//! into an `HttpRequest` without touching the network, and the transport
//! round-trip. Cloning a client gives an independent configuration.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, OptionError};
use crate::http::{Credentials, Enctype, HttpMethod, HttpRequest, RequestBody};
use crate::options::TransportOption;
use crate::response::Response;
use crate::transport::{CurlTransport, Transport};
use crate::types::{HeaderFields, Vars};

/// Default cookie jar, relative to the process working directory.
pub const DEFAULT_COOKIE_FILE: &str = "curl_cookie.txt";

/// User agent sent unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("curlish/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Client<T = CurlTransport> {
    transport: T,
    headers: HeaderFields,
    options: Vec<TransportOption>,
    cookie_file: Option<PathBuf>,
    credentials: Option<Credentials>,
    user_agent: String,
}

impl Client<CurlTransport> {
    pub fn new() -> Self {
        Self::with_transport(CurlTransport::new())
    }
}

impl Default for Client<CurlTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            headers: HeaderFields::new(),
            options: Vec::new(),
            cookie_file: Some(PathBuf::from(DEFAULT_COOKIE_FILE)),
            credentials: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Send `name: value` with every request, replacing an earlier value for
    /// the same name.
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Override a transport setting. Options are applied after all defaults;
    /// a later option of the same kind replaces the earlier one.
    pub fn set_option(mut self, option: TransportOption) -> Self {
        match self.options.iter_mut().find(|existing| existing.same_kind(&option)) {
            Some(slot) => *slot = option,
            None => self.options.push(option),
        }
        self
    }

    /// Like [`Client::set_option`], with the option given by its libcurl name.
    pub fn set_option_named(self, name: &str, value: &str) -> Result<Self, OptionError> {
        let option = TransportOption::from_name(name, value)?;
        Ok(self.set_option(option))
    }

    /// Read and write cookies from `path` (Netscape cookie-file format, owned
    /// by the transport).
    pub fn set_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub fn disable_cookie_file(mut self) -> Self {
        self.cookie_file = None;
        self
    }

    pub fn cookie_file(&self) -> Option<&Path> {
        self.cookie_file.as_deref()
    }

    pub fn set_basic_auth(mut self, username: impl Into<String>, password: Option<&str>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.map(str::to_string),
        });
        self
    }

    pub fn set_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn get(&self, url: &str, vars: impl Into<Vars>) -> Result<Response, Error> {
        self.request(HttpMethod::Get, url, vars, None)
    }

    pub fn head(&self, url: &str, vars: impl Into<Vars>) -> Result<Response, Error> {
        self.request(HttpMethod::Head, url, vars, None)
    }

    pub fn post(&self, url: &str, vars: impl Into<Vars>, enctype: Option<Enctype>) -> Result<Response, Error> {
        self.request(HttpMethod::Post, url, vars, enctype)
    }

    pub fn put(&self, url: &str, vars: impl Into<Vars>) -> Result<Response, Error> {
        self.request(HttpMethod::Put, url, vars, None)
    }

    pub fn delete(&self, url: &str, vars: impl Into<Vars>) -> Result<Response, Error> {
        self.request(HttpMethod::Delete, url, vars, None)
    }

    /// Perform one request and decompose the transport's raw output.
    pub fn request(
        &self,
        method: impl Into<HttpMethod>,
        url: &str,
        vars: impl Into<Vars>,
        enctype: Option<Enctype>,
    ) -> Result<Response, Error> {
        let request = self.build_request(method.into(), url, vars.into(), enctype);
        debug!("{} {}", request.method, request.url);

        let exchange = self.transport.execute(&request)?;
        let response = Response::parse(&exchange.raw, exchange.info)?;
        debug!(
            "{} {} -> {}",
            request.method,
            request.url,
            response.status().unwrap_or("<no status>")
        );
        Ok(response)
    }

    /// Build the `HttpRequest` for a call without executing it.
    pub fn build_request(&self, method: HttpMethod, url: &str, vars: Vars, enctype: Option<Enctype>) -> HttpRequest {
        let mut url = url.to_string();
        let body = if vars.is_empty() {
            RequestBody::None
        } else if method.is_bodyless() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&vars.to_form_urlencoded());
            RequestBody::None
        } else {
            match (vars, enctype.unwrap_or_default()) {
                (Vars::Fields(fields), Enctype::Multipart) => RequestBody::Multipart(fields),
                (vars, _) => RequestBody::Encoded(vars.to_form_urlencoded()),
            }
        };

        HttpRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
            user_agent: self.user_agent.clone(),
            cookie_file: self.cookie_file.clone(),
            credentials: self.credentials.clone(),
            options: self.options.clone(),
        }
    }
}
