use axum::{
    extract::{Path, RawQuery},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

/// What `/echo` saw of the request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub const SESSION_COOKIE: &str = "session";

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/cookies/set", get(set_cookie))
        .route("/cookies/echo", get(echo_cookie))
        .route("/auth/basic", get(basic_auth))
        .route("/redirect", get(redirect))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let echo = Echo {
        method: method.to_string(),
        query,
        content_type,
        body,
    };
    ([("x-echo-method", method.to_string())], Json(echo))
}

async fn set_cookie() -> impl IntoResponse {
    let session = Uuid::new_v4().to_string();
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}={session}; Path=/"))],
        session,
    )
}

async fn echo_cookie(headers: HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn basic_auth(headers: HeaderMap) -> Result<String, impl IntoResponse> {
    match headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok()) {
        Some(value) if value.starts_with("Basic ") => Ok(value.to_string()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"mock\"")],
        )),
    }
}

async fn redirect() -> Redirect {
    Redirect::to("/echo")
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
    Ok((status, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "POST".to_string(),
            query: Some("a=1".to_string()),
            content_type: None,
            body: "name=jhon".to_string(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["query"], "a=1");
        assert!(json["content_type"].is_null());
        assert_eq!(json["body"], "name=jhon");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "GET".to_string(),
            query: None,
            content_type: Some("text/plain".to_string()),
            body: String::new(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }
}
