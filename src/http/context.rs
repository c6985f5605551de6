//! Per-request context.
//!
//! # Responsibilities
//! - Carry the request (method, URI, headers, buffered body) to handlers
//! - Expose the matched pattern and captured path parameters
//! - Collect the response (status, headers, body) written by handlers
//!
//! # Design Decisions
//! - Created fresh for every request and dropped after the handler returns
//! - Body is fully buffered by the server before dispatch

use axum::body::Bytes;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::routing::Params;

#[derive(Debug)]
pub struct Context {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    pattern: Option<String>,
    params: Params,
    response: ResponseSink,
}

/// Response accumulated while the handler chain runs.
#[derive(Debug)]
struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

impl Context {
    /// Create a context with no headers and an empty body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            pattern: None,
            params: Params::default(),
            response: ResponseSink::default(),
        }
    }

    /// Build a context from a request whose body has already been buffered.
    pub fn from_parts(parts: axum::http::request::Parts, body: Bytes) -> Self {
        let mut ctx = Self::new(parts.method, parts.uri);
        ctx.headers = parts.headers;
        ctx.body = body;
        ctx
    }

    /// Replace the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replace the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path without the query string.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Registered pattern the request was routed by, once dispatched.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn set_route(&mut self, pattern: String, params: Params) {
        self.pattern = Some(pattern);
        self.params = params;
    }

    pub fn write_status(&mut self, code: u16) {
        self.response.status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Set a response header. Invalid names or values are dropped with a warning.
    pub fn write_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.response.headers.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }

    /// Append bytes to the response body.
    pub fn write_body(&mut self, bytes: impl AsRef<[u8]>) {
        self.response.body.extend_from_slice(bytes.as_ref());
    }

    /// Write a plain-text response.
    pub fn string(&mut self, code: u16, text: impl AsRef<str>) {
        self.write_status(code);
        self.write_header(CONTENT_TYPE.as_str(), "text/plain; charset=utf-8");
        self.write_body(text.as_ref());
    }

    /// Write a JSON response.
    pub fn json<T: Serialize>(&mut self, code: u16, value: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.write_status(code);
        self.write_header(CONTENT_TYPE.as_str(), "application/json");
        self.write_body(body);
        Ok(())
    }

    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    pub fn response_body(&self) -> &[u8] {
        &self.response.body
    }
}

impl IntoResponse for Context {
    fn into_response(self) -> Response {
        let ResponseSink { status, headers, body } = self.response;
        (status, headers, body).into_response()
    }
}

impl From<Request<Bytes>> for Context {
    fn from(req: Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body)
    }
}
