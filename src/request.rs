//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Buf;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;

use crate::body::Body;

/// An incoming HTTP request.
///
/// The body stays an unread stream until a stage materializes it; handlers
/// reached through the [`Router`](crate::Router) always see it buffered.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Body) -> Self {
        Self { method, uri, headers, body, params: HashMap::new() }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    /// The buffered body. Empty if the body has not been materialized yet.
    pub fn body(&self) -> &[u8] { self.body.as_bytes() }

    /// A fresh reader over the buffered body. Each call starts at byte zero
    /// and reading it leaves the request untouched.
    pub fn body_reader(&self) -> impl std::io::Read + use<> {
        self.body.as_bytes().clone().reader()
    }

    /// Deserializes the buffered body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(self.body())
    }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/widgets/{id}`, `req.param("id")` on `/widgets/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl<B: Into<Body>> From<http::Request<B>> for Request {
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body.into())
    }
}
