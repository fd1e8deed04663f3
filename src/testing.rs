//! Test harness: synthetic requests through the real pipeline.
//!
//! Each call builds a fresh pipeline from the [`App`], sends one request
//! through it, and checks the response:
//!
//! - A `500` is always a failure. A JSON `500` must decode as
//!   [`ErrorResponse`] and the failure message carries its `error`; a body
//!   that does not decode fails with `could not decode response body`. Only
//!   the plain-text `500` the pipeline itself sends for an unreadable request
//!   body is reported as-is, without a decode attempt; a plain-text `500`
//!   from a handler is a decode failure like any other.
//! - Anything else must match the expected status, and the `*_json`
//!   helpers also require `content-type: application/json`.
//!
//! Failures go to a [`Reporter`]. The default, [`Panic`], fails the test
//! the way `assert!` does; [`Collect`] records messages instead
//! (`Harness::new(app).with_reporter(Collect::default())`).
//!
//! ```rust
//! # use portico::{App, Request, Response, Router};
//! # use portico::testing::Harness;
//! # use http::StatusCode;
//! fn routes(router: Router, _store: &()) -> Router {
//!     router.get("/widgets/{id}", |_req: Request| async { Response::json(r#"{"id":1}"#) })
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let harness = Harness::new(App::new(()).routes(routes));
//! let res = harness.get_json("/widgets/1", StatusCode::OK).await;
//! assert_eq!(res.text(), r#"{"id":1}"#);
//! # }
//! ```

use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::app::App;
use crate::body::Body;
use crate::envelope::ErrorResponse;
use crate::request::Request;

const JSON: &str = "application/json";

// ── Reporter ──────────────────────────────────────────────────────────────────

/// Where harness failures go.
pub trait Reporter {
    fn fail(&self, message: String);
}

/// Panics on the first failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct Panic;

impl Reporter for Panic {
    fn fail(&self, message: String) {
        panic!("{message}");
    }
}

/// Records failures for later inspection instead of panicking.
#[derive(Debug, Default)]
pub struct Collect {
    failures: Mutex<Vec<String>>,
}

impl Collect {
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.failures.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Reporter for Collect {
    fn fail(&self, message: String) {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).push(message);
    }
}

// ── Recorded ──────────────────────────────────────────────────────────────────

/// The response to one harness call.
///
/// A request that could not be built records as an empty `200`; the
/// reporter has already been told.
#[derive(Clone, Debug, Default)]
pub struct Recorded {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    body_unreadable: bool,
}

impl Recorded {
    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

// ── Harness ───────────────────────────────────────────────────────────────────

/// Drives requests through a freshly built pipeline per call.
pub struct Harness<S, R = Panic> {
    app: App<S>,
    reporter: R,
}

impl<S: Send + Sync + 'static> Harness<S, Panic> {
    pub fn new(app: App<S>) -> Self {
        Self { app, reporter: Panic }
    }
}

impl<S: Send + Sync + 'static, R: Reporter> Harness<S, R> {
    /// Swaps the failure sink.
    pub fn with_reporter<T: Reporter>(self, reporter: T) -> Harness<S, T> {
        Harness { app: self.app, reporter }
    }

    pub fn reporter(&self) -> &R { &self.reporter }

    pub fn app(&self) -> &App<S> { &self.app }

    /// `GET` with no body; checks the status only.
    pub async fn get(&self, dest: &str, expected: StatusCode) -> Recorded {
        self.request(Method::GET, dest, Bytes::new(), expected).await
    }

    /// `GET` with no body; checks status and JSON content-type.
    pub async fn get_json(&self, dest: &str, expected: StatusCode) -> Recorded {
        self.json_request(Method::GET, dest, Bytes::new(), expected).await
    }

    /// `DELETE` with no body; checks status and JSON content-type.
    pub async fn delete_json(&self, dest: &str, expected: StatusCode) -> Recorded {
        self.json_request(Method::DELETE, dest, Bytes::new(), expected).await
    }

    /// `POST` with a JSON body; checks status and JSON content-type.
    pub async fn post_json(
        &self,
        dest: &str,
        payload: impl Into<Bytes>,
        expected: StatusCode,
    ) -> Recorded {
        self.json_request(Method::POST, dest, payload.into(), expected).await
    }

    /// `PUT` with a JSON body; checks status and JSON content-type.
    pub async fn put_json(
        &self,
        dest: &str,
        payload: impl Into<Bytes>,
        expected: StatusCode,
    ) -> Recorded {
        self.json_request(Method::PUT, dest, payload.into(), expected).await
    }

    /// Any method and body; checks the status only.
    pub async fn request(
        &self,
        method: Method,
        dest: &str,
        body: Bytes,
        expected: StatusCode,
    ) -> Recorded {
        match self.build(method, dest, body, None) {
            Some(req) => self.send(req, expected).await,
            None => Recorded::default(),
        }
    }

    /// Sends a prepared request; checks the status only.
    pub async fn send(&self, req: Request, expected: StatusCode) -> Recorded {
        let recorded = self.dispatch(req).await;
        self.classify(&recorded, expected);
        recorded
    }

    async fn json_request(
        &self,
        method: Method,
        dest: &str,
        body: Bytes,
        expected: StatusCode,
    ) -> Recorded {
        let content_type = (!body.is_empty()).then_some(JSON);
        let Some(req) = self.build(method, dest, body, content_type) else {
            return Recorded::default();
        };

        let recorded = self.dispatch(req).await;
        if self.classify(&recorded, expected) {
            self.check_eq(
                Some(JSON),
                recorded.content_type(),
                "response content-type was not application/json",
            );
        }
        recorded
    }

    fn build(
        &self,
        method: Method,
        dest: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Option<Request> {
        let mut req = http::Request::builder().method(method.clone()).uri(dest);
        if let Some(content_type) = content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        match req.body(Body::from(body)) {
            Ok(req) => Some(Request::from(req)),
            Err(e) => {
                self.reporter.fail(format!("could not create new {method} {dest} request: {e}"));
                None
            }
        }
    }

    async fn dispatch(&self, req: Request) -> Recorded {
        let res = self.app.pipeline().handle(req).await;
        Recorded {
            status: res.status,
            headers: res.headers,
            body: res.body,
            body_unreadable: res.body_unreadable,
        }
    }

    /// Reports a `500` or a status mismatch. Returns `false` for a `500`,
    /// after which no further checks apply.
    fn classify(&self, recorded: &Recorded, expected: StatusCode) -> bool {
        if recorded.status != StatusCode::INTERNAL_SERVER_ERROR {
            self.check_eq(expected, recorded.status, "unexpected response code");
            return true;
        }

        if recorded.body_unreadable {
            self.reporter.fail(format!("response code was 500: {}", recorded.text()));
            return false;
        }

        match recorded.json::<ErrorResponse>() {
            Ok(envelope) => {
                self.reporter.fail(format!("response code was 500: {}", envelope.error));
            }
            Err(e) => {
                self.reporter.fail(format!("could not decode response body: {e}"));
            }
        }
        false
    }

    fn check_eq<T: PartialEq + Debug>(&self, expected: T, actual: T, context: &str) {
        if expected != actual {
            self.reporter.fail(format!("{context}: expected {expected:?}, got {actual:?}"));
        }
    }
}
