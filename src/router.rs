//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Exact method, first and
//! only match wins. Anything unmatched goes to the fallback handler if one
//! is registered, and to an empty `404` otherwise.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::error;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once (see [`App::router`](crate::App::router)) and hand it to a
/// [`Pipeline`](crate::Pipeline). Each registration method returns `self`
/// so registrations chain naturally.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`;
    /// `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use portico::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_widget(_: Request) -> Response { Response::text("") }
    /// # async fn create_widget(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/widgets/{id}", get_widget)
    ///     .on(Method::POST, "/widgets",      create_widget);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or overlaps an entry already
    /// registered for `method`. Both are wiring defects caught at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Handler for requests no route matches.
    ///
    /// # Panics
    ///
    /// Panics if a fallback is already registered.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        assert!(self.fallback.is_none(), "fallback registered twice");
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Routes one request and produces one response.
    ///
    /// The body is materialized first, so handlers always see it buffered.
    /// A panicking handler is answered with the 500 error envelope.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        if req.body.materialize().await.is_err() {
            return Response::body_unreadable();
        }

        let handler = match self.lookup(&req.method, req.uri.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler
            }
            None => match &self.fallback {
                Some(fallback) => Arc::clone(fallback),
                None => return Response::status(StatusCode::NOT_FOUND),
            },
        };

        let method = req.method.clone();
        let path = req.uri.path().to_owned();
        match AssertUnwindSafe(async move { handler.call(req).await }).catch_unwind().await {
            Ok(res) => res,
            Err(_) => {
                error!(%method, %path, "handler panicked");
                Response::error(crate::envelope::DEFAULT_MESSAGE)
            }
        }
    }
}

/// The router as the innermost stage of a pipeline.
pub(crate) struct Endpoint(pub(crate) Arc<Router>);

impl ErasedHandler for Endpoint {
    fn call(&self, req: Request) -> BoxFuture {
        let router = Arc::clone(&self.0);
        Box::pin(async move { router.dispatch(req).await })
    }
}
