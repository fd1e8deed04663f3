//! Middleware layer.
//!
//! An [`Interceptor`] sees every request before the router does and decides
//! whether to pass it on. Each stage has the same shape,
//! `intercept(request, next) -> response`, and the
//! [`Pipeline`](crate::Pipeline) chains stages in the order they were added.
//!
//! Built-in stages:
//! - [`RequestLog`] — materializes the body and logs `url` + `body`
//! - [`Cors`] — permissive CORS headers and the `OPTIONS` preflight answer
//!
//! Ad-hoc stages can be written as async closures via [`from_fn`]:
//!
//! ```rust
//! use portico::middleware::{self, Next};
//! use portico::Request;
//!
//! let stamp = middleware::from_fn(|req: Request, next: Next| async move {
//!     let mut res = next.run(req).await;
//!     res.headers_mut().insert("x-served-by", http::HeaderValue::from_static("portico"));
//!     res
//! });
//! ```

mod cors;
mod logging;

use std::future::Future;

pub use cors::Cors;
pub use logging::RequestLog;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

/// A pipeline stage.
pub trait Interceptor: Send + Sync + 'static {
    /// Handles `req`, calling `next` to continue down the chain or
    /// answering directly to short-circuit it.
    fn intercept(&self, req: Request, next: Next) -> BoxFuture;
}

/// The rest of the chain after the current stage.
pub struct Next {
    pub(crate) inner: BoxedHandler,
}

impl Next {
    pub fn run(self, req: Request) -> BoxFuture {
        self.inner.call(req)
    }
}

/// Wraps an async closure as an [`Interceptor`].
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FromFn(f)
}

/// See [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Interceptor for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn intercept(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self.0)(req, next))
    }
}
