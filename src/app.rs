//! Store handle plus route registrations: the one place a router is built.
//!
//! Production and tests both go through [`App::router`] /
//! [`App::pipeline`], so what a test exercises is exactly what the server
//! runs.
//!
//! ```rust
//! use std::sync::Arc;
//! use portico::{App, Request, Response, Router};
//!
//! #[derive(Clone, Default)]
//! struct Store(Arc<Vec<String>>);
//!
//! fn widget_routes(router: Router, store: &Store) -> Router {
//!     let store = store.clone();
//!     router.get("/widgets/count", move |_req: Request| {
//!         let n = store.0.len();
//!         async move { Response::json(format!(r#"{{"count":{n}}}"#)) }
//!     })
//! }
//!
//! let app = App::new(Store::default()).routes(widget_routes);
//! let pipeline = app.pipeline();
//! ```

use std::sync::Arc;

use crate::pipeline::Pipeline;
use crate::router::Router;

/// A registration step: adds one group of routes to the router.
///
/// Implemented for every `Fn(Router, &S) -> Router`. Groups must not
/// overlap; registering the same method + path twice panics.
pub trait Register<S>: Send + Sync + 'static {
    fn register(&self, router: Router, store: &S) -> Router;
}

impl<S, F> Register<S> for F
where
    F: Fn(Router, &S) -> Router + Send + Sync + 'static,
{
    fn register(&self, router: Router, store: &S) -> Router {
        self(router, store)
    }
}

/// A store handle and the registration steps that build routes over it.
///
/// The store is handed to each step by reference and never mutated here;
/// anything shared across requests must be safe for concurrent use on its
/// own (a connection pool, an `Arc<RwLock<_>>`, …).
pub struct App<S> {
    store: S,
    registrations: Vec<Arc<dyn Register<S>>>,
}

impl<S: Send + Sync + 'static> App<S> {
    pub fn new(store: S) -> Self {
        Self { store, registrations: Vec::new() }
    }

    /// Adds a registration step. Steps run in the order they were added.
    pub fn routes(mut self, registration: impl Register<S>) -> Self {
        self.registrations.push(Arc::new(registration));
        self
    }

    pub fn store(&self) -> &S { &self.store }

    /// Builds a fresh router from every registration step.
    pub fn router(&self) -> Router {
        self.registrations
            .iter()
            .fold(Router::new(), |router, r| r.register(router, &self.store))
    }

    /// A fresh router inside the standard pipeline (`RequestLog`, `Cors`).
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::standard(self.router())
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::body::Body;
    use crate::request::Request;

    fn ping(router: Router, _store: &()) -> Router {
        router.get("/ping", |_req: Request| async { "pong" })
    }

    fn get(uri: &str) -> Request {
        Request::from(http::Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap())
    }

    #[tokio::test]
    async fn rebuilding_does_not_accumulate_routes() {
        let app = App::new(()).routes(ping);

        // A second build would panic on a duplicate `/ping` if entries leaked
        // between builds.
        let first = app.router();
        let second = app.router();

        for router in [first, second] {
            let res = router.dispatch(get("/ping")).await;
            assert_eq!(res.status_code(), StatusCode::OK);
            assert_eq!(res.body().as_ref(), b"pong");
        }
    }
}
