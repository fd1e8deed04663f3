//! Interceptor chain around the router.
//!
//! Stages are collected in order and folded once, at build time, into a
//! single handler: the first stage added is the first to see a request.
//!
//! ```text
//! Pipeline::standard(router)
//!        ↓ fold (last stage wraps the router first)
//! RequestLog → Cors → Router → handler
//! ```

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::{Cors, Interceptor, Next, RequestLog};
use crate::request::Request;
use crate::response::Response;
use crate::router::{Endpoint, Router};

/// A router with its interceptors, ready to answer requests.
#[derive(Clone)]
pub struct Pipeline {
    entry: BoxedHandler,
}

impl Pipeline {
    /// Starts a pipeline with no stages in front of `router`.
    pub fn builder(router: Router) -> PipelineBuilder {
        PipelineBuilder { router, stages: Vec::new() }
    }

    /// `RequestLog`, then `Cors::permissive`, then `router`.
    pub fn standard(router: Router) -> Self {
        Self::builder(router)
            .stage(RequestLog::new())
            .stage(Cors::permissive())
            .build()
    }

    /// Runs one request through every stage.
    pub async fn handle(&self, req: Request) -> Response {
        self.entry.call(req).await
    }
}

/// Collects stages for a [`Pipeline`]. Obtain via [`Pipeline::builder`].
pub struct PipelineBuilder {
    router: Router,
    stages: Vec<Arc<dyn Interceptor>>,
}

impl PipelineBuilder {
    /// Appends `stage`; it runs after every stage added before it.
    pub fn stage(mut self, stage: impl Interceptor) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn build(self) -> Pipeline {
        let endpoint: BoxedHandler = Arc::new(Endpoint(Arc::new(self.router)));
        let entry = self.stages.into_iter().rev().fold(endpoint, |next, stage| {
            Arc::new(Layer { stage, next }) as BoxedHandler
        });
        Pipeline { entry }
    }
}

struct Layer {
    stage: Arc<dyn Interceptor>,
    next: BoxedHandler,
}

impl ErasedHandler for Layer {
    fn call(&self, req: Request) -> BoxFuture {
        self.stage.intercept(req, Next { inner: Arc::clone(&self.next) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::StatusCode;

    use super::*;
    use crate::body::Body;
    use crate::middleware::from_fn;

    fn get(uri: &str) -> Request {
        Request::from(http::Request::get(uri).body(Body::empty()).unwrap())
    }

    #[tokio::test]
    async fn stages_run_in_insertion_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let tag = |name: &'static str| {
            let order = Arc::clone(&order);
            from_fn(move |req: Request, next: Next| {
                order.lock().unwrap().push(name);
                next.run(req)
            })
        };

        let pipeline = Pipeline::builder(Router::new().get("/", |_req: Request| async { "ok" }))
            .stage(tag("first"))
            .stage(tag("second"))
            .stage(tag("third"))
            .build();

        let res = pipeline.handle(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn empty_pipeline_is_just_the_router() {
        let pipeline = Pipeline::builder(Router::new()).build();
        let res = pipeline.handle(get("/missing")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(res.headers().is_empty());
    }
}
