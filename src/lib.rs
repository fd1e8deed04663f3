//! # portico
//!
//! The front door of an HTTP service: a fixed chain of interceptors around
//! a method/path router, and a test harness that drives synthetic requests
//! through the very same chain.
//!
//! ## Request flow
//!
//! ```text
//! hyper ─▶ RequestLog ─▶ Cors ─▶ Router ─▶ handler
//!           │              │
//!           │              └─ OPTIONS: empty 200 + CORS headers, stop
//!           └─ body unreadable: plain-text 500, stop
//! ```
//!
//! - [`RequestLog`](middleware::RequestLog) reads the body into memory once,
//!   logs `url` and `body`, and passes the request on with the body intact.
//! - [`Cors`](middleware::Cors) stamps permissive CORS headers on every
//!   response and answers preflights itself.
//! - [`Router`] matches exact method + path pattern.
//! - Handlers return anything [`IntoResponse`]; `Result<_, Fault>` turns a
//!   fault into `500 {"error": "..."}`, the one error shape clients see.
//!
//! Routes are contributed by independent registration steps over a shared
//! store handle, collected in an [`App`]. The server and the
//! [`testing::Harness`] both build their pipeline from it.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use portico::{App, Fault, Request, Response, Router, Server};
//! use http::StatusCode;
//!
//! #[derive(Clone)]
//! struct Store;
//!
//! fn widget_routes(router: Router, _store: &Store) -> Router {
//!     router
//!         .get("/widgets/{id}", get_widget)
//!         .post("/widgets", create_widget)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portico::Error> {
//!     let app = App::new(Store).routes(widget_routes);
//!     Server::bind("0.0.0.0:3000")?.serve(app.pipeline()).await
//! }
//!
//! async fn get_widget(req: Request) -> Result<Response, Fault> {
//!     let id: u64 = req.param("id").unwrap_or_default().parse()?;
//!     Ok(Response::json(format!(r#"{{"id":{id}}}"#)))
//! }
//!
//! async fn create_widget(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/widgets/99")
//!         .json(r#"{"id":99}"#)
//! }
//! ```

mod app;
mod body;
mod envelope;
mod error;
mod handler;
mod pipeline;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod testing;

pub use app::{App, Register};
pub use body::{Body, BoxError};
pub use envelope::{ErrorResponse, Fault};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
