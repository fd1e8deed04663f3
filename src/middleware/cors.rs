//! Cross-origin resource sharing.

use std::sync::Arc;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use super::{Interceptor, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Stamps CORS headers on every response and answers preflights.
///
/// `OPTIONS` requests get an empty `200` with the headers and never reach
/// the next stage. Every other response, whatever its status, leaves with
/// the headers set; values written by downstream for the same names are
/// replaced.
///
/// Note that [`Cors::permissive`] pairs `allow-origin: *` with
/// `allow-credentials: true`. Browsers refuse credentialed requests under a
/// wildcard origin, so credentialed cross-origin calls will still fail.
#[derive(Clone, Debug)]
pub struct Cors {
    headers: Arc<HeaderMap>,
}

impl Cors {
    /// Any origin, the five CRUD-ish methods, and the headers a JSON client
    /// sends.
    pub fn permissive() -> Self {
        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, GET, OPTIONS, PUT, DELETE"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token"),
        );
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        Self { headers: Arc::new(headers) }
    }

    fn apply(&self, res: &mut Response) {
        for (name, value) in self.headers.iter() {
            res.headers_mut().insert(name.clone(), value.clone());
        }
    }
}

impl Interceptor for Cors {
    fn intercept(&self, req: Request, next: Next) -> BoxFuture {
        let cors = self.clone();
        Box::pin(async move {
            let mut res = if *req.method() == Method::OPTIONS {
                Response::status(StatusCode::OK)
            } else {
                next.run(req).await
            };
            cors.apply(&mut res);
            res
        })
    }
}
