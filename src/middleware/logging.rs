//! Per-request body logging.

use tracing::{Span, error, info};

use super::{Interceptor, Next};
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Logs the URL and full body of every request, then passes it on with the
/// body still readable.
///
/// The body is drained into memory once; downstream stages read the same
/// buffer. One event per request:
///
/// - `info`, fields `url` and `body`, when the body was read (an empty body
///   logs as an empty string)
/// - `error`, fields `url` and `err`, when it was not; the request is then
///   answered with a plain-text `500` and goes no further
///
/// Nothing is truncated or redacted.
#[derive(Clone, Debug)]
pub struct RequestLog {
    span: Span,
}

impl RequestLog {
    /// Events are emitted as roots, outside any span.
    pub fn new() -> Self {
        Self { span: Span::none() }
    }

    /// Events are emitted as children of `span`.
    pub fn in_span(span: Span) -> Self {
        Self { span }
    }
}

impl Default for RequestLog {
    fn default() -> Self { Self::new() }
}

impl Interceptor for RequestLog {
    fn intercept(&self, mut req: Request, next: Next) -> BoxFuture {
        let span = self.span.clone();
        Box::pin(async move {
            let url = req.uri().to_string();
            let body = match req.body_mut().materialize().await {
                Ok(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                Err(err) => {
                    error!(parent: &span, url = %url, err = %err, "could not read request body");
                    return Response::body_unreadable();
                }
            };

            info!(parent: &span, url = %url, body = %body, "url hit");

            next.run(req).await
        })
    }
}
