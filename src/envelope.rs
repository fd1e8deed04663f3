//! The error envelope.
//!
//! Every application-level `500` carries the same JSON body:
//!
//! ```json
//! {"error": "db unavailable"}
//! ```
//!
//! Handlers never write it by hand. They return `Result<R, Fault>` and the
//! `Err` side is rendered here:
//!
//! ```rust
//! use portico::{Fault, Request, Response};
//!
//! async fn get_widget(req: Request) -> Result<Response, Fault> {
//!     let id: u64 = req.param("id").unwrap_or("").parse()?;
//!     Ok(Response::json(format!(r#"{{"id":{id}}}"#)))
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::{IntoResponse, Response};

/// The body of every JSON `500` response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorResponse {
    pub error: String,
}

/// A handler-level failure, rendered as `500` + [`ErrorResponse`].
///
/// Any `std::error::Error` converts into a `Fault`, so `?` works inside
/// handlers returning `Result<_, Fault>`.
#[derive(Debug)]
pub struct Fault {
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E: std::error::Error> From<E> for Fault {
    fn from(e: E) -> Self {
        Self::new(e.to_string())
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        Response::error(self.message)
    }
}

impl<R: IntoResponse> IntoResponse for Result<R, Fault> {
    fn into_response(self) -> Response {
        match self {
            Ok(r) => r.into_response(),
            Err(fault) => fault.into_response(),
        }
    }
}

/// Stands in for a blank fault message and for a panicking handler.
pub(crate) const DEFAULT_MESSAGE: &str = "internal server error";

/// Serializes the envelope for `message`.
pub(crate) fn encode(message: String) -> Vec<u8> {
    serde_json::to_vec(&ErrorResponse { error: message })
        .unwrap_or_else(|_| format!(r#"{{"error":"{DEFAULT_MESSAGE}"}}"#).into_bytes())
}
