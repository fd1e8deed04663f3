//! Request bodies.
//!
//! A body starts life either as an unread stream (what hyper hands the
//! server) or as bytes already in memory (what tests and handlers build).
//! The first stage that needs the content calls [`Body::materialize`], which
//! drains the stream into one owned [`Bytes`] buffer. From then on every
//! reader gets its own view of the same buffer, so reading never consumes
//! anything another stage still needs.

use std::fmt;

use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

/// Boxed error produced while reading a body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An HTTP request body.
pub struct Body {
    kind: Kind,
}

enum Kind {
    Buffered(Bytes),
    Streaming(UnsyncBoxBody<Bytes, BoxError>),
}

impl Body {
    pub fn empty() -> Self {
        Self { kind: Kind::Buffered(Bytes::new()) }
    }

    /// Wraps a body stream that has not been read yet.
    pub fn from_stream<B>(body: B) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let stream = UnsyncBoxBody::new(body.map_err(|err| -> BoxError { err.into() }));
        Self { kind: Kind::Streaming(stream) }
    }

    /// `true` once the content lives in memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self.kind, Kind::Buffered(_))
    }

    /// The buffered content, or an empty slice if the stream is still unread.
    pub fn as_bytes(&self) -> &Bytes {
        static EMPTY: Bytes = Bytes::from_static(b"");
        match &self.kind {
            Kind::Buffered(bytes) => bytes,
            Kind::Streaming(_) => &EMPTY,
        }
    }

    /// Drains the stream into memory. Idempotent: a buffered body returns
    /// its bytes straight away.
    ///
    /// On failure the body is left empty; whatever was read is discarded.
    pub async fn materialize(&mut self) -> Result<&Bytes, BoxError> {
        match std::mem::replace(&mut self.kind, Kind::Buffered(Bytes::new())) {
            Kind::Buffered(bytes) => self.kind = Kind::Buffered(bytes),
            Kind::Streaming(stream) => {
                let collected = stream.collect().await?;
                self.kind = Kind::Buffered(collected.to_bytes());
            }
        }
        Ok(self.as_bytes())
    }
}

impl Default for Body {
    fn default() -> Self { Self::empty() }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Buffered(bytes) => f.debug_tuple("Body").field(bytes).finish(),
            Kind::Streaming(_) => f.write_str("Body(<stream>)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self { kind: Kind::Buffered(bytes) }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self { Bytes::from(bytes).into() }
}

impl From<String> for Body {
    fn from(s: String) -> Self { Bytes::from(s).into() }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self { Bytes::from_static(s.as_bytes()).into() }
}
