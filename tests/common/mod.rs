//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::Frame;
use portico::{Body, Request};
use tracing::subscriber::DefaultGuard;

/// A body stream whose first read fails, like a client hanging up mid-upload.
pub struct Broken;

impl http_body::Body for Broken {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        Poll::Ready(Some(Err(io::Error::other("connection reset"))))
    }
}

/// A request with a body that cannot be read.
pub fn broken_request(method: http::Method, uri: &str) -> Request {
    let req = http::Request::builder().method(method).uri(uri).body(()).unwrap();
    let (parts, ()) = req.into_parts();
    Request::new(parts.method, parts.uri, parts.headers, Body::from_stream(Broken))
}

/// Log output captured from the tracing fmt subscriber.
#[derive(Clone, Default)]
pub struct Logs(Arc<Mutex<Vec<u8>>>);

impl Logs {
    /// Installs a subscriber writing into `self` for the current thread.
    /// `#[tokio::test]` runs on a current-thread runtime, so the guard
    /// covers everything the test awaits.
    pub fn capture(&self) -> DefaultGuard {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || logs.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }
}

impl io::Write for Logs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
