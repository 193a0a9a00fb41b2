//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request with its body already collected.
///
/// The server reads the whole body before the middleware chain starts, so
/// every middleware and action sees the same bytes and nothing in the chain
/// has to await.
#[derive(Debug, Default)]
pub struct Request {
    inner: http::Request<Bytes>,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    pub fn new(inner: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Self {
        Self { inner, remote_addr }
    }

    pub fn method(&self) -> &Method { self.inner.method() }
    pub fn uri(&self) -> &Uri { self.inner.uri() }
    pub fn path(&self) -> &str { self.inner.uri().path() }
    pub fn query(&self) -> Option<&str> { self.inner.uri().query() }
    pub fn headers(&self) -> &HeaderMap { self.inner.headers() }
    pub fn body(&self) -> &Bytes { self.inner.body() }

    /// Address of the TCP peer, when the request came off a socket.
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(inner: http::Request<Bytes>) -> Self {
        Self::new(inner, None)
    }
}
