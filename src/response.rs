//! The response sink every middleware and action writes into.
//!
//! A [`ResponseWriter`] buffers status, headers, and body for exactly one
//! request. The first call to [`write_header`](ResponseWriter::write_header)
//! or [`write`](ResponseWriter::write) commits the status; from then on
//! [`written`](ResponseWriter::written) is `true` and later status changes
//! are ignored, the same way a real socket would behave.

use std::io;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

use crate::error::Error;
use crate::outcome::Payload;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::set_content_type`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    Html,         // text/html; charset=utf-8
    Json,         // application/json; charset=UTF-8
    OctetStream,  // application/octet-stream  (binary / file download)
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml; charset=UTF-8
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json; charset=UTF-8",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml; charset=UTF-8",
        }
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Buffered response for one in-flight request.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a status has been committed.
    pub fn written(&self) -> bool {
        self.status.is_some()
    }

    /// The committed status, or `200 OK` if nothing was written yet.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
    }

    /// Commits `status`. Only the first call has any effect.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Appends to the body, committing `200 OK` if no status was set.
    pub fn write(&mut self, bytes: &[u8]) {
        self.write_header(StatusCode::OK);
        self.body.extend_from_slice(bytes);
    }

    /// Writes `payload` with `status` if its type is one the renderer knows.
    ///
    /// Text is written as `text/plain`, raw bytes as `application/octet-stream`,
    /// and `serde_json::Value` as JSON. Anything else is left untouched and
    /// reported as [`Error::Unrenderable`].
    pub fn render(&mut self, status: StatusCode, payload: &Payload) -> Result<(), Error> {
        if let Some(text) = payload.downcast_ref::<String>() {
            self.finish(status, ContentType::Text, text.as_bytes());
        } else if let Some(text) = payload.downcast_ref::<&'static str>() {
            self.finish(status, ContentType::Text, text.as_bytes());
        } else if let Some(bytes) = payload.downcast_ref::<Vec<u8>>() {
            self.finish(status, ContentType::OctetStream, bytes);
        } else if let Some(bytes) = payload.downcast_ref::<Bytes>() {
            self.finish(status, ContentType::OctetStream, bytes);
        } else if let Some(value) = payload.downcast_ref::<serde_json::Value>() {
            let encoded = serde_json::to_vec(value)?;
            self.finish(status, ContentType::Json, &encoded);
        } else {
            return Err(Error::Unrenderable(payload.type_name()));
        }
        Ok(())
    }

    fn finish(&mut self, status: StatusCode, content_type: ContentType, body: &[u8]) {
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.set_content_type(content_type);
        }
        self.write_header(status);
        self.body.extend_from_slice(body);
    }

    /// Converts the buffer into the hyper response the server sends.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

/// Lets encoders (`serde_json::to_writer`, `io::copy`) stream into the body.
impl io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ResponseWriter::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_status_wins() {
        let mut w = ResponseWriter::new();
        assert!(!w.written());
        w.write_header(StatusCode::NOT_FOUND);
        w.write_header(StatusCode::OK);
        w.write(b"gone");
        assert!(w.written());
        assert_eq!(w.status(), StatusCode::NOT_FOUND);
        assert_eq!(w.body(), b"gone");
    }

    #[test]
    fn write_commits_ok() {
        let mut w = ResponseWriter::new();
        w.write(b"hi");
        assert_eq!(w.status(), StatusCode::OK);
    }

    #[test]
    fn render_json_value() {
        let mut w = ResponseWriter::new();
        let payload = Payload::new(serde_json::json!({ "id": 7 }));
        w.render(StatusCode::CREATED, &payload).unwrap();
        assert_eq!(w.status(), StatusCode::CREATED);
        assert_eq!(w.headers()[CONTENT_TYPE], ContentType::Json.as_str());
        assert_eq!(w.body(), br#"{"id":7}"#);
    }

    #[test]
    fn render_rejects_unknown_type() {
        struct Opaque;
        let mut w = ResponseWriter::new();
        let err = w.render(StatusCode::OK, &Payload::new(Opaque)).unwrap_err();
        assert!(matches!(err, Error::Unrenderable(name) if name.ends_with("Opaque")));
        assert!(!w.written());
    }

    #[test]
    fn into_http_carries_status_and_headers() {
        let mut w = ResponseWriter::new();
        w.set_content_type(ContentType::Html);
        w.write_header(StatusCode::ACCEPTED);
        let resp = w.into_http();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    }
}
