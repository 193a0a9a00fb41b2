//! Unified error type.

use thiserror::Error;

/// The error type returned by baton's fallible operations.
///
/// Application-level failures (404, 401, etc.) are expressed by calling
/// [`Context::abort`](crate::Context::abort), not as `Error`s. This type
/// surfaces infrastructure failures: binding a port, reading a file, encoding
/// a body.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("xml: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The result payload has a type the renderer does not know how to write.
    #[error("cannot render payload of type `{0}`")]
    Unrenderable(&'static str),
}
