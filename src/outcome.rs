//! The closed set of shapes every action outcome is normalized into.
//!
//! | Action returns | Outcome |
//! |---|---|
//! | `()` | [`Outcome::Unset`] |
//! | one supported value | [`Outcome::Value`] |
//! | `(StatusCode, T)` or `(u16, T)` | [`Outcome::Status`] |
//! | `ctx.abort(..)` was called | [`Outcome::Abort`] |
//!
//! Tuples whose first element is not a status code have no [`IntoOutcome`]
//! impl, so an action with that shape does not compile instead of silently
//! losing its second value.

use std::any::{Any, type_name};
use std::fmt;

use bytes::Bytes;
use http::StatusCode;

/// An opaque value handed to whatever renders the response.
pub struct Payload {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Payload {
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self { value: Box::new(value), type_name: type_name::<T>() }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Takes the value out, or gives the payload back if `T` is wrong.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|value| Self { value, type_name })
    }

    /// The Rust type name of the wrapped value, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload<{}>", self.type_name)
    }
}

/// Result of running a request through the chain.
#[derive(Debug, Default)]
pub enum Outcome {
    /// Nothing produced; the response was written directly or left empty.
    #[default]
    Unset,
    /// The action returned exactly one value.
    Value(Payload),
    /// The action returned a status code and a payload.
    Status(StatusCode, Payload),
    /// Normal handling stopped; the error handler owns the response.
    Abort(StatusCode, String),
}

impl Outcome {
    pub fn value<T: Send + 'static>(value: T) -> Self {
        Self::Value(Payload::new(value))
    }

    pub fn status<T: Send + 'static>(code: StatusCode, payload: T) -> Self {
        Self::Status(code, Payload::new(payload))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(..))
    }

    /// Status carried by `Status` and `Abort`.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status(code, _) | Self::Abort(code, _) => Some(*code),
            Self::Unset | Self::Value(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Value(p) | Self::Status(_, p) => Some(p),
            Self::Unset | Self::Abort(..) => None,
        }
    }
}

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion from an action's return value into an [`Outcome`].
///
/// Implement it for your own types to return them from controller actions;
/// [`Outcome::value`] covers the one-off case.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome { self }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome { Outcome::Unset }
}

impl IntoOutcome for Payload {
    fn into_outcome(self) -> Outcome { Outcome::Value(self) }
}

macro_rules! single_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoOutcome for $ty {
                fn into_outcome(self) -> Outcome { Outcome::value(self) }
            }
        )*
    };
}

single_value!(String, &'static str, Vec<u8>, Bytes, serde_json::Value);

impl<T: Send + 'static> IntoOutcome for (StatusCode, T) {
    fn into_outcome(self) -> Outcome {
        Outcome::status(self.0, self.1)
    }
}

/// A `u16` outside `100..=999` is not a status code; it becomes a 500 abort
/// so the bad value is visible instead of being dropped.
impl<T: Send + 'static> IntoOutcome for (u16, T) {
    fn into_outcome(self) -> Outcome {
        match StatusCode::from_u16(self.0) {
            Ok(code) => Outcome::status(code, self.1),
            Err(_) => Outcome::Abort(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("action returned invalid status code {}", self.0),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_is_unset() {
        assert!(().into_outcome().is_unset());
    }

    #[test]
    fn single_value_keeps_its_type() {
        let outcome = String::from("hello").into_outcome();
        let Outcome::Value(p) = outcome else { panic!("expected Value, got {outcome:?}") };
        assert_eq!(p.downcast_ref::<String>().map(String::as_str), Some("hello"));
    }

    #[test]
    fn integer_status_pair() {
        let outcome = (404u16, "nope").into_outcome();
        assert_eq!(outcome.status_code(), Some(StatusCode::NOT_FOUND));
        assert_eq!(outcome.payload().and_then(|p| p.downcast_ref::<&str>()), Some(&"nope"));
    }

    #[test]
    fn invalid_integer_status_aborts() {
        let outcome = (42u16, ()).into_outcome();
        assert!(outcome.is_abort());
        assert_eq!(outcome.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn downcast_returns_payload_on_mismatch() {
        let p = Payload::new(5u32);
        let p = p.downcast::<String>().unwrap_err();
        assert_eq!(p.downcast::<u32>().ok(), Some(5));
    }
}
