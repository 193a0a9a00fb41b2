//! Action calling conventions.
//!
//! # Seven shapes, one enum
//!
//! An action is whatever runs once the chain reaches the end. Rather than
//! inspecting function signatures at request time, each registered action is
//! wrapped in one [`Action`] variant up front and the final invoker does a
//! single exhaustive `match`:
//!
//! | Constructor | Signature | Return captured? |
//! |---|---|---|
//! | [`Action::value`] | `Fn(A) -> R` on a fresh `A` | yes |
//! | [`Action::pointer`] | `Fn(&mut A) -> R` on a fresh `A` | yes |
//! | [`Action::nullary`] | `Fn()` | no |
//! | [`Action::http`] | `Fn(&mut ResponseWriter, &Request)` | no |
//! | [`Action::request`] | `Fn(&Request)` | no |
//! | [`Action::response`] | `Fn(&mut ResponseWriter)` | no |
//! | [`Action::context`] | `Fn(&mut Context)` | no |
//!
//! The direct-callable shapes write the response themselves. Controller
//! shapes (`value`, `pointer`) return something implementing
//! [`IntoOutcome`], which becomes the request's [`Outcome`].

use std::any::{Any, type_name};
use std::fmt;

use crate::context::Context;
use crate::outcome::{IntoOutcome, Outcome};
use crate::request::Request;
use crate::response::ResponseWriter;

/// The calling convention a route was registered with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RouteKind {
    /// Controller method taking the instance by value.
    Value,
    /// Controller method taking the instance by `&mut`.
    Pointer,
    Nullary,
    Http,
    Request,
    Response,
    Context,
}

/// One argument the final invoker binds for a route.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CallArg {
    /// The per-request controller instance, moved (cloned) into the call.
    Receiver,
    /// The per-request controller instance, borrowed mutably.
    ReceiverRef,
    ResponseSink,
    Request,
    Context,
}

impl RouteKind {
    /// The arguments an action of this kind is called with, in order.
    pub fn call_args(self) -> &'static [CallArg] {
        match self {
            Self::Value    => &[CallArg::Receiver],
            Self::Pointer  => &[CallArg::ReceiverRef],
            Self::Nullary  => &[],
            Self::Http     => &[CallArg::ResponseSink, CallArg::Request],
            Self::Request  => &[CallArg::Request],
            Self::Response => &[CallArg::ResponseSink],
            Self::Context  => &[CallArg::Context],
        }
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;
type Method = Box<dyn Fn(&mut (dyn Any + Send)) -> Outcome + Send + Sync>;

/// A controller: a factory for per-request instances plus the method to call.
pub struct Controller {
    kind: RouteKind,
    factory: Factory,
    method: Method,
}

impl Controller {
    pub(crate) fn new_instance(&self) -> Box<dyn Any + Send> {
        (self.factory)()
    }

    pub(crate) fn call(&self, instance: &mut (dyn Any + Send)) -> Outcome {
        (self.method)(instance)
    }
}

/// A registered action, tagged with its calling convention.
pub enum Action {
    Controller(Controller),
    Nullary(Box<dyn Fn() + Send + Sync>),
    Http(Box<dyn Fn(&mut ResponseWriter, &Request) + Send + Sync>),
    Request(Box<dyn Fn(&Request) + Send + Sync>),
    Response(Box<dyn Fn(&mut ResponseWriter) + Send + Sync>),
    Context(Box<dyn Fn(&mut Context) + Send + Sync>),
}

impl Action {
    /// A controller method taking a fresh `A` by value.
    ///
    /// `factory` runs once per matched request. Middleware may prepare the
    /// instance through [`Context::action`] first; the method then receives
    /// a clone of the prepared instance.
    pub fn value<A, F, M, R>(factory: F, method: M) -> Self
    where
        A: Clone + Send + 'static,
        F: Fn() -> A + Send + Sync + 'static,
        M: Fn(A) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self::Controller(Controller {
            kind: RouteKind::Value,
            factory: Box::new(move || Box::new(factory()) as Box<dyn Any + Send>),
            method: Box::new(move |instance: &mut (dyn Any + Send)| {
                method(receiver::<A>(instance).clone()).into_outcome()
            }),
        })
    }

    /// A controller method taking a fresh `A` by `&mut`.
    pub fn pointer<A, F, M, R>(factory: F, method: M) -> Self
    where
        A: Send + 'static,
        F: Fn() -> A + Send + Sync + 'static,
        M: Fn(&mut A) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self::Controller(Controller {
            kind: RouteKind::Pointer,
            factory: Box::new(move || Box::new(factory()) as Box<dyn Any + Send>),
            method: Box::new(move |instance: &mut (dyn Any + Send)| {
                method(receiver::<A>(instance)).into_outcome()
            }),
        })
    }

    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::Nullary(Box::new(f))
    }

    pub fn http<F>(f: F) -> Self
    where
        F: Fn(&mut ResponseWriter, &Request) + Send + Sync + 'static,
    {
        Self::Http(Box::new(f))
    }

    pub fn request<F>(f: F) -> Self
    where
        F: Fn(&Request) + Send + Sync + 'static,
    {
        Self::Request(Box::new(f))
    }

    pub fn response<F>(f: F) -> Self
    where
        F: Fn(&mut ResponseWriter) + Send + Sync + 'static,
    {
        Self::Response(Box::new(f))
    }

    pub fn context<F>(f: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        Self::Context(Box::new(f))
    }

    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Controller(c) => c.kind,
            Self::Nullary(_)    => RouteKind::Nullary,
            Self::Http(_)       => RouteKind::Http,
            Self::Request(_)    => RouteKind::Request,
            Self::Response(_)   => RouteKind::Response,
            Self::Context(_)    => RouteKind::Context,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.kind()).finish()
    }
}

/// The instance always comes from the same controller's factory, so a
/// mismatch means the route table itself is broken.
fn receiver<A: 'static>(instance: &mut (dyn Any + Send)) -> &mut A {
    match instance.downcast_mut::<A>() {
        Some(a) => a,
        None => panic!("action instance is not a `{}`", type_name::<A>()),
    }
}
