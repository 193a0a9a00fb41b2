//! Middleware and error-handler traits.
//!
//! # How the chain advances
//!
//! Every middleware receives the request [`Context`] and a [`Next`] token.
//! `Next` is the only way to move the chain forward and it is consumed by
//! [`Next::run`], so a middleware advances at most once. The middleware then
//! returns a [`Flow`] telling the executor what it did:
//!
//! ```text
//! |ctx, next| next.run(ctx)          ← pass through      → Flow::Continue
//! |ctx, _next| ctx.unauthorized()    ← stop right here   → Flow::Halt
//! |ctx, next| { let f = next.run(ctx); /* after */ f }   ← wrap the rest
//! ```
//!
//! A `Continue` flow can only be produced by `Next::run`, so the executor
//! never has to guess whether a link advanced.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::context::Context;
use crate::outcome::Outcome;
use crate::response::ContentType;

// ── Flow ──────────────────────────────────────────────────────────────────────

/// What a chain link did with control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Flow(Step);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Step {
    Continue,
    Halt,
}

impl Flow {
    /// The link stopped the chain; nothing after it runs.
    pub const HALT: Flow = Flow(Step::Halt);

    pub(crate) const CONTINUE: Flow = Flow(Step::Continue);

    pub fn is_continue(self) -> bool { self.0 == Step::Continue }
    pub fn is_halt(self) -> bool { self.0 == Step::Halt }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// One-shot permission to run the rest of the chain.
#[derive(Debug)]
pub struct Next {
    _priv: (),
}

impl Next {
    pub(crate) fn new() -> Self {
        Self { _priv: () }
    }

    /// Runs every remaining link (and the action) before returning.
    pub fn run(self, ctx: &mut Context) -> Flow {
        ctx.advance();
        Flow::CONTINUE
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// A link in the global or route-local chain.
///
/// Implemented for every `Fn(&mut Context, Next) -> Flow` closure, so most
/// middleware is just a function:
///
/// ```rust
/// use baton::{Context, Flow, Next};
///
/// fn require_token(ctx: &mut Context, next: Next) -> Flow {
///     if ctx.req().header("authorization").is_none() {
///         return ctx.unauthorized();
///     }
///     next.run(ctx)
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, ctx: &mut Context, next: Next) -> Flow;
}

impl<F> Middleware for F
where
    F: Fn(&mut Context, Next) -> Flow + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context, next: Next) -> Flow {
        self(ctx, next)
    }
}

impl fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Shared, type-erased middleware. Cloning is one atomic increment.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Erases a middleware so differently-typed links can share one list.
pub fn boxed<M: Middleware>(middleware: M) -> BoxedMiddleware {
    Arc::new(middleware)
}

// ── ErrorHandler ──────────────────────────────────────────────────────────────

/// Renders an aborted request. Called once per [`Context::abort`].
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, ctx: &mut Context);
}

impl<F> ErrorHandler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context) {
        self(ctx)
    }
}

pub(crate) type BoxedErrorHandler = Arc<dyn ErrorHandler>;

/// Writes the abort status and message as plain text, unless a response was
/// already written.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, ctx: &mut Context) {
        let (status, message) = match ctx.result() {
            Outcome::Abort(status, message) => (*status, message.clone()),
            other => {
                debug!(outcome = ?other, "error handler called without an abort");
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        };
        let resp = ctx.resp_mut();
        if resp.written() {
            return;
        }
        resp.set_content_type(ContentType::Text);
        resp.write_header(status);
        resp.write(message.as_bytes());
    }
}
