//! # baton
//!
//! A per-request dispatch engine for HTTP services: a global middleware
//! chain, then the matched route's own chain, then the action. Control passes
//! down the chain like a baton; any link can keep it and finish the request.
//!
//! ## The moving parts
//!
//! - [`Router`]: radix-tree route table via [`matchit`], one tree per method.
//! - [`App`]: the immutable snapshot every request reads (routes, global
//!   middleware, error handler, trailing-slash policy).
//! - [`Context`]: per-request state. Resolves the route lazily, at most once,
//!   drives the two-stage chain, and calls the action with its calling
//!   convention ([`Action`]).
//! - [`Outcome`]: what the action produced, or why the request was aborted.
//! - [`Server`]: hyper on tokio, graceful shutdown, pooled contexts.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use baton::{middleware, Action, App, Context, Flow, Next, Router, Server, StatusCode};
//!
//! #[derive(Clone, Default)]
//! struct Users;
//!
//! fn require_key(ctx: &mut Context, next: Next) -> Flow {
//!     if ctx.req().header("x-api-key").is_none() {
//!         return ctx.unauthorized();
//!     }
//!     next.run(ctx)
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let routes = Router::new()
//!         .get("/users", Action::value(Users::default, |_: Users| {
//!             serde_json::json!([{ "id": 1, "name": "alice" }])
//!         }))
//!         .on_with(
//!             baton::Method::DELETE,
//!             "/users/{id}",
//!             vec![baton::boxed(require_key)],
//!             Action::context(|ctx: &mut Context| {
//!                 ctx.resp_mut().write_header(StatusCode::NO_CONTENT);
//!             }),
//!         );
//!
//!     let app = App::builder(routes)
//!         .with(middleware::Logger)
//!         .with(middleware::Render)
//!         .build();
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```

mod action;
mod app;
mod context;
mod error;
mod handler;
mod outcome;
mod pool;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use action::{Action, CallArg, Controller, RouteKind};
pub use app::{App, AppBuilder};
pub use context::{Context, Stage};
pub use error::Error;
pub use handler::{boxed, BoxedMiddleware, DefaultErrorHandler, ErrorHandler, Flow, Middleware, Next};
pub use outcome::{IntoOutcome, Outcome, Payload};
pub use pool::{ContextPool, PooledContext};
pub use request::Request;
pub use response::{ContentType, ResponseWriter};
pub use router::{Params, Route, RouteTable, Router, TrailingSlash};
pub use server::Server;

pub use http::{Method, StatusCode};
