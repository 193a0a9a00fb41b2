//! The dispatcher: an immutable snapshot shared by every request.
//!
//! An [`App`] bundles the route table, the global middleware chain, the error
//! handler, and the path-normalization policy. It is built once at startup,
//! wrapped in an `Arc`, and only ever read while requests are in flight, so
//! concurrent contexts need no locking to consult it.

use std::sync::Arc;

use http::Method;

use crate::handler::{BoxedErrorHandler, BoxedMiddleware, DefaultErrorHandler, ErrorHandler, Middleware};
use crate::router::{Params, Route, RouteTable, TrailingSlash};

pub struct App {
    routes: Box<dyn RouteTable>,
    middleware: Vec<BoxedMiddleware>,
    error_handler: BoxedErrorHandler,
    trailing_slash: TrailingSlash,
}

impl App {
    /// Starts building an app around `routes`.
    ///
    /// ```rust
    /// use baton::{middleware, Action, App, Router};
    ///
    /// let app = App::builder(Router::new().get("/", Action::nullary(|| {})))
    ///     .with(middleware::Logger)
    ///     .with(middleware::Render)
    ///     .build();
    /// ```
    pub fn builder(routes: impl RouteTable) -> AppBuilder {
        AppBuilder {
            routes: Box::new(routes),
            middleware: Vec::new(),
            error_handler: Arc::new(DefaultErrorHandler),
            trailing_slash: TrailingSlash::default(),
        }
    }

    /// Global middleware, in execution order.
    pub fn middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    pub fn trailing_slash(&self) -> TrailingSlash {
        self.trailing_slash
    }

    pub(crate) fn error_handler(&self) -> &BoxedErrorHandler {
        &self.error_handler
    }

    /// Normalizes `path` and asks the route table for a match.
    pub fn match_route(&self, path: &str, method: &Method) -> Option<(Arc<Route>, Params)> {
        self.routes.lookup(method, self.trailing_slash.normalize(path))
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("middleware", &self.middleware.len())
            .field("trailing_slash", &self.trailing_slash)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`App`]. Obtain via [`App::builder`].
pub struct AppBuilder {
    routes: Box<dyn RouteTable>,
    middleware: Vec<BoxedMiddleware>,
    error_handler: BoxedErrorHandler,
    trailing_slash: TrailingSlash,
}

impl AppBuilder {
    /// Appends a link to the global chain.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Replaces [`DefaultErrorHandler`].
    pub fn error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn trailing_slash(mut self, policy: TrailingSlash) -> Self {
        self.trailing_slash = policy;
        self
    }

    pub fn build(self) -> Arc<App> {
        Arc::new(App {
            routes: self.routes,
            middleware: self.middleware,
            error_handler: self.error_handler,
            trailing_slash: self.trailing_slash,
        })
    }
}
