//! Radix-tree route table.
//!
//! One tree per HTTP method, O(path-length) lookup. A [`Route`] carries the
//! action, its calling convention, and any route-local middleware. The
//! [`RouteTable`] trait is the seam the dispatcher matches through, so tests
//! and alternative matchers can stand in for [`Router`].

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::action::{Action, RouteKind};
use crate::handler::BoxedMiddleware;

// ── Params ────────────────────────────────────────────────────────────────────

/// Named path parameters captured by the route pattern.
///
/// For a route `/users/{id}`, `params.get("id")` on `/users/42` is `Some("42")`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── TrailingSlash ─────────────────────────────────────────────────────────────

/// How a request path is normalized before matching.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TrailingSlash {
    /// `/foo/` and `/foo//` match as `/foo`; `/` stays `/`.
    #[default]
    Strip,
    /// Paths are matched exactly as received.
    Keep,
}

impl TrailingSlash {
    pub fn normalize(self, path: &str) -> &str {
        match self {
            Self::Keep => path,
            Self::Strip => match path.trim_end_matches('/') {
                "" => "/",
                trimmed => trimmed,
            },
        }
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A registered method + pattern bound to an action and its local middleware.
#[derive(Debug)]
pub struct Route {
    method: Method,
    pattern: String,
    action: Action,
    middleware: Vec<BoxedMiddleware>,
}

impl Route {
    pub fn new(
        method: Method,
        pattern: impl Into<String>,
        middleware: Vec<BoxedMiddleware>,
        action: Action,
    ) -> Self {
        Self { method, pattern: pattern.into(), action, middleware }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn kind(&self) -> RouteKind { self.action.kind() }

    /// The raw action, for the final invoker.
    pub fn action(&self) -> &Action { &self.action }

    /// Route-local middleware, run after the global chain and before the action.
    pub fn middleware(&self) -> &[BoxedMiddleware] { &self.middleware }
}

// ── RouteTable ────────────────────────────────────────────────────────────────

/// Matches a normalized path and method to a route.
///
/// Implementations are shared across concurrent requests and only read.
pub trait RouteTable: Send + Sync + 'static {
    fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<Route>, Params)>;
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application router.
///
/// Build it once at startup and hand it to [`App::builder`](crate::App::builder).
/// Each registration returns `self` so calls chain naturally.
///
/// # Panics
///
/// Registration panics on an invalid or conflicting pattern. Route tables are
/// built at startup, so a bad pattern stops the process before it serves.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<Route>>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register an action for a method + pattern pair.
    ///
    /// Path parameters use `{name}` syntax; `ctx.params().get("name")`
    /// retrieves them.
    ///
    /// ```rust
    /// # use baton::{Action, Method, Router};
    /// Router::new()
    ///     .on(Method::GET,    "/users/{id}", Action::nullary(|| {}))
    ///     .on(Method::DELETE, "/users/{id}", Action::nullary(|| {}));
    /// ```
    pub fn on(self, method: Method, pattern: &str, action: Action) -> Self {
        self.on_with(method, pattern, Vec::new(), action)
    }

    /// Like [`on`](Self::on), with middleware that runs only for this route.
    pub fn on_with(
        mut self,
        method: Method,
        pattern: &str,
        middleware: Vec<BoxedMiddleware>,
        action: Action,
    ) -> Self {
        let route = Arc::new(Route::new(method.clone(), pattern, middleware, action));
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern, route)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        self
    }

    pub fn get(self, pattern: &str, action: Action) -> Self { self.on(Method::GET, pattern, action) }
    pub fn post(self, pattern: &str, action: Action) -> Self { self.on(Method::POST, pattern, action) }
    pub fn put(self, pattern: &str, action: Action) -> Self { self.on(Method::PUT, pattern, action) }
    pub fn patch(self, pattern: &str, action: Action) -> Self { self.on(Method::PATCH, pattern, action) }
    pub fn delete(self, pattern: &str, action: Action) -> Self { self.on(Method::DELETE, pattern, action) }
}

impl RouteTable for Router {
    fn lookup(&self, method: &Method, path: &str) -> Option<(Arc<Route>, Params)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter().collect();
        Some((Arc::clone(matched.value), params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_trailing_slash() {
        let strip = TrailingSlash::Strip;
        assert_eq!(strip.normalize("/foo/"), "/foo");
        assert_eq!(strip.normalize("/foo//"), "/foo");
        assert_eq!(strip.normalize("/foo"), "/foo");
        assert_eq!(strip.normalize("/"), "/");
        assert_eq!(strip.normalize(""), "/");
        assert_eq!(TrailingSlash::Keep.normalize("/foo/"), "/foo/");
    }

    #[test]
    fn lookup_captures_params() {
        let router = Router::new().get("/users/{id}", Action::nullary(|| {}));
        let (route, params) = router.lookup(&Method::GET, "/users/42").unwrap();
        assert_eq!(route.pattern(), "/users/{id}");
        assert_eq!(route.kind(), RouteKind::Nullary);
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn lookup_is_per_method() {
        let router = Router::new().post("/users", Action::nullary(|| {}));
        assert!(router.lookup(&Method::GET, "/users").is_none());
        assert!(router.lookup(&Method::POST, "/users").is_some());
        assert!(router.lookup(&Method::POST, "/nope").is_none());
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_pattern_panics() {
        let _ = Router::new()
            .get("/a/{x}", Action::nullary(|| {}))
            .get("/a/{y}", Action::nullary(|| {}));
    }
}
