//! Per-request state and the dispatch state machine.
//!
//! # Lifecycle of one request
//!
//! ```text
//! reset(req, resp)                 cursor, resolution, outcome cleared
//!        ↓ run()
//! Global[0] → Global[1] → …        each link calls next.run(ctx) or halts
//!        ↓ global chain exhausted
//! execute()                        resolve() if nobody asked for the route yet
//!        ├─ unmatched  → not_found() unless a response was already written
//!        ├─ route has local middleware and stage == Global
//!        │      → stage = Route, link = 0, re-enter the chain
//!        └─ otherwise  → call the action, capture its Outcome
//! ```
//!
//! Resolution (route match, controller instance, call arguments) happens at
//! most once per request. Whichever comes first, `route()`, `params()`,
//! `action()`, `call_args()`, or the end of the global chain, triggers it;
//! every later call sees the cached result.

use std::any::Any;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION};
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::action::{Action, CallArg};
use crate::app::App;
use crate::error::Error;
use crate::handler::{Flow, Next};
use crate::outcome::Outcome;
use crate::request::Request;
use crate::response::{ContentType, ResponseWriter};
use crate::router::{Params, Route};

/// Which handler sequence the chain cursor points into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// The app-wide middleware chain.
    Global,
    /// The matched route's own middleware chain.
    Route,
}

/// The state threaded through every middleware and action of one request.
pub struct Context {
    app: Arc<App>,
    req: Request,
    resp: ResponseWriter,

    stage: Stage,
    link: usize,

    matched: bool,
    route: Option<Arc<Route>>,
    params: Params,
    action: Option<Box<dyn Any + Send>>,
    call_args: Vec<CallArg>,

    result: Outcome,
}

impl Context {
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            req: Request::default(),
            resp: ResponseWriter::new(),
            stage: Stage::Global,
            link: 0,
            matched: false,
            route: None,
            params: Params::new(),
            action: None,
            call_args: Vec::new(),
            result: Outcome::Unset,
        }
    }

    /// Binds the context to a new request. Everything but the app is cleared.
    pub fn reset(&mut self, req: Request, resp: ResponseWriter) {
        self.req = req;
        self.resp = resp;
        self.stage = Stage::Global;
        self.link = 0;
        self.matched = false;
        self.route = None;
        self.params.clear();
        self.action = None;
        self.call_args.clear();
        self.result = Outcome::Unset;
    }

    /// Binds a request to a context that is already clean.
    pub(crate) fn bind(&mut self, req: Request) {
        self.req = req;
    }

    /// Drives the request from the first global link to completion.
    pub fn run(&mut self) {
        trace!(method = %self.req.method(), path = self.req.path(), "dispatching");
        self.invoke();
    }

    // ── Chain executor ────────────────────────────────────────────────────────

    pub(crate) fn advance(&mut self) {
        self.link += 1;
        self.invoke();
    }

    fn invoke(&mut self) {
        let link = match self.stage {
            Stage::Global => self.app.middleware().get(self.link).cloned(),
            Stage::Route => self
                .route
                .as_ref()
                .and_then(|route| route.middleware().get(self.link).cloned()),
        };

        let Some(middleware) = link else {
            return self.execute();
        };

        let (stage, index) = (self.stage, self.link);
        trace!(?stage, link = index, "entering middleware");
        if middleware.handle(self, Next::new()).is_halt() {
            debug!(?stage, link = index, "chain halted");
        }
    }

    fn execute(&mut self) {
        self.resolve();

        let Some(route) = self.route.clone() else {
            if !self.resp.written() {
                self.not_found();
            }
            return;
        };

        if self.stage == Stage::Global && !route.middleware().is_empty() {
            self.stage = Stage::Route;
            self.link = 0;
            return self.invoke();
        }

        self.call_action(&route);
    }

    // ── Final invoker ─────────────────────────────────────────────────────────

    fn call_action(&mut self, route: &Route) {
        trace!(kind = ?route.kind(), pattern = route.pattern(), "invoking action");
        match route.action() {
            Action::Controller(controller) => {
                let outcome = match self.action.as_deref_mut() {
                    Some(instance) => controller.call(instance),
                    None => unreachable!(
                        "controller route `{}` resolved without an instance",
                        route.pattern(),
                    ),
                };
                match outcome {
                    Outcome::Abort(status, message) => {
                        self.abort(status, message);
                    }
                    outcome => self.result = outcome,
                }
            }
            Action::Nullary(f) => f(),
            Action::Http(f) => f(&mut self.resp, &self.req),
            Action::Request(f) => f(&self.req),
            Action::Response(f) => f(&mut self.resp),
            Action::Context(f) => f(self),
        }
    }

    // ── Action resolver ───────────────────────────────────────────────────────

    fn resolve(&mut self) {
        if self.matched {
            return;
        }
        self.matched = true;

        let Some((route, params)) = self.app.match_route(self.req.path(), self.req.method()) else {
            debug!(method = %self.req.method(), path = self.req.path(), matched = false, "route resolved");
            return;
        };

        debug!(
            method = %self.req.method(),
            path = self.req.path(),
            pattern = route.pattern(),
            kind = ?route.kind(),
            matched = true,
            "route resolved"
        );
        if let Action::Controller(controller) = route.action() {
            self.action = Some(controller.new_instance());
        }
        self.call_args.extend_from_slice(route.kind().call_args());
        self.params = params;
        self.route = Some(route);
    }

    /// `true` once resolution has run for the current request.
    pub fn is_resolved(&self) -> bool {
        self.matched
    }

    /// The matched route, resolving first if needed.
    pub fn route(&mut self) -> Option<&Arc<Route>> {
        self.resolve();
        self.route.as_ref()
    }

    /// Path parameters of the matched route; empty when unmatched.
    pub fn params(&mut self) -> &Params {
        self.resolve();
        &self.params
    }

    /// The per-request controller instance, if the route has one of type `A`.
    ///
    /// Middleware can use this to prepare the instance before the action runs.
    pub fn action<A: 'static>(&mut self) -> Option<&mut A> {
        self.resolve();
        self.action.as_mut()?.downcast_mut()
    }

    pub fn has_action(&mut self) -> bool {
        self.resolve();
        self.action.is_some()
    }

    /// The arguments the final invoker binds for the matched route.
    pub fn call_args(&mut self) -> &[CallArg] {
        self.resolve();
        &self.call_args
    }

    // ── Cursor / outcome ──────────────────────────────────────────────────────

    pub fn stage(&self) -> Stage { self.stage }
    pub fn link(&self) -> usize { self.link }
    pub fn app(&self) -> &Arc<App> { &self.app }

    pub fn result(&self) -> &Outcome { &self.result }

    pub fn set_result(&mut self, outcome: Outcome) {
        self.result = outcome;
    }

    pub fn take_result(&mut self) -> Outcome {
        std::mem::take(&mut self.result)
    }

    // ── Abort path ────────────────────────────────────────────────────────────

    /// Records an abort and hands the context to the error handler.
    ///
    /// The chain is not unwound: return the `Flow` this gives you instead of
    /// calling `next.run`.
    pub fn abort(&mut self, status: StatusCode, message: impl Into<String>) -> Flow {
        let message = message.into();
        debug!(status = status.as_u16(), %message, "request aborted");
        self.result = Outcome::Abort(status, message);
        let handler = Arc::clone(self.app.error_handler());
        handler.handle(self);
        Flow::HALT
    }

    /// `404` with the canonical reason phrase.
    pub fn not_found(&mut self) -> Flow {
        self.abort(StatusCode::NOT_FOUND, reason(StatusCode::NOT_FOUND))
    }

    pub fn not_found_with(&mut self, message: impl Into<String>) -> Flow {
        self.abort(StatusCode::NOT_FOUND, message)
    }

    /// `401` with the canonical reason phrase.
    pub fn unauthorized(&mut self) -> Flow {
        self.abort(StatusCode::UNAUTHORIZED, reason(StatusCode::UNAUTHORIZED))
    }

    // ── Request side ──────────────────────────────────────────────────────────

    pub fn req(&self) -> &Request { &self.req }

    pub fn body(&self) -> &[u8] { self.req.body() }

    pub fn is_ajax(&self) -> bool {
        self.req.header("x-requested-with") == Some("XMLHttpRequest")
    }

    /// Client IP: first `X-Forwarded-For` entry, else the TCP peer, else
    /// `127.0.0.1`.
    pub fn ip(&self) -> String {
        if let Some(first) = self
            .req
            .header("x-forwarded-for")
            .and_then(|ips| ips.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return first.to_owned();
        }
        match self.req.remote_addr() {
            Some(addr) => addr.ip().to_string(),
            None => "127.0.0.1".to_owned(),
        }
    }

    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(self.req.body())?)
    }

    pub fn decode_xml<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(quick_xml::de::from_reader(self.req.body().as_ref())?)
    }

    // ── Response side ─────────────────────────────────────────────────────────

    pub fn resp(&self) -> &ResponseWriter { &self.resp }
    pub fn resp_mut(&mut self) -> &mut ResponseWriter { &mut self.resp }

    /// Moves the response out, leaving an empty one behind.
    pub fn take_response(&mut self) -> ResponseWriter {
        std::mem::take(&mut self.resp)
    }

    /// Writes `value` as JSON. Nothing is written if encoding fails.
    pub fn serve_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let encoded = serde_json::to_vec(value)?;
        self.resp.set_content_type(ContentType::Json);
        self.resp.write(&encoded);
        Ok(())
    }

    /// Writes `value` as XML, rooted at the type's name.
    pub fn serve_xml<T: Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let encoded = quick_xml::se::to_string(value)?;
        self.resp.set_content_type(ContentType::Xml);
        self.resp.write(encoded.as_bytes());
        Ok(())
    }

    /// Writes the file at `path` as the body.
    pub fn serve_file(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let bytes = std::fs::read(path)?;
        if !self.resp.headers().contains_key(CONTENT_TYPE) {
            self.resp.set_content_type(ContentType::OctetStream);
        }
        self.resp.write(&bytes);
        Ok(())
    }

    /// Sends the file at `path` as an attachment named after its basename.
    pub fn download(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let disposition = HeaderValue::try_from(format!("attachment; filename=\"{name}\""))?;
        self.resp.set_header(CONTENT_DISPOSITION, disposition);
        io::copy(&mut file, &mut self.resp)?;
        Ok(())
    }

    /// `302 Found` to `url`.
    pub fn redirect(&mut self, url: &str) -> Result<(), Error> {
        self.redirect_with(url, StatusCode::FOUND)
    }

    pub fn redirect_with(&mut self, url: &str, status: StatusCode) -> Result<(), Error> {
        self.resp.set_header(LOCATION, HeaderValue::try_from(url)?);
        self.resp.write_header(status);
        Ok(())
    }

    pub fn not_modified(&mut self) {
        self.resp.write_header(StatusCode::NOT_MODIFIED);
    }

    /// Writes the captured `Value` / `Status` outcome, unless the response was
    /// already written or the outcome carries nothing to render.
    pub fn render(&mut self) -> Result<(), Error> {
        if self.resp.written() {
            return Ok(());
        }
        match &self.result {
            Outcome::Value(payload) => self.resp.render(StatusCode::OK, payload),
            Outcome::Status(status, payload) => self.resp.render(*status, payload),
            Outcome::Unset | Outcome::Abort(..) => Ok(()),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.req.method())
            .field("path", &self.req.path())
            .field("stage", &self.stage)
            .field("link", &self.link)
            .field("matched", &self.matched)
            .field("route", &self.route.as_ref().map(|r| r.pattern()))
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}
