use http::StatusCode;
use tracing::warn;

use crate::context::Context;
use crate::handler::{Flow, Middleware, Next};

/// Turns `Value` and `Status` outcomes into response bytes.
///
/// Runs after the rest of the chain. Responses already written by a
/// middleware or action are left alone. A payload the renderer does not
/// understand aborts with `500`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Render;

impl Middleware for Render {
    fn handle(&self, ctx: &mut Context, next: Next) -> Flow {
        let flow = next.run(ctx);
        if let Err(e) = ctx.render() {
            warn!(error = %e, "render failed");
            return ctx.abort(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
        flow
    }
}
