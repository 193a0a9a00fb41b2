use std::time::Instant;

use tracing::info;

use crate::context::Context;
use crate::handler::{Flow, Middleware, Next};

/// Logs every request after the rest of the chain has run.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logger;

impl Middleware for Logger {
    fn handle(&self, ctx: &mut Context, next: Next) -> Flow {
        let start = Instant::now();
        let method = ctx.req().method().clone();
        let path = ctx.req().path().to_owned();

        let flow = next.run(ctx);

        info!(
            %method,
            %path,
            status = ctx.resp().status().as_u16(),
            elapsed = ?start.elapsed(),
            "request"
        );
        flow
    }
}
