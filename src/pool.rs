//! Reusable contexts.
//!
//! A [`ContextPool`] hands out one [`Context`] per in-flight request and takes
//! it back when the [`PooledContext`] guard drops. Returning a context clears
//! every per-request field first, so nothing from one request (route,
//! params, controller instance, outcome) can leak into the next. The pool
//! keeps at most `capacity` idle contexts; extras are simply dropped.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::app::App;
use crate::context::Context;
use crate::request::Request;
use crate::response::ResponseWriter;

pub const DEFAULT_CAPACITY: usize = 1024;

pub struct ContextPool {
    app: Arc<App>,
    idle: Mutex<Vec<Context>>,
    capacity: usize,
}

impl ContextPool {
    pub fn new(app: Arc<App>, capacity: usize) -> Self {
        Self { app, idle: Mutex::new(Vec::new()), capacity }
    }

    /// Takes an idle context (or makes a new one) and binds it to `req`.
    pub fn acquire(&self, req: Request) -> PooledContext<'_> {
        let mut ctx = self
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| Context::new(Arc::clone(&self.app)));
        // Idle contexts were reset on release, fresh ones start clean.
        ctx.bind(req);
        PooledContext { pool: self, ctx: Some(ctx) }
    }

    /// Number of contexts waiting for reuse.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, mut ctx: Context) {
        ctx.reset(Request::default(), ResponseWriter::new());
        let mut idle = self.idle.lock();
        if idle.len() < self.capacity {
            idle.push(ctx);
        }
    }
}

/// Exclusive handle on a pooled context; returns it to the pool on drop.
pub struct PooledContext<'a> {
    pool: &'a ContextPool,
    ctx: Option<Context>,
}

impl Deref for PooledContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx.as_ref().expect("context is only taken on drop")
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx.as_mut().expect("context is only taken on drop")
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}
