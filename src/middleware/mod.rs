//! Built-in middleware.
//!
//! - [`Logger`]: one `tracing` line per request with method, path, status,
//!   and latency.
//! - [`Render`]: writes the action's [`Outcome`](crate::Outcome) once the
//!   rest of the chain has returned.
//!
//! Both do their work after `next.run(ctx)`, so register them first:
//!
//! ```rust
//! use baton::{middleware, App, Router};
//!
//! let app = App::builder(Router::new())
//!     .with(middleware::Logger)
//!     .with(middleware::Render)
//!     .build();
//! ```

mod logger;
mod render;

pub use logger::Logger;
pub use render::Render;
