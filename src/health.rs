//! Built-in Kubernetes health-check actions.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Both write straight into the response sink, so they register with the
//! response-only calling convention:
//!
//! ```rust
//! use baton::{health, Action, Router};
//!
//! let routes = Router::new()
//!     .get("/healthz", Action::response(health::liveness))
//!     .get("/readyz", Action::response(health::readiness));
//! ```
//!
//! Replace `readiness` with your own action if you need to gate on
//! dependency availability.

use crate::response::{ContentType, ResponseWriter};

/// Always `200 OK` with body `"ok"`.
pub fn liveness(resp: &mut ResponseWriter) {
    resp.set_content_type(ContentType::Text);
    resp.write(b"ok");
}

/// `200 OK` with body `"ready"`.
pub fn readiness(resp: &mut ResponseWriter) {
    resp.set_content_type(ContentType::Text);
    resp.write(b"ready");
}
