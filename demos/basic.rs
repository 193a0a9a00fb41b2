//! Minimal baton example: every calling convention, global and route-local
//! middleware, and health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42 -H 'x-api-key: secret'
//!   curl http://localhost:3000/healthz

use baton::{
    health, middleware, Action, App, Context, Flow, Method, Next, Request, ResponseWriter, Router,
    Server, StatusCode, boxed,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let routes = Router::new()
        .get("/users/{id}",    Action::context(get_user))
        .post("/users",        Action::pointer(CreateUser::default, CreateUser::call))
        .on_with(Method::DELETE, "/users/{id}", vec![boxed(require_key)], Action::http(delete_user))
        .get("/version",       Action::value(Version::default, Version::call))
        .get("/healthz",       Action::response(health::liveness))
        .get("/readyz",        Action::response(health::readiness));

    let app = App::builder(routes)
        .with(middleware::Logger)
        .with(middleware::Render)
        .build();

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}: the action writes the response itself.
fn get_user(ctx: &mut Context) {
    let id = ctx.params().get("id").unwrap_or("unknown").to_owned();
    let user = serde_json::json!({ "id": id, "name": "alice" });
    if let Err(e) = ctx.serve_json(&user) {
        ctx.abort(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
}

// POST /users: a controller whose return value Render turns into JSON.
#[derive(Default)]
struct CreateUser {
    created: u32,
}

impl CreateUser {
    fn call(&mut self) -> (StatusCode, serde_json::Value) {
        self.created += 1;
        (StatusCode::CREATED, serde_json::json!({ "id": "99", "name": "new_user" }))
    }
}

// DELETE /users/{id}: only reached once require_key lets the request through.
fn require_key(ctx: &mut Context, next: Next) -> Flow {
    if ctx.req().header("x-api-key").is_none() {
        return ctx.unauthorized();
    }
    next.run(ctx)
}

fn delete_user(resp: &mut ResponseWriter, _req: &Request) {
    resp.write_header(StatusCode::NO_CONTENT);
}

// GET /version: a value-receiver controller returning one value.
#[derive(Clone, Default)]
struct Version;

impl Version {
    fn call(self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
