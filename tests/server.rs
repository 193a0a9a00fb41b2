use std::net::SocketAddr;
use std::sync::Arc;

use baton::{Action, App, Context, Router, Server, StatusCode, health, middleware};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct Echo;

fn app() -> Arc<App> {
    let routes = Router::new()
        .get("/healthz", Action::response(health::liveness))
        .post(
            "/echo",
            Action::value(Echo::default, |_: Echo| (StatusCode::CREATED, String::from("created"))),
        )
        .get(
            "/users/{id}",
            Action::context(|ctx: &mut Context| {
                let id = ctx.params().get("id").unwrap_or_default().to_owned();
                let body = serde_json::json!({ "id": id });
                ctx.serve_json(&body).unwrap();
            }),
        );
    App::builder(routes)
        .with(middleware::Logger)
        .with(middleware::Render)
        .build()
}

async fn start() -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        Server::from_listener(listener)
            .pool_capacity(8)
            .serve_with_shutdown(app(), async {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });
    (addr, tx, handle)
}

/// Sends one HTTP/1.1 request with `Connection: close` and returns the raw
/// response text.
async fn roundtrip(addr: SocketAddr, head: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{head}\r\nhost: localhost\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{body}",
        body.len(),
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn serves_every_calling_convention_end_to_end() {
    let (addr, shutdown, handle) = start().await;

    let health = roundtrip(addr, "GET /healthz HTTP/1.1", "").await;
    assert!(health.starts_with("HTTP/1.1 200 OK"), "{health}");
    assert!(health.ends_with("ok"), "{health}");

    let echo = roundtrip(addr, "POST /echo/ HTTP/1.1", "ignored").await;
    assert!(echo.starts_with("HTTP/1.1 201 Created"), "{echo}");
    assert!(echo.ends_with("created"), "{echo}");

    let user = roundtrip(addr, "GET /users/42 HTTP/1.1", "").await;
    assert!(user.starts_with("HTTP/1.1 200 OK"), "{user}");
    assert!(user.contains("application/json"), "{user}");
    assert!(user.ends_with(r#"{"id":"42"}"#), "{user}");

    let missing = roundtrip(addr, "GET /nope HTTP/1.1", "").await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"), "{missing}");
    assert!(missing.ends_with("Not Found"), "{missing}");

    shutdown.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn invalid_bind_address_is_an_error() {
    let err = Server::bind("not an address")
        .serve_with_shutdown(app(), async {})
        .await
        .unwrap_err();
    assert!(matches!(err, baton::Error::Addr { .. }), "{err}");
}
