// One-time town server bootstrap plus small WebSocket helpers for integration tests.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

static SERVER_ADDR: OnceLock<String> = OnceLock::new();
static SERVER_READY: OnceLock<()> = OnceLock::new();

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts the server once per test binary and returns its `host:port`.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // A dedicated OS thread keeps the server alive across `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                town_server::run(listener).await.expect("server failed");
            });
        });
        wait_until_accepting(published);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

fn wait_until_accepting(published: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr.clone());

    for _ in 0..100 {
        if std::net::TcpStream::connect(&addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server did not become ready in time");
}

pub async fn send_json(ws: &mut Ws, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("send should succeed");
}

/// Next JSON text frame, skipping control frames.
pub async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("server sent invalid json");
        }
    }
}

/// Reads until a message satisfies `pred`, discarding everything before it.
pub async fn recv_until(ws: &mut Ws, pred: impl Fn(&Value) -> bool) -> Value {
    loop {
        let msg = next_json(ws).await;
        if pred(&msg) {
            return msg;
        }
    }
}

pub async fn command_result(ws: &mut Ws, command_id: u64) -> Value {
    recv_until(ws, |msg| {
        msg["type"] == "CommandResult" && msg["data"]["command_id"] == command_id
    })
    .await
}

/// Connects, performs the Join handshake, and returns the socket, player id and snapshot.
pub async fn join(display_name: &str) -> (Ws, String, Value) {
    let addr = ensure_server();
    let (mut ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");

    send_json(
        &mut ws,
        serde_json::json!({ "type": "Join", "data": { "display_name": display_name } }),
    )
    .await;

    let identity = next_json(&mut ws).await;
    assert_eq!(identity["type"], "Identity");
    let player_id = identity["data"]["player_id"]
        .as_str()
        .expect("player id should be a string")
        .to_string();

    let snapshot = next_json(&mut ws).await;
    assert_eq!(snapshot["type"], "Snapshot");
    (ws, player_id, snapshot)
}
