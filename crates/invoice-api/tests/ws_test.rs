//! Push-channel tests over a real socket.
//!
//! Run with: `cargo test -p invoice-api --test ws_test`

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use helpers::{setup_hub_app, TestApp, TEST_BASE_URL};
use invoice_api::setup::routes;
use invoice_core::models::InvoiceTransactionStatus as Status;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the full router on an ephemeral port.
async fn serve(app: &TestApp) -> SocketAddr {
    let router = routes::setup_routes(&app.state.config, app.state.clone())
        .await
        .expect("Failed to build router");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect push channel");
    socket
}

async fn send_text(socket: &mut Socket, text: &str) {
    socket
        .send(Message::Text(text.into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("Timed out waiting for frame")
            .expect("Socket closed")
            .expect("Socket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Frame is not JSON")
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {:?}", other),
        }
    }
}

async fn wait_for_connections(app: &TestApp, expected: usize) {
    for _ in 0..100 {
        if app.state.hub.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(app.state.hub.connection_count(), expected);
}

#[tokio::test]
async fn test_push_channel_conversation() {
    let app = setup_hub_app().await;
    let addr = serve(&app).await;
    let mut socket = connect(addr).await;
    wait_for_connections(&app, 1).await;

    send_text(&mut socket, r#"{"action":"getImportUrl"}"#).await;

    let issued = next_json(&mut socket).await;
    let tx = issued["transactionId"]
        .as_str()
        .expect("transactionId missing")
        .to_string();
    assert_eq!(issued["expires"], 300);
    assert_eq!(issued["url"], format!("{}/{}", TEST_BASE_URL, tx));
    assert_eq!(
        next_json(&mut socket).await,
        json!({"transactionId": tx, "status": "GENERATED"})
    );

    let cancel = json!({"action": "cancelImport", "transactionId": tx}).to_string();
    send_text(&mut socket, &cancel).await;
    assert_eq!(
        next_json(&mut socket).await,
        json!({"transactionId": tx, "status": "CANCELLED"})
    );
    assert_eq!(app.stored_status(&tx), Some(Status::Cancelled));

    send_text(&mut socket, r#"{"transactionId":"x"}"#).await;
    let error = next_json(&mut socket).await;
    let message = error["error"].as_str().expect("error missing");
    assert!(
        message.starts_with("Unrecognized message: missing field `action`"),
        "unexpected error: {}",
        message
    );

    // A second cancel reports the status it lost to
    send_text(&mut socket, &cancel).await;
    assert_eq!(
        next_json(&mut socket).await,
        json!({"transactionId": tx, "status": "CANCELLED"})
    );

    socket.close(None).await.expect("Failed to close socket");
    wait_for_connections(&app, 0).await;
}

#[tokio::test]
async fn test_binary_frame_is_rejected() {
    let app = setup_hub_app().await;
    let addr = serve(&app).await;
    let mut socket = connect(addr).await;

    socket
        .send(Message::Binary(vec![1u8, 2, 3].into()))
        .await
        .expect("Failed to send frame");

    assert_eq!(
        next_json(&mut socket).await,
        json!({"error": "Binary frames are not supported"})
    );
}

#[tokio::test]
async fn test_cancel_of_unknown_transaction_reports_not_found() {
    let app = setup_hub_app().await;
    let addr = serve(&app).await;
    let mut socket = connect(addr).await;

    send_text(&mut socket, r#"{"action":"cancelImport","transactionId":"nope"}"#).await;

    assert_eq!(
        next_json(&mut socket).await,
        json!({"transactionId": "nope", "status": "NOT_FOUND"})
    );
}

#[tokio::test]
async fn test_dropped_socket_is_unregistered() {
    let app = setup_hub_app().await;
    let addr = serve(&app).await;

    let first = connect(addr).await;
    let _second = connect(addr).await;
    wait_for_connections(&app, 2).await;

    drop(first);
    wait_for_connections(&app, 1).await;
}
