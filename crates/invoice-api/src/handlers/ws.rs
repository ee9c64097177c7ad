//! Push-channel WebSocket endpoint.
//!
//! Connect registers the socket in the connection hub under a fresh connection id,
//! disconnect removes it. Inbound frames are dispatched on their `action`; every
//! outbound frame (replies and status pushes) goes through the hub.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use invoice_core::models::{PushMessage, PushRequest};
use invoice_infra::{PushNotifier, RequestId};

use super::{cancel_import, issue_import_url};
use crate::state::AppState;

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.max_message_size(state.config.ws_max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection_id, mut outbound) = state.hub.register();
    tracing::info!(connection_id = %connection_id, "Push channel connected");

    let (mut sink, mut stream) = socket.split();

    let writer_connection_id = connection_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(message.to_json().into())).await {
                tracing::debug!(
                    connection_id = %writer_connection_id,
                    error = %e,
                    "Push channel write failed"
                );
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                handle_frame(&state, &connection_id, text.as_str()).await;
            }
            Ok(Message::Binary(_)) => {
                reply_error(&state, &connection_id, "Binary frames are not supported").await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "Push channel read failed");
                break;
            }
        }
    }

    state.hub.unregister(&connection_id);
    writer.abort();
    tracing::info!(connection_id = %connection_id, "Push channel disconnected");
}

async fn handle_frame(state: &AppState, connection_id: &str, text: &str) {
    let request: PushRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(connection_id = %connection_id, error = %e, "Unrecognized frame");
            reply_error(state, connection_id, &format!("Unrecognized message: {}", e)).await;
            return;
        }
    };

    match request {
        PushRequest::GetImportUrl => {
            let RequestId(request_id) = RequestId::generate();
            // Failures are logged by the issuer; the client just gets no URL.
            let _ = issue_import_url(state, connection_id, &request_id).await;
        }
        PushRequest::CancelImport { transaction_id } => {
            cancel_import(state, connection_id, &transaction_id).await;
        }
    }
}

async fn reply_error(state: &AppState, connection_id: &str, error: &str) {
    state
        .hub
        .send(connection_id, &PushMessage::error(error))
        .await;
}
