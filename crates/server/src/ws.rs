//! WebSocket transport
//!
//! One socket = one endpoint. Authentication happens at upgrade time: a
//! connection without a valid token never produces an `EndpointHandle`, so
//! nothing unauthenticated can reach the relay. Each connection runs a
//! reader loop (socket -> relay) and a writer task (outbound queue ->
//! socket); the queue is what keeps one slow receiver from stalling a
//! broadcast to the others.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use ringline_session_core::SessionError;
use ringline_signaling_core::{ClientEvent, EndpointHandle, ServerEvent, SignalingError};
use ringline_users_core::CurrentUser;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let current = state.auth.verify_token(&params.token)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, current)))
}

async fn handle_socket(socket: WebSocket, state: AppState, current: CurrentUser) {
    let (handle, mut outbound) = EndpointHandle::new(current.user_id, current.username);
    debug!(endpoint = %handle.id, user = handle.user_id, "Socket connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Writer: drain this endpoint's queue onto the socket.
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("Failed to encode outbound event: {e}");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Reader: parse frames and hand them to the relay. A bad frame or a
    // refused event answers the sender and leaves the connection alive.
    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                let event: ClientEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        let error = SignalingError::BadEvent(e.to_string());
                        warn!(endpoint = %handle.id, "{error}");
                        handle.send(ServerEvent::Error {
                            message: client_message(&error),
                        });
                        continue;
                    }
                };
                if let Err(e) = state.relay.handle_event(&handle, event).await {
                    handle.send(ServerEvent::Error {
                        message: client_message(&e),
                    });
                }
            }
            Message::Close(_) => break,
            // Axum answers pings itself; binary frames are not part of the
            // protocol.
            _ => {}
        }
    }

    // Teardown before the tasks die: no phantom room members survive this
    // connection.
    state.relay.handle_disconnect(&handle);
    writer.abort();
}

/// What the originating endpoint is told. Internal store detail stays out
/// of the frame; the distinction that matters to a client is "retry" vs
/// "the call is already resolved".
fn client_message(error: &SignalingError) -> String {
    match error {
        SignalingError::Session(SessionError::StoreUnavailable(_)) => {
            "Temporarily unavailable, please retry".to_string()
        }
        SignalingError::Session(
            SessionError::InvalidTransition { .. } | SessionError::AlreadyTerminal(_),
        ) => "Call already resolved".to_string(),
        other => other.to_string(),
    }
}
