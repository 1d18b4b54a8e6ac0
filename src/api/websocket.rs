//! Handlers for websocket

use super::{extractor::WsGuard, AppState};
use crate::conn::Client;
use crate::core::constant::{MAILBOX_CAPACITY, MAX_FRAME_SIZE};
use crate::core::Error;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{header::ORIGIN, HeaderMap};
use axum::{response::IntoResponse, routing::get, Json, Router};
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms/:room_id/participants", get(room_participants))
}

#[derive(Deserialize)]
struct ConnectParams {
    room_id: String,
}

#[derive(Serialize)]
struct ParticipantsResponse {
    count: usize,
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    WsGuard(claims): WsGuard,
    Query(params): Query<ConnectParams>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
    check_origin(&state.config.allowed_origins, &headers)?;

    tracing::info!(
        room_id = %params.room_id,
        user_id = claims.user_id,
        "websocket connection accepted"
    );
    Ok(ws
        .max_message_size(MAX_FRAME_SIZE)
        .on_upgrade(move |socket| websocket(socket, state, claims.user_id, params.room_id)))
}

/// Reject a handshake whose Origin is absent from the allow-list.
/// An empty allow-list disables the check.
fn check_origin(allowed_origins: &[String], headers: &HeaderMap) -> Result<(), Error> {
    if allowed_origins.is_empty() {
        return Ok(());
    }
    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .ok_or(Error::OriginNotAllowed)?;
    if allowed_origins.iter().any(|allowed| allowed == origin) {
        Ok(())
    } else {
        tracing::warn!(origin, "websocket rejected by origin allow-list");
        Err(Error::OriginNotAllowed)
    }
}

async fn websocket(socket: WebSocket, state: Arc<AppState>, user_id: i64, room_id: String) {
    // by splitting, we can send and receive at the same time
    let (sender, receiver) = socket.split();

    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    let client = Client::new(user_id, room_id);

    if state.hub.register(&client, tx).await.is_err() {
        // the hub is shutting down
        return;
    }

    let mut write_task = {
        let client = client.clone();
        tokio::spawn(async move { client.write_pump(rx, sender).await })
    };

    let mut read_task = {
        let client = client.clone();
        let hub = state.hub.clone();
        tokio::spawn(async move { client.read_pump(&hub, receiver).await })
    };

    // whichever pump terminates first takes its sibling down with it
    tokio::select! {
        _ = (&mut write_task) => read_task.abort(),
        _ = (&mut read_task) => write_task.abort(),
    }

    let _ = state.hub.unregister(&client).await;
    tracing::debug!(
        user_id = client.user_id(),
        room_id = client.room_id(),
        "socket disconnect"
    );
}

async fn room_participants(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Json<ParticipantsResponse> {
    let count = state.hub.clients_in_room(&room_id).await;
    Json(ParticipantsResponse { count })
}
