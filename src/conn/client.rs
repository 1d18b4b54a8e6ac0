use super::{Envelope, Hub};
use crate::core::constant::{PING_PERIOD, READ_TIMEOUT, WRITE_TIMEOUT};
use axum::extract::ws::{Message, WebSocket};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use uuid::Uuid;

// ========================// Client //======================== //

/// One live connection. Identity and room are fixed at construction;
/// the mailbox is created by the websocket handler and its only sender
/// is handed to the hub at registration.
#[derive(Debug, Clone)]
pub struct Client {
    id: Uuid,
    user_id: i64,
    room_id: String,
}

impl Client {
    pub fn new(user_id: i64, room_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            room_id,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Pump inbound frames from the connection to the hub.
    ///
    /// The read deadline is refreshed only by Pong frames. A frame that
    /// fails to decode, or claims another room, is dropped without
    /// killing the connection; `user_id` is always overwritten with this
    /// client's identity before the broadcast.
    pub async fn read_pump(&self, hub: &Hub, mut receiver: SplitStream<WebSocket>) {
        let mut deadline = Instant::now() + READ_TIMEOUT;

        loop {
            let msg = match time::timeout_at(deadline, receiver.next()).await {
                Err(_) => {
                    tracing::debug!(user_id = self.user_id, "read deadline expired");
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    tracing::debug!(user_id = self.user_id, error = %e, "read error");
                    break;
                }
                Ok(Some(Ok(msg))) => msg,
            };

            match msg {
                Message::Text(text) => {
                    let envelope = match Envelope::decode(&text) {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            tracing::warn!(user_id = self.user_id, error = %e, "malformed frame");
                            continue;
                        }
                    };

                    let Some(envelope) = envelope.into_sanitized(&self.room_id, self.user_id)
                    else {
                        tracing::warn!(
                            user_id = self.user_id,
                            room_id = %self.room_id,
                            "dropped envelope for wrong room"
                        );
                        continue;
                    };

                    let payload = match envelope.encode() {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!(user_id = self.user_id, error = %e, "encode failed");
                            continue;
                        }
                    };

                    tracing::debug!(
                        user_id = self.user_id,
                        kind = envelope.payload.kind(),
                        "forwarding envelope"
                    );
                    if hub.broadcast(&self.room_id, payload).await.is_err() {
                        break;
                    }
                }
                Message::Pong(_) => {
                    deadline = Instant::now() + READ_TIMEOUT;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    }

    /// Pump the mailbox onto the connection.
    ///
    /// Queued messages are coalesced into a single flush without
    /// reordering. A ping is sent whenever no data write happened for a
    /// whole keepalive period; every write is bounded by the write
    /// deadline. Mailbox closure is the hub's shutdown signal: a
    /// best-effort Close frame is sent and the pump returns.
    pub async fn write_pump(
        &self,
        mut rx: mpsc::Receiver<String>,
        mut sender: SplitSink<WebSocket, Message>,
    ) {
        let mut interval = time::interval_at(Instant::now() + PING_PERIOD, PING_PERIOD);

        loop {
            tokio::select! {
                maybe = rx.recv() => {
                    let Some(payload) = maybe else {
                        // the hub closed the mailbox
                        let close = sender.send(Message::Close(None));
                        let _ = time::timeout(WRITE_TIMEOUT, close).await;
                        return;
                    };

                    let mut batch = vec![payload];
                    while let Ok(more) = rx.try_recv() {
                        batch.push(more);
                    }

                    let write = async {
                        for payload in batch {
                            sender.feed(Message::Text(payload)).await?;
                        }
                        sender.flush().await
                    };
                    match time::timeout(WRITE_TIMEOUT, write).await {
                        Ok(Ok(())) => {}
                        _ => return,
                    }

                    interval.reset();
                }
                _ = interval.tick() => {
                    let ping = sender.send(Message::Ping(Vec::new()));
                    match time::timeout(WRITE_TIMEOUT, ping).await {
                        Ok(Ok(())) => {}
                        _ => return,
                    }
                }
            }
        }
    }
}
