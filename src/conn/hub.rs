use super::Client;
use crate::core::constant::HUB_CHAN_CAPACITY;
use crate::core::Error;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

// ========================// Hub //======================== //

/// The single authority over room membership and message fan-out.
///
/// All operations go through one command channel consumed by a dedicated
/// serve task, so registration, removal and slow-consumer eviction never
/// race with each other and per-room broadcast order is preserved.
#[derive(Clone)]
pub struct Hub {
    tx: mpsc::Sender<Command>,
}

enum Command {
    Register {
        client: Client,
        tx: mpsc::Sender<String>,
    },
    Unregister {
        room_id: String,
        client_id: Uuid,
    },
    Broadcast {
        room_id: String,
        payload: String,
    },
    Count {
        room_id: String,
        reply: oneshot::Sender<usize>,
    },
    Shutdown,
}

impl Hub {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(HUB_CHAN_CAPACITY);

        tokio::spawn(async move {
            Registry::default().serve(rx).await;
        });

        Self { tx }
    }

    /// Admit a client to its room; `tx` is the sending half of the
    /// client's mailbox and must be the only sender for it.
    pub async fn register(&self, client: &Client, tx: mpsc::Sender<String>) -> Result<(), Error> {
        self.tx
            .send(Command::Register {
                client: client.clone(),
                tx,
            })
            .await?;
        Ok(())
    }

    /// Remove a client from its room and close its mailbox.
    /// Removing a client not present is a silent no-op.
    pub async fn unregister(&self, client: &Client) -> Result<(), Error> {
        self.tx
            .send(Command::Unregister {
                room_id: client.room_id().to_owned(),
                client_id: client.id(),
            })
            .await?;
        Ok(())
    }

    /// Deliver `payload` to every current member of the room.
    /// Broadcasting to an absent room is a silent no-op.
    pub async fn broadcast(&self, room_id: &str, payload: String) -> Result<(), Error> {
        self.tx
            .send(Command::Broadcast {
                room_id: room_id.to_owned(),
                payload,
            })
            .await?;
        Ok(())
    }

    /// Current member count of the room, 0 if absent.
    pub async fn clients_in_room(&self, room_id: &str) -> usize {
        let (reply, rx) = oneshot::channel();
        let cmd = Command::Count {
            room_id: room_id.to_owned(),
            reply,
        };
        if self.tx.send(cmd).await.is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    /// Stop the serve task; every live mailbox is closed so the owning
    /// write pumps unwind.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }
}

// ========================// Registry //======================== //

struct Member {
    user_id: i64,
    tx: mpsc::Sender<String>,
}

/// The room map, owned exclusively by the serve task.
///
/// A room key is present iff its member set is non-empty: created lazily
/// on first join, deleted eagerly on last leave.
#[derive(Default)]
struct Registry {
    rooms: HashMap<String, HashMap<Uuid, Member>>,
}

impl Registry {
    async fn serve(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Register { client, tx } => self.register(client, tx),
                Command::Unregister { room_id, client_id } => self.unregister(&room_id, client_id),
                Command::Broadcast { room_id, payload } => self.broadcast(&room_id, &payload),
                Command::Count { room_id, reply } => {
                    let _ = reply.send(self.count(&room_id));
                }
                Command::Shutdown => break,
            }
        }
        // dropping the registry drops every mailbox sender
        tracing::info!("hub stopped");
    }

    fn register(&mut self, client: Client, tx: mpsc::Sender<String>) {
        let members = self.rooms.entry(client.room_id().to_owned()).or_default();
        members.insert(
            client.id(),
            Member {
                user_id: client.user_id(),
                tx,
            },
        );
        tracing::debug!(
            room_id = client.room_id(),
            user_id = client.user_id(),
            clients_in_room = members.len(),
            "client registered"
        );
    }

    fn unregister(&mut self, room_id: &str, client_id: Uuid) {
        if let Some(members) = self.rooms.get_mut(room_id) {
            if members.remove(&client_id).is_some() {
                tracing::debug!(room_id, clients_in_room = members.len(), "client unregistered");
            }
            if members.is_empty() {
                self.rooms.remove(room_id);
                tracing::debug!(room_id, "removed empty room");
            }
        }
    }

    fn broadcast(&mut self, room_id: &str, payload: &str) {
        let Some(members) = self.rooms.get_mut(room_id) else {
            tracing::debug!(room_id, "broadcast to non-existent room");
            return;
        };

        let mut evicted = Vec::new();
        for (id, member) in members.iter() {
            if let Err(e) = member.tx.try_send(payload.to_owned()) {
                // full mailbox means a slow consumer; closed means its
                // write pump is already gone
                tracing::warn!(
                    room_id,
                    user_id = member.user_id,
                    error = %e,
                    "evicting client from room"
                );
                evicted.push(*id);
            }
        }

        // dropping the sender closes the mailbox and terminates the
        // client's write pump
        for id in evicted {
            members.remove(&id);
        }
        if members.is_empty() {
            self.rooms.remove(room_id);
            tracing::debug!(room_id, "removed empty room");
        }
    }

    fn count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, |members| members.len())
    }
}

// ========================// tests //======================== //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constant::MAILBOX_CAPACITY;

    fn member(user_id: i64, room_id: &str) -> (Client, mpsc::Sender<String>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        (Client::new(user_id, room_id.to_owned()), tx, rx)
    }

    #[tokio::test]
    async fn count_is_zero_for_unknown_room() {
        let hub = Hub::new();
        assert_eq!(hub.clients_in_room("nope").await, 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_only_room_members() {
        let hub = Hub::new();
        let (a, a_tx, mut a_rx) = member(1, "r1");
        let (b, b_tx, mut b_rx) = member(2, "r1");
        let (c, c_tx, mut c_rx) = member(3, "r2");

        hub.register(&a, a_tx).await.unwrap();
        hub.register(&b, b_tx).await.unwrap();
        hub.register(&c, c_tx).await.unwrap();
        assert_eq!(hub.clients_in_room("r1").await, 2);
        assert_eq!(hub.clients_in_room("r2").await, 1);

        hub.broadcast("r1", "hello".to_owned()).await.unwrap();
        // the count query flushes the command queue
        hub.clients_in_room("r1").await;

        assert_eq!(a_rx.try_recv().unwrap(), "hello");
        assert_eq!(b_rx.try_recv().unwrap(), "hello");
        assert!(c_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_to_absent_room_is_noop() {
        let hub = Hub::new();
        hub.broadcast("ghost", "hello".to_owned()).await.unwrap();
        assert_eq!(hub.clients_in_room("ghost").await, 0);
    }

    #[tokio::test]
    async fn mailbox_order_is_broadcast_order() {
        let hub = Hub::new();
        let (a, a_tx, mut a_rx) = member(1, "r1");
        hub.register(&a, a_tx).await.unwrap();

        for i in 0..3 {
            hub.broadcast("r1", format!("m{}", i)).await.unwrap();
        }
        hub.clients_in_room("r1").await;

        assert_eq!(a_rx.try_recv().unwrap(), "m0");
        assert_eq!(a_rx.try_recv().unwrap(), "m1");
        assert_eq!(a_rx.try_recv().unwrap(), "m2");
    }

    #[tokio::test]
    async fn unregister_removes_room_when_empty() {
        let hub = Hub::new();
        let (a, a_tx, _a_rx) = member(1, "r1");
        let (b, b_tx, _b_rx) = member(2, "r1");

        hub.register(&a, a_tx).await.unwrap();
        hub.register(&b, b_tx).await.unwrap();
        assert_eq!(hub.clients_in_room("r1").await, 2);

        hub.unregister(&a).await.unwrap();
        assert_eq!(hub.clients_in_room("r1").await, 1);

        hub.unregister(&b).await.unwrap();
        assert_eq!(hub.clients_in_room("r1").await, 0);

        // removing an absent client is a silent no-op
        hub.unregister(&b).await.unwrap();
        assert_eq!(hub.clients_in_room("r1").await, 0);
    }

    #[tokio::test]
    async fn unregister_closes_mailbox() {
        let hub = Hub::new();
        let (a, a_tx, mut a_rx) = member(1, "r1");
        hub.register(&a, a_tx).await.unwrap();

        hub.unregister(&a).await.unwrap();
        hub.clients_in_room("r1").await;

        assert!(a_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn slow_consumer_is_evicted() {
        let hub = Hub::new();
        // a consumer that never drains its mailbox
        let (d, d_tx, mut d_rx) = member(4, "r1");
        hub.register(&d, d_tx).await.unwrap();

        for i in 0..300 {
            hub.broadcast("r1", format!("m{}", i)).await.unwrap();
        }
        assert_eq!(hub.clients_in_room("r1").await, 0);

        // exactly one mailbox worth of messages was delivered, then the
        // mailbox was closed by the eviction
        for i in 0..MAILBOX_CAPACITY {
            assert_eq!(d_rx.recv().await.unwrap(), format!("m{}", i));
        }
        assert!(d_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn eviction_spares_draining_members() {
        let hub = Hub::new();
        let (c, c_tx, mut c_rx) = member(5, "r1");
        let (d, d_tx, _d_rx_kept) = {
            // an undersized mailbox stands in for a stalled consumer
            let (tx, rx) = mpsc::channel(1);
            (Client::new(6, "r1".to_owned()), tx, rx)
        };

        hub.register(&c, c_tx).await.unwrap();
        hub.register(&d, d_tx).await.unwrap();

        hub.broadcast("r1", "m0".to_owned()).await.unwrap();
        hub.broadcast("r1", "m1".to_owned()).await.unwrap();

        // d's mailbox filled at m0, so m1 evicted it
        assert_eq!(hub.clients_in_room("r1").await, 1);
        assert_eq!(c_rx.try_recv().unwrap(), "m0");
        assert_eq!(c_rx.try_recv().unwrap(), "m1");
    }

    #[tokio::test]
    async fn shutdown_closes_all_mailboxes() {
        let hub = Hub::new();
        let (a, a_tx, mut a_rx) = member(1, "r1");
        let (b, b_tx, mut b_rx) = member(2, "r2");
        hub.register(&a, a_tx).await.unwrap();
        hub.register(&b, b_tx).await.unwrap();

        hub.shutdown().await;

        assert!(a_rx.recv().await.is_none());
        assert!(b_rx.recv().await.is_none());
        assert_eq!(hub.clients_in_room("r1").await, 0);
    }
}
