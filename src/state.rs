use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use net::Uuid;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Notifications for whatever runs alongside the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    PlayerIdentified {
        name: String,
        uuid: Uuid,
        addr: SocketAddr,
    },
}

/// State shared by every connection of one server instance.
#[derive(Debug)]
pub struct ServerState {
    online_players: AtomicU64,
    events: broadcast::Sender<ServerEvent>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            online_players: AtomicU64::new(0),
            events: broadcast::channel(EVENT_CAPACITY).0,
        }
    }

    pub fn online_players(&self) -> u64 {
        self.online_players.load(Ordering::Acquire)
    }

    /// Counts one more player until the returned slot is dropped.
    pub fn join(self: &Arc<Self>) -> PlayerSlot {
        self.online_players.fetch_add(1, Ordering::AcqRel);
        PlayerSlot {
            state: Arc::clone(self),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    /// Fire and forget; nobody listening is fine.
    pub fn publish(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }
}

#[derive(Debug)]
pub struct PlayerSlot {
    state: Arc<ServerState>,
}

impl Drop for PlayerSlot {
    fn drop(&mut self) {
        self.state.online_players.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_track_online_players() {
        let state = Arc::new(ServerState::new());
        assert_eq!(state.online_players(), 0);

        let a = state.join();
        let b = state.join();
        assert_eq!(state.online_players(), 2);

        drop(a);
        assert_eq!(state.online_players(), 1);
        drop(b);
        assert_eq!(state.online_players(), 0);
    }

    #[tokio::test]
    async fn events_reach_subscribers() {
        let state = ServerState::new();
        state.publish(ServerEvent::PlayerIdentified {
            name: "dropped".into(),
            uuid: Uuid::from_u128(0),
            addr: "127.0.0.1:1".parse().unwrap(),
        });

        let mut rx = state.subscribe();
        let event = ServerEvent::PlayerIdentified {
            name: "Notch".into(),
            uuid: Uuid::from_u128(1),
            addr: "127.0.0.1:2".parse().unwrap(),
        };
        state.publish(event.clone());
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
