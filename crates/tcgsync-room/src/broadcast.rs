//! The broadcast coordinator: who is in a room and how they hear about it.

use std::collections::HashMap;
use std::sync::Arc;

use tcgsync_protocol::ServerEvent;
use tcgsync_state::{KnockoutRecord, Match};
use tcgsync_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender for delivering outbound events to one connection.
///
/// Events are shared behind an `Arc` so a broadcast encodes nothing and
/// clones nothing per recipient.
pub type MemberSender = mpsc::UnboundedSender<Arc<ServerEvent>>;

/// The connections currently in one room, seated or spectating.
///
/// Sending never waits and never fails: a member whose receiver is gone
/// has disconnected and will be removed by its `Leave`.
#[derive(Debug, Default)]
pub struct Members {
    senders: HashMap<ConnectionId, MemberSender>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a member's sender. Returns `true` if `conn` was
    /// not a member before.
    pub fn insert(&mut self, conn: ConnectionId, sender: MemberSender) -> bool {
        self.senders.insert(conn, sender).is_none()
    }

    /// Returns `true` if `conn` was a member.
    pub fn remove(&mut self, conn: ConnectionId) -> bool {
        self.senders.remove(&conn).is_some()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.senders.contains_key(&conn)
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Sends an event to one member.
    pub fn send_to(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(Arc::new(event));
        }
    }

    /// Sends an event to every member.
    pub fn broadcast(&self, event: ServerEvent) {
        let event = Arc::new(event);
        for sender in self.senders.values() {
            let _ = sender.send(Arc::clone(&event));
        }
    }

    /// Fans out the result of a mutation.
    ///
    /// Always the full state; then the knockout batch if it is non-empty;
    /// then `game_ended` if the match is over.
    pub fn publish(&self, game: &Match, knockouts: &[KnockoutRecord]) {
        self.broadcast(ServerEvent::state(game));
        if !knockouts.is_empty() {
            self.broadcast(ServerEvent::KnockoutsOccurred {
                knockouts: knockouts.to_vec(),
            });
        }
        if game.ended {
            self.broadcast(ServerEvent::GameEnded {
                winner: game.winner,
            });
        }
    }
}
