//! Room registry: creates, tracks and looks up rooms, and remembers which
//! rooms each connection joined.

use std::collections::HashMap;

use tcgsync_state::{PlayerKey, RoomCode};
use tcgsync_transport::ConnectionId;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomHandle};

/// One room a connection joined, and the seat it got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room: RoomCode,
    /// `None` for a spectator.
    pub seat: Option<PlayerKey>,
}

/// Every live room, keyed by canonical room code.
///
/// This is the entry point for room operations from the server. It is an
/// explicit object owned by the server state and handed to the connection
/// handlers; there is no global registry. Rooms are never removed
/// automatically. Once [`close`](Self::close)d for server shutdown, the
/// registry keeps its rooms for lookup but refuses to create new ones.
///
/// The registry only does map work. Talking to a room goes through the
/// [`RoomHandle`] it returns, so callers can release whatever lock guards
/// the registry before awaiting the room.
pub struct RoomRegistry {
    config: RoomConfig,

    /// Active rooms, keyed by room code.
    rooms: HashMap<RoomCode, RoomHandle>,

    /// Reverse index: the rooms each connection joined, in join order.
    /// Consulted on disconnect instead of scanning every room.
    memberships: HashMap<ConnectionId, Vec<Membership>>,

    closed: bool,
}

impl RoomRegistry {
    /// Creates a new, empty registry. Every room it spawns uses `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            closed: false,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Turns a client-supplied room id into a room code.
    ///
    /// A present, non-empty id is uppercased. An absent or empty id gets a
    /// freshly generated code that no live room is using.
    pub fn normalize(&self, raw: Option<&str>) -> RoomCode {
        match raw {
            Some(raw) if !raw.is_empty() => RoomCode::normalize(raw),
            _ => loop {
                let code = RoomCode::generate();
                if !self.rooms.contains_key(&code) {
                    break code;
                }
            },
        }
    }

    /// Returns the room registered under `code`, if any.
    ///
    /// Callers decide what a missing room means; this never creates one.
    pub fn resolve(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Spawns a fresh room under `code`.
    ///
    /// # Errors
    /// `AlreadyExists` if the code is taken, `Unavailable` once the
    /// registry is closed.
    pub fn create(&mut self, code: RoomCode) -> Result<RoomHandle, RoomError> {
        if self.closed {
            return Err(RoomError::Unavailable(code));
        }
        if self.rooms.contains_key(&code) {
            return Err(RoomError::AlreadyExists(code));
        }

        let handle = spawn_room(code.clone(), self.config.clone());
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(room_id = %code, rooms = self.rooms.len(), "room created");
        Ok(handle)
    }

    /// Returns the room under `code`, creating it if needed.
    pub fn get_or_create(
        &mut self,
        code: RoomCode,
    ) -> Result<RoomHandle, RoomError> {
        match self.rooms.get(&code) {
            Some(handle) => Ok(handle.clone()),
            None => self.create(code),
        }
    }

    /// Stops taking new rooms and returns every room so the caller can
    /// shut them down outside whatever lock guards the registry.
    ///
    /// Rooms stay registered, so requests for them resolve to a stopped
    /// room and fail with `Unavailable` instead of being ignored.
    pub fn close(&mut self) -> Vec<RoomHandle> {
        self.closed = true;
        self.memberships.clear();
        tracing::info!(rooms = self.rooms.len(), "room registry closed");
        self.rooms.values().cloned().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Records that `conn` joined `room` with `seat`.
    ///
    /// Joining the same room again replaces the earlier entry.
    pub fn record_join(
        &mut self,
        conn: ConnectionId,
        room: RoomCode,
        seat: Option<PlayerKey>,
    ) {
        let joined = self.memberships.entry(conn).or_default();
        match joined.iter_mut().find(|m| m.room == room) {
            Some(existing) => existing.seat = seat,
            None => joined.push(Membership { room, seat }),
        }
    }

    /// The rooms `conn` joined, in join order.
    pub fn memberships(&self, conn: ConnectionId) -> &[Membership] {
        self.memberships
            .get(&conn)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Removes and returns every membership of `conn`. Called once when
    /// the connection goes away.
    pub fn take_memberships(&mut self, conn: ConnectionId) -> Vec<Membership> {
        self.memberships.remove(&conn).unwrap_or_default()
    }

    /// Returns the number of registered rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
