//! Room actor: an isolated Tokio task that owns one match.
//!
//! Each room runs in its own task and talks to the outside world only
//! through a bounded mpsc channel. Nothing else holds a reference to the
//! [`Match`]: connection handlers send [`RoomCommand`]s through a
//! [`RoomHandle`] and the actor applies them one at a time.
//!
//! ## Ordering
//!
//! Commands are handled strictly in the order they reach the channel.
//! Two players hitting each other's units at the same moment are
//! serialized here, so a knockout is counted once and prize deductions
//! never interleave. Every broadcast for a command is queued before the
//! next command is read, so all members see events in the same order.
//!
//! ## Who hears what
//!
//! - `player_assigned` goes to the joiner only, then `game_state_update`
//!   to the whole room.
//! - A successful mutation publishes state, then knockouts, then
//!   `game_ended` (see [`Members::publish`]).
//! - A rejected mutation sends one `error` event back on the sender's own
//!   channel and changes nothing.
//!
//! ## Lifecycle
//!
//! A room is spawned by the registry on first use and runs until it gets
//! `Shutdown` (sent when the server stops) or every handle is dropped.
//! After that, any call on a handle fails with
//! [`RoomError::Unavailable`].

use std::sync::Arc;

use tcgsync_protocol::ServerEvent;
use tcgsync_state::{Match, PlayerKey, RoomCode};
use tcgsync_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{MemberSender, Members, Mutation, RoomConfig, RoomError, apply};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the answer on it.
pub(crate) enum RoomCommand {
    /// Add a connection to the room and seat it if a seat is free.
    Join {
        conn: ConnectionId,
        display_name: String,
        sender: MemberSender,
        reply: oneshot::Sender<Option<PlayerKey>>,
    },

    /// Apply one client change. Failures go to `reply_to` only.
    Mutate {
        origin: ConnectionId,
        mutation: Mutation,
        reply_to: MemberSender,
    },

    /// A connection went away: drop it and free any seat it held.
    Leave { conn: ConnectionId },

    /// Request a copy of the current match.
    Snapshot { reply: oneshot::Sender<Match> },

    /// Shut down the room.
    Shutdown,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// This is cheap to clone; it is just an `mpsc::Sender` plus the room
/// code. The registry holds one per room and hands out clones, so the
/// registry lock can be released before awaiting the room.
///
/// ## Example
///
/// ```rust,ignore
/// let room = registry.get_or_create(RoomCode::normalize("abc"))?;
/// let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
///
/// // Seats the connection and queues player_assigned + game_state_update.
/// let seat = room.join(conn_id, "Ash".into(), tx.clone()).await?;
///
/// room.mutate(conn_id, Mutation::Reset, tx).await?;
/// ```
#[derive(Clone, Debug)]
pub struct RoomHandle {
    room_id: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn room_id(&self) -> &RoomCode {
        &self.room_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Joins `conn` to the room.
    ///
    /// Returns the seat it was given, or `None` for a spectator. By the
    /// time this returns the room has queued `player_assigned` to the
    /// joiner and `game_state_update` to every member on their senders.
    pub async fn join(
        &self,
        conn: ConnectionId,
        display_name: String,
        sender: MemberSender,
    ) -> Result<Option<PlayerKey>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            conn,
            display_name,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Queues a mutation (fire-and-forget). A rejected mutation is
    /// reported to `reply_to` as an `error` event.
    pub async fn mutate(
        &self,
        origin: ConnectionId,
        mutation: Mutation,
        reply_to: MemberSender,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Mutate {
            origin,
            mutation,
            reply_to,
        })
        .await
    }

    /// Tells the room that `conn` disconnected.
    pub async fn leave(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Leave { conn }).await
    }

    /// Returns a copy of the match as of every command queued before this
    /// call.
    pub async fn snapshot(&self) -> Result<Match, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    game: Match,
    config: RoomConfig,
    members: Members,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room_id = %self.game.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    display_name,
                    sender,
                    reply,
                } => {
                    let seat = self.handle_join(conn, display_name, sender);
                    let _ = reply.send(seat);
                }
                RoomCommand::Mutate {
                    origin,
                    mutation,
                    reply_to,
                } => {
                    if let Err(e) = self.handle_mutate(origin, mutation) {
                        let _ = reply_to
                            .send(Arc::new(ServerEvent::bad_request(e.to_string())));
                    }
                }
                RoomCommand::Leave { conn } => self.handle_leave(conn),
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.game.clone());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.game.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.game.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        display_name: String,
        sender: MemberSender,
    ) -> Option<PlayerKey> {
        // A connection that already holds a seat gets it back.
        let seat = self.game.seat_of(conn).or_else(|| self.game.free_seat());
        match seat {
            Some(key) => {
                self.game.player_mut(key).seat(conn, display_name);
                tracing::info!(
                    room_id = %self.game.room_id,
                    conn_id = %conn,
                    player = %key,
                    "player seated"
                );
            }
            None => {
                tracing::info!(
                    room_id = %self.game.room_id,
                    conn_id = %conn,
                    "spectator joined"
                );
            }
        }

        self.members.insert(conn, sender);
        self.members.send_to(conn, ServerEvent::PlayerAssigned {
            player: seat,
            room_id: self.game.room_id.clone(),
            game_state: Box::new(self.game.clone()),
        });
        self.members.broadcast(ServerEvent::state(&self.game));
        seat
    }

    fn handle_mutate(
        &mut self,
        origin: ConnectionId,
        mutation: Mutation,
    ) -> Result<(), RoomError> {
        let kind = mutation.kind();
        let outcome = apply(&mut self.game, mutation, &self.config)
            .inspect_err(|e| {
                tracing::debug!(
                    room_id = %self.game.room_id,
                    conn_id = %origin,
                    mutation = kind,
                    error = %e,
                    "mutation rejected"
                );
            })?;
        tracing::debug!(
            room_id = %self.game.room_id,
            conn_id = %origin,
            mutation = kind,
            knockouts = outcome.knockouts.len(),
            "mutation applied"
        );
        self.members.publish(&self.game, &outcome.knockouts);
        Ok(())
    }

    fn handle_leave(&mut self, conn: ConnectionId) {
        self.members.remove(conn);

        let mut vacated = false;
        for key in PlayerKey::ALL {
            let player = self.game.player_mut(key);
            if player.connection_id == Some(conn) {
                player.vacate();
                vacated = true;
                tracing::info!(
                    room_id = %self.game.room_id,
                    conn_id = %conn,
                    player = %key,
                    "seat vacated"
                );
            }
        }

        if vacated {
            self.members.broadcast(ServerEvent::state(&self.game));
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// The match starts fresh under `room_id`.
pub(crate) fn spawn_room(room_id: RoomCode, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));

    let actor = RoomActor {
        game: Match::new(room_id.clone(), config.starting_prize_cards),
        config,
        members: Members::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
