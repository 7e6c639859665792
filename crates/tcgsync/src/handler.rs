//! Per-connection handler: frame decoding, event routing and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a pump task that owns the sending side. The flow is:
//!   1. Receive a frame → decode it through the dispatch table
//!   2. Route the event: join a room, queue a mutation, or answer directly
//!   3. On close or error → leave every joined room
//!
//! Everything sent to the client, replies and room broadcasts alike, goes
//! through one queue drained by the pump, so the client sees events in the
//! order they were produced.

use std::sync::Arc;

use tcgsync_protocol::{ClientEvent, Codec, Frame, JoinGame, ServerEvent};
use tcgsync_room::{MemberSender, Mutation};
use tcgsync_state::RoomCode;
use tcgsync_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::sound::sound_url;
use crate::TcgsyncError;

/// Display name given to a joiner that did not send one.
pub(crate) const DEFAULT_DISPLAY_NAME: &str = "Player";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), TcgsyncError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    match conn.peer_addr() {
        Some(peer) => tracing::info!(%conn_id, %peer, "client connected"),
        None => tracing::info!(%conn_id, "client connected"),
    }

    let (outbound, inbox) = mpsc::unbounded_channel();
    let pump = tokio::spawn(pump(Arc::clone(&conn), Arc::clone(&state), inbox));

    let result = serve(&conn, &state, &outbound).await;

    disconnect(conn_id, &state).await;
    pump.abort();
    let _ = conn.close().await;
    result
}

/// Reads frames until the client goes away.
async fn serve<C: Codec>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<C>>,
    outbound: &MemberSender,
) -> Result<(), TcgsyncError> {
    let conn_id = conn.id();

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) if e.is_disconnect() => {
                tracing::info!(%conn_id, error = %e, "connection dropped");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = handle_frame(conn_id, state, outbound, &data).await {
            tracing::debug!(%conn_id, error = %e, "request failed");
            send_error(outbound, e.code(), &e.to_string());
        }
    }
}

/// Drains the connection's outbound queue into the socket, in order.
async fn pump<C: Codec>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C>>,
    mut inbox: mpsc::UnboundedReceiver<Arc<ServerEvent>>,
) {
    let conn_id = conn.id();
    while let Some(event) = inbox.recv().await {
        let bytes = match state.codec.encode(&*event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping pump");
            break;
        }
    }
}

/// Decodes one frame and routes it.
async fn handle_frame<C: Codec>(
    conn_id: ConnectionId,
    state: &Arc<ServerState<C>>,
    outbound: &MemberSender,
    data: &[u8],
) -> Result<(), TcgsyncError> {
    let frame: Frame = state.codec.decode(data)?;
    let event = ClientEvent::from_frame(frame)?;
    tracing::debug!(%conn_id, event = event.name(), "event received");

    match event {
        ClientEvent::JoinGame(join) => {
            join_game(conn_id, state, outbound, join).await
        }
        ClientEvent::GetVictorySound => {
            victory_sound(state, outbound);
            Ok(())
        }
        ClientEvent::UpdatePokemon(e) => {
            let mutation = Mutation::ReplaceUnit {
                player: e.player,
                slot: e.slot_locator,
                patch: e.pokemon,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::ApplyDamage(e) => {
            let mutation = Mutation::ApplyDamage {
                player: e.player,
                slot: e.slot_locator,
                damage: e.damage,
                attacker: e.attacking_player,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::HealPokemon(e) => {
            let mutation = Mutation::Heal {
                player: e.player,
                slot: e.slot_locator,
                amount: e.heal,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::UpdateDamageCounters(e) => {
            let mutation = Mutation::SetDamageCounters {
                player: e.player,
                slot: e.slot_locator,
                value: e.counters,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::AddStatus(e) => {
            let mutation = Mutation::AddStatus {
                player: e.player,
                slot: e.slot_locator,
                status: e.status,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::RemoveStatus(e) => {
            let mutation = Mutation::RemoveStatus {
                player: e.player,
                slot: e.slot_locator,
                status: e.status,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::UpdatePrizeCards(e) => {
            let mutation = Mutation::SetPrizeCards {
                player: e.player,
                prize_cards: e.prize_cards,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::SwapPokemon(e) => {
            let mutation = Mutation::SwapActiveBench {
                player: e.player,
                bench_index: e.bench_index,
            };
            mutate(conn_id, state, outbound, e.room_id, mutation).await
        }
        ClientEvent::ResetGame(e) => {
            mutate(conn_id, state, outbound, e.room_id, Mutation::Reset).await
        }
    }
}

/// Joins (creating if needed) the requested room and records the
/// membership for disconnect cleanup.
async fn join_game<C: Codec>(
    conn_id: ConnectionId,
    state: &Arc<ServerState<C>>,
    outbound: &MemberSender,
    join: JoinGame,
) -> Result<(), TcgsyncError> {
    // Lock only for the map work, drop before talking to the room.
    let room = {
        let mut rooms = state.rooms.lock().await;
        let code = rooms.normalize(join.room_id.as_deref());
        rooms.get_or_create(code)?
    };

    let name = join
        .player_name
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
    let seat = room.join(conn_id, name, outbound.clone()).await?;

    state
        .rooms
        .lock()
        .await
        .record_join(conn_id, room.room_id().clone(), seat);
    tracing::info!(
        %conn_id,
        room_id = %room.room_id(),
        player = ?seat,
        "joined room"
    );
    Ok(())
}

/// Queues a mutation on an existing room. Unknown rooms are ignored.
async fn mutate<C: Codec>(
    conn_id: ConnectionId,
    state: &Arc<ServerState<C>>,
    outbound: &MemberSender,
    room_id: RoomCode,
    mutation: Mutation,
) -> Result<(), TcgsyncError> {
    let Some(room) = state.rooms.lock().await.resolve(&room_id) else {
        tracing::debug!(
            %conn_id,
            %room_id,
            mutation = mutation.kind(),
            "unknown room, ignoring"
        );
        return Ok(());
    };
    room.mutate(conn_id, mutation, outbound.clone()).await?;
    Ok(())
}

/// Answers `get_victory_sound` to the requester only.
fn victory_sound<C: Codec>(state: &ServerState<C>, outbound: &MemberSender) {
    let sound_file = state.sounds.pick();
    let sound_url = sound_file
        .as_deref()
        .map(|file| sound_url(&state.sound_url_prefix, file));
    let _ = outbound.send(Arc::new(ServerEvent::VictorySound {
        sound_file,
        sound_url,
    }));
}

/// Leaves every room this connection joined.
async fn disconnect<C: Codec>(conn_id: ConnectionId, state: &ServerState<C>) {
    let rooms = {
        let mut registry = state.rooms.lock().await;
        registry
            .take_memberships(conn_id)
            .into_iter()
            .filter_map(|m| registry.resolve(&m.room))
            .collect::<Vec<_>>()
    };

    for room in rooms {
        if let Err(e) = room.leave(conn_id).await {
            tracing::debug!(
                %conn_id,
                room_id = %room.room_id(),
                error = %e,
                "leave failed"
            );
        }
    }
}

/// Queues an `error` event to the client.
fn send_error(outbound: &MemberSender, code: u16, message: &str) {
    let _ = outbound.send(Arc::new(ServerEvent::Error {
        code,
        message: message.to_string(),
    }));
}
