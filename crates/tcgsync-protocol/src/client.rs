//! Inbound events: payload types and the dispatch table.
//!
//! Decoding happens in two steps. The bytes become a [`Frame`], then the
//! frame's event name selects a [`Decoder`] from [`EVENT_TABLE`], which
//! turns the untyped `data` into a [`ClientEvent`]. Adding an event means
//! adding a payload type, a variant and one table row.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tcgsync_state::{PlayerKey, RoomCode, Slot, UnitPatch};

use crate::{Frame, ProtocolError, coerce};

/// `join_game`: enter a room, creating it if needed.
///
/// An absent or empty `roomId` asks the server to generate a fresh code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGame {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub player_name: Option<String>,
}

/// `update_pokemon`: merge a partial unit into one slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePokemon {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    pub slot_locator: Slot,
    pub pokemon: UnitPatch,
}

/// `apply_damage`: subtract hit points, then check for knockouts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDamage {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    pub slot_locator: Slot,
    #[serde(deserialize_with = "coerce::int")]
    pub damage: i64,
    #[serde(default)]
    pub attacking_player: Option<PlayerKey>,
}

/// `heal_pokemon`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealPokemon {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    pub slot_locator: Slot,
    #[serde(deserialize_with = "coerce::int")]
    pub heal: i64,
}

/// `update_damage_counters`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDamageCounters {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    pub slot_locator: Slot,
    #[serde(deserialize_with = "coerce::int")]
    pub counters: i64,
}

/// Shared payload of `add_status` and `remove_status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    pub slot_locator: Slot,
    pub status: String,
}

/// `update_prize_cards`: overwrite a prize count, then check for victory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrizeCards {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    #[serde(deserialize_with = "coerce::int")]
    pub prize_cards: i64,
}

/// `swap_pokemon`: exchange the active unit with one bench slot.
///
/// The index is kept signed so a negative value reaches the range check
/// and is reported as out of range rather than as a type error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPokemon {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
    pub player: PlayerKey,
    #[serde(deserialize_with = "coerce::int")]
    pub bench_index: i64,
}

/// `reset_game`: start the room's match over.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetGame {
    #[serde(deserialize_with = "coerce::room_code")]
    pub room_id: RoomCode,
}

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    JoinGame(JoinGame),
    UpdatePokemon(UpdatePokemon),
    ApplyDamage(ApplyDamage),
    HealPokemon(HealPokemon),
    UpdateDamageCounters(UpdateDamageCounters),
    AddStatus(StatusChange),
    RemoveStatus(StatusChange),
    UpdatePrizeCards(UpdatePrizeCards),
    SwapPokemon(SwapPokemon),
    ResetGame(ResetGame),
    GetVictorySound,
}

/// Uniform signature of every row in [`EVENT_TABLE`].
pub type Decoder = fn(Value) -> Result<ClientEvent, serde_json::Error>;

/// Event name to payload decoder, one row per inbound event.
pub static EVENT_TABLE: &[(&str, Decoder)] = &[
    ("join_game", decode_join_game),
    ("update_pokemon", decode_update_pokemon),
    ("apply_damage", decode_apply_damage),
    ("heal_pokemon", decode_heal_pokemon),
    ("update_damage_counters", decode_update_damage_counters),
    ("add_status", decode_add_status),
    ("remove_status", decode_remove_status),
    ("update_prize_cards", decode_update_prize_cards),
    ("swap_pokemon", decode_swap_pokemon),
    ("reset_game", decode_reset_game),
    ("get_victory_sound", decode_get_victory_sound),
];

impl ClientEvent {
    /// Interprets a frame's payload according to its event name.
    ///
    /// # Errors
    /// `UnknownEvent` if no table row matches the name, `InvalidPayload`
    /// if the row's decoder rejects `data`.
    pub fn from_frame(frame: Frame) -> Result<Self, ProtocolError> {
        let Frame { event, data } = frame;
        let Some(decode) = lookup(&event) else {
            return Err(ProtocolError::UnknownEvent(event));
        };
        decode(data)
            .map_err(|source| ProtocolError::InvalidPayload { event, source })
    }

    /// The wire name this event arrived under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinGame(_) => "join_game",
            Self::UpdatePokemon(_) => "update_pokemon",
            Self::ApplyDamage(_) => "apply_damage",
            Self::HealPokemon(_) => "heal_pokemon",
            Self::UpdateDamageCounters(_) => "update_damage_counters",
            Self::AddStatus(_) => "add_status",
            Self::RemoveStatus(_) => "remove_status",
            Self::UpdatePrizeCards(_) => "update_prize_cards",
            Self::SwapPokemon(_) => "swap_pokemon",
            Self::ResetGame(_) => "reset_game",
            Self::GetVictorySound => "get_victory_sound",
        }
    }
}

fn lookup(event: &str) -> Option<Decoder> {
    EVENT_TABLE
        .iter()
        .find(|(name, _)| *name == event)
        .map(|(_, decode)| *decode)
}

/// Deserialises a payload, reading `null` as an empty object so events
/// whose fields are all optional may omit `data`.
fn payload<T: DeserializeOwned>(data: Value) -> Result<T, serde_json::Error> {
    let data = match data {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(data)
}

fn decode_join_game(data: Value) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::JoinGame)
}

fn decode_update_pokemon(
    data: Value,
) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::UpdatePokemon)
}

fn decode_apply_damage(data: Value) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::ApplyDamage)
}

fn decode_heal_pokemon(data: Value) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::HealPokemon)
}

fn decode_update_damage_counters(
    data: Value,
) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::UpdateDamageCounters)
}

fn decode_add_status(data: Value) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::AddStatus)
}

fn decode_remove_status(
    data: Value,
) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::RemoveStatus)
}

fn decode_update_prize_cards(
    data: Value,
) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::UpdatePrizeCards)
}

fn decode_swap_pokemon(data: Value) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::SwapPokemon)
}

fn decode_reset_game(data: Value) -> Result<ClientEvent, serde_json::Error> {
    payload(data).map(ClientEvent::ResetGame)
}

fn decode_get_victory_sound(
    _data: Value,
) -> Result<ClientEvent, serde_json::Error> {
    Ok(ClientEvent::GetVictorySound)
}
