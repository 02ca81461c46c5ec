//! Methods, payload shapes, and the [`Message`] sum type.
//!
//! On the wire a message is a `method` string plus a `payload` object
//! whose shape depends on the method. Here the pair is one enum variant,
//! and [`Message::from_parts`] / [`Message::to_payload`] are the single,
//! exhaustive mapping between the two representations. Adding a method
//! means adding a [`Method`] variant, and the compiler then points at
//! every match that needs a new arm.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Card, CardColor, PlayerId, ProtocolError, RoomId};

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// The `method` discriminant of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    // -- Client -> server --
    CreateRoom,
    GetRooms,
    JoinRoom,
    LeaveRoom,
    SetReady,
    StartGame,
    PlayCard,
    ChooseColor,
    DrawCard,
    SayUno,
    Ping,

    // -- Both directions --
    LobbyChat,
    GameChat,

    // -- Server -> client --
    Welcome,
    RoomCreatedSuccess,
    RoomsList,
    JoinRoomSuccess,
    LobbyUpdate,
    GameStart,
    GameState,
    HandUpdate,
    GameOver,
    Pong,
    Ok,
    Error,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Method; 25] = [
        Self::CreateRoom,
        Self::GetRooms,
        Self::JoinRoom,
        Self::LeaveRoom,
        Self::SetReady,
        Self::StartGame,
        Self::PlayCard,
        Self::ChooseColor,
        Self::DrawCard,
        Self::SayUno,
        Self::Ping,
        Self::LobbyChat,
        Self::GameChat,
        Self::Welcome,
        Self::RoomCreatedSuccess,
        Self::RoomsList,
        Self::JoinRoomSuccess,
        Self::LobbyUpdate,
        Self::GameStart,
        Self::GameState,
        Self::HandUpdate,
        Self::GameOver,
        Self::Pong,
        Self::Ok,
        Self::Error,
    ];

    /// The SCREAMING_SNAKE_CASE name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateRoom => "CREATE_ROOM",
            Self::GetRooms => "GET_ROOMS",
            Self::JoinRoom => "JOIN_ROOM",
            Self::LeaveRoom => "LEAVE_ROOM",
            Self::SetReady => "SET_READY",
            Self::StartGame => "START_GAME",
            Self::PlayCard => "PLAY_CARD",
            Self::ChooseColor => "CHOOSE_COLOR",
            Self::DrawCard => "DRAW_CARD",
            Self::SayUno => "SAY_UNO",
            Self::Ping => "PING",
            Self::LobbyChat => "LOBBY_CHAT",
            Self::GameChat => "GAME_CHAT",
            Self::Welcome => "WELCOME",
            Self::RoomCreatedSuccess => "ROOM_CREATED_SUCCESS",
            Self::RoomsList => "ROOMS_LIST",
            Self::JoinRoomSuccess => "JOIN_ROOM_SUCCESS",
            Self::LobbyUpdate => "LOBBY_UPDATE",
            Self::GameStart => "GAME_START",
            Self::GameState => "GAME_STATE",
            Self::HandUpdate => "HAND_UPDATE",
            Self::GameOver => "GAME_OVER",
            Self::Pong => "PONG",
            Self::Ok => "OK",
            Self::Error => "ERROR",
        }
    }

    /// Whether a client is allowed to send this method to the server.
    pub fn is_client_method(self) -> bool {
        matches!(
            self,
            Self::CreateRoom
                | Self::GetRooms
                | Self::JoinRoom
                | Self::LeaveRoom
                | Self::SetReady
                | Self::StartGame
                | Self::PlayCard
                | Self::ChooseColor
                | Self::DrawCard
                | Self::SayUno
                | Self::Ping
                | Self::LobbyChat
                | Self::GameChat
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ProtocolError::UnsupportedMethod(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Shared state enums
// ---------------------------------------------------------------------------

/// Lifecycle of a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Waiting,
    InProgress,
    Finished,
}

/// Phase of a game session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    #[default]
    WaitingTurn,
    ChoosingColor,
    Finished,
}

/// Direction the turn travels around the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Kind of chat line. Player chat is `Text`; the server may relay
/// notices as `System`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatKind {
    #[default]
    Text,
    System,
}

// ---------------------------------------------------------------------------
// Payloads: lobby
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub room_name: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Requested capacity; the server default applies when absent.
    #[serde(default)]
    pub max_players: Option<usize>,
    /// Rule flag carried through for clients; it has no server-side effect.
    #[serde(default)]
    pub allow_stuck: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: RoomId,
    pub room_name: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub room_id: RoomId,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomSuccess {
    pub room_id: RoomId,
    pub success: bool,
}

/// One row of a room listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub room_name: String,
    pub has_password: bool,
    pub max_players: usize,
    pub current_players: usize,
    pub status: RoomStatus,
    pub creator_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomsList {
    pub rooms: Vec<RoomInfo>,
}

/// One member as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub is_creator: bool,
    pub is_ready: bool,
}

/// Who is in a room, in join order, and what state the room is in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub players: Vec<PlayerInfo>,
    pub room_status: RoomStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetReadyRequest {
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub player_id: PlayerId,
    pub username: String,
}

/// A chat line. Clients only need to fill in `text`; the server
/// overwrites the sender fields, kind and timestamp before relaying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub sender_id: PlayerId,
    #[serde(default)]
    pub sender_name: String,
    pub text: String,
    #[serde(default)]
    pub kind: ChatKind,
    #[serde(default)]
    pub timestamp: u64,
}

impl ChatMessage {
    /// A chat line attributed to `sender`, timestamped now.
    pub fn stamped(
        sender_id: PlayerId,
        sender_name: impl Into<String>,
        text: impl Into<String>,
        kind: ChatKind,
    ) -> Self {
        Self {
            sender_id,
            sender_name: sender_name.into(),
            text: text.into(),
            kind,
            timestamp: crate::types::now_millis(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads: game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayCardRequest {
    pub card_index: usize,
    /// Required up front for wild cards unless the client prefers to
    /// answer a later `CHOOSE_COLOR` round.
    #[serde(default)]
    pub chosen_color: Option<CardColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChooseColorRequest {
    pub color: CardColor,
}

/// Public view of one player in a game. Only the count of cards is
/// shared; the cards themselves go out privately in `HAND_UPDATE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub name: String,
    pub card_count: usize,
    pub has_declared_uno: bool,
}

/// Everything a client needs to draw the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub room_id: RoomId,
    pub players: BTreeMap<PlayerId, PlayerSummary>,
    pub current_card: Card,
    pub current_player_id: PlayerId,
    pub direction: Direction,
    pub game_phase: GamePhase,
    /// Color in force after a wild card, until the next non-wild play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_color: Option<CardColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandUpdate {
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOver {
    pub winner_id: PlayerId,
    pub winner_name: String,
    pub scores: BTreeMap<PlayerId, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    pub code: String,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A decoded message: the method together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // -- Client -> server --
    CreateRoom(CreateRoomRequest),
    GetRooms,
    JoinRoom(JoinRoomRequest),
    LeaveRoom,
    SetReady(SetReadyRequest),
    StartGame,
    PlayCard(PlayCardRequest),
    ChooseColor(ChooseColorRequest),
    DrawCard,
    SayUno,
    Ping,

    // -- Both directions --
    LobbyChat(ChatMessage),
    GameChat(ChatMessage),

    // -- Server -> client --
    Welcome(Welcome),
    RoomCreated(RoomCreated),
    RoomsList(RoomsList),
    JoinRoomSuccess(JoinRoomSuccess),
    LobbyUpdate(LobbySnapshot),
    GameStart(GameSnapshot),
    GameState(GameSnapshot),
    HandUpdate(HandUpdate),
    GameOver(GameOver),
    Pong,
    Ok,
    Error(ErrorPayload),
}

impl Message {
    /// Shorthand for an `ERROR` message.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
            code: code.into(),
        })
    }

    pub fn method(&self) -> Method {
        match self {
            Self::CreateRoom(_) => Method::CreateRoom,
            Self::GetRooms => Method::GetRooms,
            Self::JoinRoom(_) => Method::JoinRoom,
            Self::LeaveRoom => Method::LeaveRoom,
            Self::SetReady(_) => Method::SetReady,
            Self::StartGame => Method::StartGame,
            Self::PlayCard(_) => Method::PlayCard,
            Self::ChooseColor(_) => Method::ChooseColor,
            Self::DrawCard => Method::DrawCard,
            Self::SayUno => Method::SayUno,
            Self::Ping => Method::Ping,
            Self::LobbyChat(_) => Method::LobbyChat,
            Self::GameChat(_) => Method::GameChat,
            Self::Welcome(_) => Method::Welcome,
            Self::RoomCreated(_) => Method::RoomCreatedSuccess,
            Self::RoomsList(_) => Method::RoomsList,
            Self::JoinRoomSuccess(_) => Method::JoinRoomSuccess,
            Self::LobbyUpdate(_) => Method::LobbyUpdate,
            Self::GameStart(_) => Method::GameStart,
            Self::GameState(_) => Method::GameState,
            Self::HandUpdate(_) => Method::HandUpdate,
            Self::GameOver(_) => Method::GameOver,
            Self::Pong => Method::Pong,
            Self::Ok => Method::Ok,
            Self::Error(_) => Method::Error,
        }
    }

    /// Decodes `payload` into the shape `method` calls for.
    ///
    /// Parameterless methods ignore whatever payload came with them.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidPayload`] if the payload is missing or
    /// doesn't match the method's schema.
    pub fn from_parts(
        method: Method,
        payload: serde_json::Value,
    ) -> Result<Self, ProtocolError> {
        let message = match method {
            Method::CreateRoom => Self::CreateRoom(decode(method, payload)?),
            Method::GetRooms => Self::GetRooms,
            Method::JoinRoom => Self::JoinRoom(decode(method, payload)?),
            Method::LeaveRoom => Self::LeaveRoom,
            Method::SetReady => Self::SetReady(decode(method, payload)?),
            Method::StartGame => Self::StartGame,
            Method::PlayCard => Self::PlayCard(decode(method, payload)?),
            Method::ChooseColor => Self::ChooseColor(decode(method, payload)?),
            Method::DrawCard => Self::DrawCard,
            Method::SayUno => Self::SayUno,
            Method::Ping => Self::Ping,
            Method::LobbyChat => Self::LobbyChat(decode(method, payload)?),
            Method::GameChat => Self::GameChat(decode(method, payload)?),
            Method::Welcome => Self::Welcome(decode(method, payload)?),
            Method::RoomCreatedSuccess => {
                Self::RoomCreated(decode(method, payload)?)
            }
            Method::RoomsList => Self::RoomsList(decode(method, payload)?),
            Method::JoinRoomSuccess => {
                Self::JoinRoomSuccess(decode(method, payload)?)
            }
            Method::LobbyUpdate => Self::LobbyUpdate(decode(method, payload)?),
            Method::GameStart => Self::GameStart(decode(method, payload)?),
            Method::GameState => Self::GameState(decode(method, payload)?),
            Method::HandUpdate => Self::HandUpdate(decode(method, payload)?),
            Method::GameOver => Self::GameOver(decode(method, payload)?),
            Method::Pong => Self::Pong,
            Method::Ok => Self::Ok,
            Method::Error => Self::Error(decode(method, payload)?),
        };
        Ok(message)
    }

    /// Encodes the payload half of the message. Parameterless messages
    /// produce an empty object.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if serialization fails.
    pub fn to_payload(&self) -> Result<serde_json::Value, ProtocolError> {
        match self {
            Self::CreateRoom(p) => encode(p),
            Self::JoinRoom(p) => encode(p),
            Self::SetReady(p) => encode(p),
            Self::PlayCard(p) => encode(p),
            Self::ChooseColor(p) => encode(p),
            Self::LobbyChat(p) | Self::GameChat(p) => encode(p),
            Self::Welcome(p) => encode(p),
            Self::RoomCreated(p) => encode(p),
            Self::RoomsList(p) => encode(p),
            Self::JoinRoomSuccess(p) => encode(p),
            Self::LobbyUpdate(p) => encode(p),
            Self::GameStart(p) | Self::GameState(p) => encode(p),
            Self::HandUpdate(p) => encode(p),
            Self::GameOver(p) => encode(p),
            Self::Error(p) => encode(p),
            Self::GetRooms
            | Self::LeaveRoom
            | Self::StartGame
            | Self::DrawCard
            | Self::SayUno
            | Self::Ping
            | Self::Pong
            | Self::Ok => Ok(serde_json::Value::Object(serde_json::Map::new())),
        }
    }
}

fn decode<T: DeserializeOwned>(
    method: Method,
    payload: serde_json::Value,
) -> Result<T, ProtocolError> {
    if payload.is_null() {
        return Err(ProtocolError::InvalidPayload {
            method: method.as_str(),
            reason: "missing payload".into(),
        });
    }
    serde_json::from_value(payload).map_err(|e| ProtocolError::InvalidPayload {
        method: method.as_str(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(payload: &T) -> Result<serde_json::Value, ProtocolError> {
    serde_json::to_value(payload).map_err(ProtocolError::Encode)
}

// =========================================================================
// Tests
// =========================================================================
