//! Wire protocol for Lastcard.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Envelope`], [`PlayerId`], [`RoomId`]): what wraps
//!   every message on the wire.
//! - **Cards** ([`Card`], [`CardColor`], [`CardKind`]): the card values
//!   that appear in snapshots and hands.
//! - **Messages** ([`Method`], [`Message`] and the payload structs): the
//!   method discriminant and the payload shape each method carries.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, bytes out.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections, rooms or rules.
//! It only turns lines into typed messages and back.
//!
//! ```text
//! Transport (lines) -> Protocol (Envelope) -> Router (rooms, games)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod cards;
mod codec;
mod error;
mod messages;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use cards::{Card, CardColor, CardKind};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use messages::{
    ChatKind, ChatMessage, ChooseColorRequest, CreateRoomRequest, Direction,
    ErrorPayload, GameOver, GamePhase, GameSnapshot, HandUpdate, JoinRoomRequest,
    JoinRoomSuccess, LobbySnapshot, Message, Method, PlayCardRequest, PlayerInfo,
    PlayerSummary, RoomCreated, RoomInfo, RoomStatus, RoomsList, SetReadyRequest,
    Welcome,
};
pub use types::{Envelope, PlayerId, ProtocolVersion, RoomId, WireEnvelope};
