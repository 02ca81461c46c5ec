//! Player identities for Lastcard.
//!
//! This crate answers "who is on the other end of this connection?":
//!
//! 1. **Identity assignment**: the first message on an unseen connection
//!    mints a new [`Player`] with a sequential id and a generated name.
//! 2. **Binding**: each live connection maps to exactly one player, and
//!    each player back to its connection, so broadcasts can find them.
//! 3. **Cleanup**: on disconnect the binding and the player are purged.
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)      <- resolves the caller, records room membership
//!     |
//! Players (this crate)
//!     |
//! Protocol/Transport  <- PlayerId, RoomId, ConnectionId
//! ```

mod directory;
mod error;
mod player;

pub use directory::PlayerDirectory;
pub use error::PlayerError;
pub use player::Player;
