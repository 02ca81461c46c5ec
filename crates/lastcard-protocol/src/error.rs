//! Error types for the protocol layer.
//!
//! Every variant maps to a stable machine-readable code via
//! [`ProtocolError::code`], which is what clients see in an `ERROR`
//! message.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The line was not a well-formed envelope: bad JSON, a missing
    /// `id`/`method`, or an unknown protocol version.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The `method` string does not name any known method, or names one
    /// the receiving side does not accept.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The method is known but its payload has the wrong shape.
    #[error("invalid payload for {method}: {reason}")]
    InvalidPayload {
        /// Wire name of the method whose payload was rejected.
        method: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl ProtocolError {
    /// Machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "INTERNAL_ERROR",
            Self::Decode(_) => "PARSE_ERROR",
            Self::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            Self::InvalidPayload { .. } => "INVALID_PAYLOAD",
        }
    }
}
