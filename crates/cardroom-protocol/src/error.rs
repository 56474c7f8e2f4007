//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    /// Covers malformed JSON, missing fields, and unknown command tags.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room name failed validation (empty, too long, or containing
    /// characters outside `[A-Za-z0-9_-]`).
    #[error("invalid room name: {0:?}")]
    InvalidRoomName(String),

    /// The message is valid JSON but violates protocol rules, e.g. a
    /// connection whose first frame is not a join.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
