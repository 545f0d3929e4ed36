//! Error types for stellar-sync data types.

use thiserror::Error;

/// A room code failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCodeError {
    /// Nothing left after trimming whitespace.
    #[error("room code is empty")]
    Empty,

    /// Only ASCII letters, digits and `-` are allowed.
    #[error("room code contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// Longer than [`crate::RoomCode::MAX_LEN`].
    #[error("room code is too long ({len} characters, limit {limit})")]
    TooLong {
        /// Length of the rejected code.
        len: usize,
        /// Maximum accepted length.
        limit: usize,
    },
}

/// A string did not name a record collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record kind: {0}")]
pub struct UnknownRecordKind(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RoomCodeError::InvalidCharacter('!');
        assert_eq!(err.to_string(), "room code contains invalid character '!'");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RoomCodeError>();
        assert_send_sync::<UnknownRecordKind>();
    }
}
