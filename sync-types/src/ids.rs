//! Identity types for stellar-sync.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RoomCodeError;

/// A unique identifier for one installation of the app.
///
/// Generated from 16 random bytes and displayed as URL-safe base64. Stored as
/// a string so ids written by other clients round-trip untouched.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new random DeviceId.
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.0.chars().take(8).collect();
        write!(f, "DeviceId({})", short)
    }
}

/// The human-typable name of a room.
///
/// Codes are case-insensitive: every constructor trims surrounding
/// whitespace and upper-cases, so `star-7x9k` and `STAR-7X9K` name the same
/// room document.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Longest accepted code.
    pub const MAX_LEN: usize = 64;

    /// Normalize and validate a room code.
    pub fn parse(code: &str) -> Result<Self, RoomCodeError> {
        let normalized = code.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(RoomCodeError::Empty);
        }
        if normalized.len() > Self::MAX_LEN {
            return Err(RoomCodeError::TooLong {
                len: normalized.len(),
                limit: Self::MAX_LEN,
            });
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(RoomCodeError::InvalidCharacter(bad));
        }

        Ok(Self(normalized))
    }

    /// Get the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomCode {
    type Err = RoomCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = RoomCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomCode({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_random_is_unique() {
        let a = DeviceId::random();
        let b = DeviceId::random();
        assert_ne!(a, b);
    }

    #[test]
    fn device_id_base64_display() {
        let id = DeviceId::random();
        assert_eq!(id.to_string().len(), 22); // 16 bytes = 22 base64 chars (no padding)
    }

    #[test]
    fn device_id_debug_is_shortened() {
        let id = DeviceId::new("abcdefghijklmnop");
        assert_eq!(format!("{:?}", id), "DeviceId(abcdefgh)");

        let short = DeviceId::new("abc");
        assert_eq!(format!("{:?}", short), "DeviceId(abc)");
    }

    #[test]
    fn device_id_serializes_as_plain_string() {
        let id = DeviceId::new("device-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"device-1\"");
    }

    #[test]
    fn room_code_normalizes_case_and_whitespace() {
        let code = RoomCode::parse("  star-7x9k ").unwrap();
        assert_eq!(code.as_str(), "STAR-7X9K");
        assert_eq!(code, RoomCode::parse("STAR-7X9K").unwrap());
    }

    #[test]
    fn room_code_rejects_empty() {
        assert_eq!(RoomCode::parse("   "), Err(RoomCodeError::Empty));
    }

    #[test]
    fn room_code_rejects_invalid_characters() {
        assert_eq!(
            RoomCode::parse("STAR 7X9K"),
            Err(RoomCodeError::InvalidCharacter(' '))
        );
        assert_eq!(
            RoomCode::parse("room/1"),
            Err(RoomCodeError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn room_code_rejects_overlong() {
        let long = "A".repeat(RoomCode::MAX_LEN + 1);
        assert!(matches!(
            RoomCode::parse(&long),
            Err(RoomCodeError::TooLong { .. })
        ));
    }

    #[test]
    fn room_code_deserialization_normalizes() {
        let code: RoomCode = serde_json::from_str("\"nova-ab12\"").unwrap();
        assert_eq!(code.as_str(), "NOVA-AB12");

        let bad: Result<RoomCode, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
