//! Room code generation.
//!
//! Codes look like `STAR-7X9K`: a short word prefix and a 4-character
//! suffix drawn from an alphabet without visually confusable characters.

use stellar_sync_types::RoomCode;

/// Suffix alphabet. Excludes `0`, `O`, `1`, `I` and `L`.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Word prefixes.
pub const ROOM_CODE_WORDS: &[&str] = &[
    "STAR", "MOON", "NOVA", "COMET", "ORBIT", "LUNA", "VEGA", "ORION", "ASTRO", "SOLAR",
];

const SUFFIX_LEN: usize = 4;

/// Generate a random room code.
pub fn generate_room_code() -> RoomCode {
    let word = ROOM_CODE_WORDS[random_below(ROOM_CODE_WORDS.len())];
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ROOM_CODE_ALPHABET[random_below(ROOM_CODE_ALPHABET.len())] as char)
        .collect();

    RoomCode::parse(&format!("{}-{}", word, suffix))
        .expect("generated room codes use only valid characters")
}

/// Uniform random index in `0..bound`.
fn random_below(bound: usize) -> usize {
    // Rejection sampling keeps the distribution uniform for any bound.
    let bound = bound as u32;
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let mut bytes = [0u8; 4];
        getrandom::getrandom(&mut bytes).expect("getrandom failed");
        let value = u32::from_le_bytes(bytes);
        if value < zone {
            return (value % bound) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_code_has_word_and_suffix() {
        let code = generate_room_code();
        let (word, suffix) = code.as_str().split_once('-').unwrap();

        assert!(ROOM_CODE_WORDS.contains(&word));
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn alphabet_excludes_confusable_characters() {
        for c in [b'0', b'O', b'1', b'I', b'L'] {
            assert!(!ROOM_CODE_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn generated_codes_vary() {
        let codes: HashSet<String> = (0..50)
            .map(|_| generate_room_code().as_str().to_string())
            .collect();
        // 10 words * 31^4 suffixes; 50 draws colliding down to a handful is
        // effectively impossible.
        assert!(codes.len() > 40);
    }

    #[test]
    fn random_below_stays_in_range() {
        for _ in 0..1000 {
            assert!(random_below(7) < 7);
        }
    }
}
