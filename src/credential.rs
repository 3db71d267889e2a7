//! Credential data model: the outcome of classifying one dump line and the
//! record persisted for each recovered pair.
//!
//! Dump lines are arbitrary bytes. [`decode_lossy`] maps every byte to the
//! code point of the same value (Latin-1), so decoding never fails. Bytes of
//! a multi-byte UTF-8 sequence come out as separate Latin-1 characters; the
//! stored text is therefore not the "true" characters for non-ASCII input,
//! only a deterministic rendition of the raw bytes.
use crate::digest::digest;

/// Result of classifying a single raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialCandidate {
    /// An account identifier and its secret. The secret may be empty.
    Pair { identifier: Vec<u8>, secret: Vec<u8> },
    /// The line matched no heuristic.
    Invalid,
}

impl CredentialCandidate {
    pub fn pair(identifier: impl Into<Vec<u8>>, secret: impl Into<Vec<u8>>) -> Self {
        Self::Pair {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Pair { .. })
    }
}

/// A row ready to be handed to a store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PersistableRecord {
    pub account: String,
    pub password: String,
    pub password_digest: String,
}

impl PersistableRecord {
    /// Decode both fields and compute the password digest.
    pub fn from_pair(identifier: &[u8], secret: &[u8]) -> Self {
        let account = decode_lossy(identifier);
        let password = decode_lossy(secret);
        let password_digest = digest(&password);
        Self {
            account,
            password,
            password_digest,
        }
    }
}

/// Map each byte to the `char` with the same scalar value.
pub fn decode_lossy(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_byte_value() {
        let all: Vec<u8> = (0..=255u8).collect();
        let s = decode_lossy(&all);
        assert_eq!(s.chars().count(), 256);
        for (i, c) in s.chars().enumerate() {
            assert_eq!(c as u32, i as u32);
        }
    }

    #[test]
    fn utf8_input_is_not_reassembled() {
        // "é" in UTF-8 is two bytes and decodes to two Latin-1 characters
        assert_eq!(decode_lossy("é".as_bytes()), "\u{c3}\u{a9}");
    }

    #[test]
    fn record_digest_matches_decoded_password() {
        let r = PersistableRecord::from_pair(b"alice@example.com", b"hunter2");
        assert_eq!(r.account, "alice@example.com");
        assert_eq!(r.password, "hunter2");
        assert_eq!(r.password_digest, digest("hunter2"));
    }

    #[test]
    fn invalid_is_not_valid() {
        assert!(!CredentialCandidate::Invalid.is_valid());
        assert!(CredentialCandidate::pair("a", "").is_valid());
    }
}
