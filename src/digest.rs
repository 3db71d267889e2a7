//! One-way digests of secrets.
//!
//! Records are keyed by the SHA-512 of the password, rendered as 128 lowercase
//! hex characters. Lookups accept either case.
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha512};

/// Length of a hex-encoded SHA-512 digest.
pub const DIGEST_HEX_LEN: usize = 128;

static SHA512_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Fa-f0-9]{128}$").expect("static pattern"));

/// SHA-512 of the UTF-8 encoding of `secret`, as lowercase hex.
pub fn digest(secret: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `candidate` looks like a hex-encoded SHA-512 digest.
pub fn is_sha512_hex(candidate: &str) -> bool {
    SHA512_HEX.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_has_known_digest() {
        assert_eq!(
            digest(""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn digest_is_deterministic_and_fixed_length() {
        let long = "x".repeat(10_000);
        for input in ["", "hunter2", "pässwörd", long.as_str()] {
            let a = digest(input);
            assert_eq!(a, digest(input));
            assert_eq!(a.len(), DIGEST_HEX_LEN);
            assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
        assert_ne!(digest("hunter2"), digest("hunter3"));
    }

    #[test]
    fn validates_digest_shape() {
        let d = digest("password");
        assert!(is_sha512_hex(&d));
        assert!(is_sha512_hex(&d.to_uppercase()));
        assert!(!is_sha512_hex(&d[1..]));
        assert!(!is_sha512_hex(&format!("{d}0")));
        assert!(!is_sha512_hex(&d.replace('a', "g")));
        assert!(!is_sha512_hex(""));
    }
}
