//! Strong type definitions for blobgate.
//!
//! All identifiers are fixed-length byte newtypes that travel as lowercase
//! hex strings on the wire. Parsing is the only way to turn an untrusted
//! string into one of these types, so anything holding a [`ContentHash`]
//! is safe to use as a storage key.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Decode exactly `N` bytes from a lowercase hex string.
fn decode_fixed_hex<const N: usize>(s: &str, what: &'static str) -> Result<[u8; N], CoreError> {
    if s.len() != N * 2 {
        return Err(CoreError::InvalidHex {
            what,
            reason: format!("expected {} hex characters, got {}", N * 2, s.len()),
        });
    }
    if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(CoreError::InvalidHex {
            what,
            reason: "must be lowercase hexadecimal".into(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|e| CoreError::InvalidHex {
        what,
        reason: e.to_string(),
    })?;
    Ok(out)
}

macro_rules! hex_newtype {
    ($(#[$meta:meta])* $name:ident, $len:expr, $what:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Length in bytes.
            pub const LEN: usize = $len;

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Convert to lowercase hex string.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Parse from a lowercase hex string of exactly the right length.
            pub fn from_hex(s: &str) -> Result<Self, CoreError> {
                decode_fixed_hex::<$len>(s, $what).map(Self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(de::Error::custom)
            }
        }
    };
}

hex_newtype!(
    /// A 32-byte public key identifying an event author or requester.
    PublicKey,
    32,
    "public key"
);

hex_newtype!(
    /// A 32-byte event identifier: SHA-256 of the canonical event serialization.
    EventId,
    32,
    "event id"
);

hex_newtype!(
    /// A 32-byte SHA-256 digest of blob bytes; the key into the blob store.
    ContentHash,
    32,
    "content hash"
);

hex_newtype!(
    /// A 64-byte event signature. Carried through untouched; verification
    /// happens before events reach this layer.
    Signature,
    64,
    "signature"
);

impl ContentHash {
    /// Compute the content hash of the given bytes.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Validate an untrusted hash string before it is used as a storage key.
    ///
    /// Only 64 lowercase hex characters are accepted, which rules out path
    /// separators and relative components.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::from_hex(s)
    }
}

impl EventId {
    /// The zero event ID (used as a sentinel before the id is computed).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl Signature {
    /// The zero signature (placeholder for unsigned events).
    pub const ZERO: Self = Self([0u8; 64]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = PublicKey::from_bytes([0x42; 32]);
        let recovered = PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
    }

    #[test]
    fn test_content_hash_digest_known_value() {
        let hash = ContentHash::digest(b"");
        assert_eq!(
            hash.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_content_hash_rejects_traversal() {
        assert!(ContentHash::parse("../../etc/passwd").is_err());
        let mut sneaky = "a".repeat(62);
        sneaky.push_str("/.");
        assert!(ContentHash::parse(&sneaky).is_err());
    }

    #[test]
    fn test_content_hash_rejects_uppercase_and_short() {
        assert!(ContentHash::parse(&"A".repeat(64)).is_err());
        assert!(ContentHash::parse("abc123").is_err());
        assert!(ContentHash::parse(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_display_is_full_hex_debug_is_short() {
        let id = EventId::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", id), "ab".repeat(32));
        assert_eq!(format!("{:?}", id), "EventId(abababababababab)");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let pk = PublicKey::from_bytes([0x01; 32]);
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
        assert!(serde_json::from_str::<PublicKey>("\"pk1\"").is_err());
    }
}
