use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of bytes in an [`ObjectId`].
pub const OBJECT_ID_LEN: usize = 20;

/// Content-addressed identifier for any revision object.
///
/// An `ObjectId` is the BLAKE3 hash of an object's canonical encoding,
/// truncated to 20 bytes (the width fixed by the wire format). Identical
/// content always produces the same `ObjectId`, making objects
/// deduplicatable and verifiable. Never mutated once computed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Compute an `ObjectId` by hashing raw bytes.
    pub fn hash_of(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        let mut id = [0u8; OBJECT_ID_LEN];
        id.copy_from_slice(&hash.as_bytes()[..OBJECT_ID_LEN]);
        Self(id)
    }

    /// Create an `ObjectId` from pre-computed hash bytes.
    pub const fn from_raw(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const NULL: Self = Self([0u8; OBJECT_ID_LEN]);

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; OBJECT_ID_LEN]
    }

    /// The raw 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != OBJECT_ID_LEN {
            return Err(TypeError::InvalidLength {
                expected: OBJECT_ID_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; OBJECT_ID_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_of_is_deterministic() {
        let data = b"hello world";
        let id1 = ObjectId::hash_of(data);
        let id2 = ObjectId::hash_of(data);
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_data_produces_different_ids() {
        let id1 = ObjectId::hash_of(b"hello");
        let id2 = ObjectId::hash_of(b"world");
        assert_ne!(id1, id2);
    }

    #[test]
    fn null_is_all_zeros() {
        assert!(ObjectId::NULL.is_null());
        assert_eq!(ObjectId::NULL.as_bytes(), &[0u8; OBJECT_ID_LEN]);
        assert!(!ObjectId::hash_of(b"x").is_null());
    }

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::hash_of(b"test");
        let parsed = ObjectId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert!(matches!(err, TypeError::InvalidLength { .. }));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let err = ObjectId::from_hex("zz").unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn display_is_full_hex() {
        let id = ObjectId::hash_of(b"test");
        let display = format!("{id}");
        assert_eq!(display.len(), 40);
        assert_eq!(display, id.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        let id = ObjectId::hash_of(b"test");
        assert_eq!(id.short_hex().len(), 8);
    }

    #[test]
    fn ordering_is_byte_order() {
        let id1 = ObjectId::from_raw([0; OBJECT_ID_LEN]);
        let id2 = ObjectId::from_raw([1; OBJECT_ID_LEN]);
        assert!(id1 < id2);
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjectId::hash_of(b"serde test");
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
