//! Wire-format constants and primitive readers/writers.
//!
//! Format v1, all integers fixed-width big-endian:
//!
//! ```text
//! header:  FORMAT_VERSION u8 | object tag u8
//!
//! tree:    size u64 | num_trees u32 | shape u8 (0=leaf, 1=buckets)
//!          metadata table: count u32, then count * 20-byte ids
//!          leaf:    node count u32, then nodes ordered by name
//!          buckets: entry count u32, then entries ordered by index
//!
//! node:    kind u8 | name str | object_id 20 | metadata ref u32
//!          extra_data: flag u8, if 1: len u32 + bytes
//!          envelope: flag u8 (0=none, 2=2D, 3=3D), then 4 or 6 f64
//!
//! bucket:  index u8 | object_id 20 | envelope
//!
//! commit:  tree_id 20 | parent count u32 | parents 20 each
//!          author sig | committer sig | message str
//! sig:     name str | email str | timestamp i64 | tz_offset i32
//!
//! feature:     payload len u32 | payload bytes
//! featuretype: name str | payload len u32 | payload bytes
//! tag:         name str | target 20 | tagger sig | message str
//!
//! str:     len u32 | UTF-8 bytes
//! ```
//!
//! Changing any field layout requires a new format version.

use strata_types::object_id::OBJECT_ID_LEN;
use strata_types::ObjectId;

use crate::error::{CodecError, CodecResult};

/// Current (and only) wire format version.
///
/// Version 1 also fixes the tree-shaping parameters: 32 buckets, a
/// 512-entry leaf limit, and the FNV-1a name hash — a decoder must
/// reproduce the encoder's shaping exactly for ids to be stable.
pub const FORMAT_VERSION: u8 = 1;

/// Object type tags.
pub const TAG_COMMIT: u8 = 1;
pub const TAG_TREE: u8 = 2;
pub const TAG_FEATURE: u8 = 3;
pub const TAG_FEATURETYPE: u8 = 4;
pub const TAG_TAG: u8 = 5;

/// Tree shape discriminators.
pub const SHAPE_LEAF: u8 = 0;
pub const SHAPE_BUCKETS: u8 = 1;

/// Node target kinds.
pub const NODE_FEATURE: u8 = 1;
pub const NODE_TREE: u8 = 2;
pub const NODE_FEATURETYPE: u8 = 3;

/// Envelope flags: dimension count, 0 for absent.
pub const ENVELOPE_NONE: u8 = 0;
pub const ENVELOPE_2D: u8 = 2;
pub const ENVELOPE_3D: u8 = 3;

/// Metadata reference meaning "no metadata id".
pub const METADATA_NONE: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub(crate) fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub(crate) fn put_id(buf: &mut Vec<u8>, id: &ObjectId) {
    buf.extend_from_slice(id.as_bytes());
}

pub(crate) fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Cursor over input bytes; every read is bounds-checked and a short read
/// surfaces as [`CodecError::Truncated`] with the failing offset.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> CodecResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn u64(&mut self) -> CodecResult<u64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    pub(crate) fn i32(&mut self) -> CodecResult<i32> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn i64(&mut self) -> CodecResult<i64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(i64::from_be_bytes(arr))
    }

    pub(crate) fn f64(&mut self) -> CodecResult<f64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(f64::from_be_bytes(arr))
    }

    pub(crate) fn id(&mut self) -> CodecResult<ObjectId> {
        let b = self.take(OBJECT_ID_LEN)?;
        let mut arr = [0u8; OBJECT_ID_LEN];
        arr.copy_from_slice(b);
        Ok(ObjectId::from_raw(arr))
    }

    pub(crate) fn bytes(&mut self) -> CodecResult<Vec<u8>> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub(crate) fn str(&mut self) -> CodecResult<String> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| CodecError::Malformed("string is not valid UTF-8".into()))
    }

    /// Read a declared entry count, guarding against counts that could not
    /// possibly fit in the remaining input (each entry needs at least
    /// `min_entry_size` bytes).
    pub(crate) fn count(&mut self, min_entry_size: usize) -> CodecResult<usize> {
        let count = self.u32()? as usize;
        if count > self.remaining() / min_entry_size.max(1) {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: count * min_entry_size.max(1) - self.remaining(),
            });
        }
        Ok(count)
    }

    /// Assert the input is fully consumed; trailing bytes are malformed.
    pub(crate) fn finish(&self) -> CodecResult<()> {
        if self.remaining() != 0 {
            return Err(CodecError::Malformed(format!(
                "{} trailing byte(s) after object",
                self.remaining()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_roundtrip() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 0xDEAD_BEEF);
        let mut r = Reader::new(&buf);
        assert_eq!(r.u32().unwrap(), 0xDEAD_BEEF);
        r.finish().unwrap();
    }

    #[test]
    fn i64_roundtrip_negative() {
        let mut buf = Vec::new();
        put_i64(&mut buf, -1234567890123);
        let mut r = Reader::new(&buf);
        assert_eq!(r.i64().unwrap(), -1234567890123);
    }

    #[test]
    fn f64_roundtrip_preserves_bits() {
        let mut buf = Vec::new();
        put_f64(&mut buf, -0.0);
        let mut r = Reader::new(&buf);
        assert_eq!(r.f64().unwrap().to_bits(), (-0.0f64).to_bits());
    }

    #[test]
    fn str_roundtrip() {
        let mut buf = Vec::new();
        put_str(&mut buf, "points/λ");
        let mut r = Reader::new(&buf);
        assert_eq!(r.str().unwrap(), "points/λ");
    }

    #[test]
    fn str_rejects_invalid_utf8() {
        let mut buf = Vec::new();
        put_u32(&mut buf, 2);
        buf.extend_from_slice(&[0xFF, 0xFE]);
        let mut r = Reader::new(&buf);
        assert!(matches!(r.str(), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn truncated_read_reports_offset() {
        let buf = vec![0u8; 3];
        let mut r = Reader::new(&buf);
        let err = r.u32().unwrap_err();
        assert_eq!(
            err,
            CodecError::Truncated {
                offset: 0,
                needed: 1
            }
        );
    }

    #[test]
    fn count_guard_rejects_absurd_counts() {
        let mut buf = Vec::new();
        put_u32(&mut buf, u32::MAX);
        let mut r = Reader::new(&buf);
        assert!(matches!(r.count(20), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn finish_rejects_trailing_bytes() {
        let buf = vec![1u8, 2];
        let mut r = Reader::new(&buf);
        r.u8().unwrap();
        assert!(matches!(r.finish(), Err(CodecError::Malformed(_))));
    }
}
