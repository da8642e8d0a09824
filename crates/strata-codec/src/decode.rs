//! Decoding of canonical byte sequences back into revision objects.
//!
//! Decoders are strict: truncated input, unknown versions or tags, unordered
//! entries, out-of-range table references, and trailing bytes are all
//! rejected. Nothing is ever guessed at or silently recovered.

use strata_types::{
    Bucket, Envelope, Node, NodeKind, ObjectId, RevCommit, RevFeature, RevFeatureType, RevObject,
    RevTag, RevTree, Signature,
};
use tracing::trace;

use crate::encode::encode;
use crate::error::{CodecError, CodecResult};
use crate::format::{
    Reader, ENVELOPE_2D, ENVELOPE_3D, ENVELOPE_NONE, FORMAT_VERSION, METADATA_NONE, NODE_FEATURE,
    NODE_FEATURETYPE, NODE_TREE, SHAPE_BUCKETS, SHAPE_LEAF, TAG_COMMIT, TAG_FEATURE,
    TAG_FEATURETYPE, TAG_TAG, TAG_TREE,
};

// Smallest possible wire sizes, used to bound declared entry counts before
// allocating.
const MIN_NODE_SIZE: usize = 1 + 4 + 20 + 4 + 1 + 1;
const MIN_BUCKET_SIZE: usize = 1 + 20 + 1;
const ID_SIZE: usize = 20;

/// Decode a revision object from its canonical encoding.
pub fn decode(bytes: &[u8]) -> CodecResult<RevObject> {
    let mut r = Reader::new(bytes);
    let version = r.u8()?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let tag = r.u8()?;
    let obj = match tag {
        TAG_COMMIT => RevObject::Commit(decode_commit(&mut r)?),
        TAG_TREE => RevObject::Tree(decode_tree(&mut r)?),
        TAG_FEATURE => RevObject::Feature(decode_feature(&mut r)?),
        TAG_FEATURETYPE => RevObject::FeatureType(decode_feature_type(&mut r)?),
        TAG_TAG => RevObject::Tag(decode_tag(&mut r)?),
        other => {
            return Err(CodecError::Malformed(format!(
                "unknown object tag: {other}"
            )))
        }
    };
    r.finish()?;
    Ok(obj)
}

/// Decode and verify: after decoding, re-encode the object and check that
/// the re-encoding hashes to `expected`. A mismatch means the stored bytes
/// are corrupt (or were not canonically encoded to begin with).
pub fn decode_verified(bytes: &[u8], expected: &ObjectId) -> CodecResult<RevObject> {
    let obj = decode(bytes)?;
    let reencoded = encode(&obj);
    let actual = ObjectId::hash_of(&reencoded);
    if actual != *expected {
        trace!(expected = %expected.short_hex(), actual = %actual.short_hex(),
               "integrity check failed");
        return Err(CodecError::IntegrityMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(obj)
}

fn decode_commit(r: &mut Reader<'_>) -> CodecResult<RevCommit> {
    let tree_id = r.id()?;
    let parent_count = r.count(ID_SIZE)?;
    let mut parent_ids = Vec::with_capacity(parent_count);
    for _ in 0..parent_count {
        parent_ids.push(r.id()?);
    }
    let author = decode_signature(r)?;
    let committer = decode_signature(r)?;
    let message = r.str()?;
    Ok(RevCommit {
        tree_id,
        parent_ids,
        author,
        committer,
        message,
    })
}

fn decode_signature(r: &mut Reader<'_>) -> CodecResult<Signature> {
    let name = r.str()?;
    let email = r.str()?;
    let timestamp_ms = r.i64()?;
    let tz_offset_mins = r.i32()?;
    Ok(Signature {
        name,
        email,
        timestamp_ms,
        tz_offset_mins,
    })
}

fn decode_tree(r: &mut Reader<'_>) -> CodecResult<RevTree> {
    let size = r.u64()?;
    let num_trees = r.u32()?;
    let shape = r.u8()?;

    let table_len = r.count(ID_SIZE)?;
    let mut table = Vec::with_capacity(table_len);
    for _ in 0..table_len {
        table.push(r.id()?);
    }

    match shape {
        SHAPE_LEAF => {
            let node_count = r.count(MIN_NODE_SIZE)?;
            let mut nodes = Vec::with_capacity(node_count);
            for _ in 0..node_count {
                let node = decode_node(r, &table)?;
                if let Some(prev) = nodes.last() {
                    if prev.name >= node.name {
                        return Err(CodecError::Malformed(format!(
                            "leaf nodes not in strict name order: {:?} then {:?}",
                            prev.name, node.name
                        )));
                    }
                }
                nodes.push(node);
            }
            let tree =
                RevTree::leaf(nodes).map_err(|e| CodecError::Malformed(e.to_string()))?;
            // A leaf derives its counters from its nodes; a declaration that
            // disagrees cannot have come from this encoder.
            if tree.size() != size || tree.num_trees() != num_trees {
                return Err(CodecError::Malformed(format!(
                    "declared counts (size {size}, trees {num_trees}) do not match \
                     leaf contents (size {}, trees {})",
                    tree.size(),
                    tree.num_trees()
                )));
            }
            Ok(tree)
        }
        SHAPE_BUCKETS => {
            if table_len != 0 {
                return Err(CodecError::Malformed(
                    "bucket-shaped tree carries a metadata table".into(),
                ));
            }
            let bucket_count = r.count(MIN_BUCKET_SIZE)?;
            let mut buckets = Vec::with_capacity(bucket_count);
            for _ in 0..bucket_count {
                let bucket = decode_bucket(r)?;
                if let Some(prev) = buckets.last() {
                    if prev.index >= bucket.index {
                        return Err(CodecError::Malformed(format!(
                            "buckets not in strict index order: {} then {}",
                            prev.index, bucket.index
                        )));
                    }
                }
                buckets.push(bucket);
            }
            RevTree::buckets(size, num_trees, buckets)
                .map_err(|e| CodecError::Malformed(e.to_string()))
        }
        other => Err(CodecError::Malformed(format!(
            "unknown tree shape: {other}"
        ))),
    }
}

fn decode_node(r: &mut Reader<'_>, table: &[ObjectId]) -> CodecResult<Node> {
    let kind = match r.u8()? {
        NODE_FEATURE => NodeKind::Feature,
        NODE_TREE => NodeKind::Tree,
        NODE_FEATURETYPE => NodeKind::FeatureType,
        other => {
            return Err(CodecError::Malformed(format!(
                "unknown node kind: {other}"
            )))
        }
    };
    let name = r.str()?;
    let object_id = r.id()?;
    let metadata_ref = r.u32()?;
    let metadata_id = if metadata_ref == METADATA_NONE {
        None
    } else {
        let index = metadata_ref as usize;
        if index >= table.len() {
            return Err(CodecError::Malformed(format!(
                "metadata reference {index} outside table of {} entries",
                table.len()
            )));
        }
        Some(table[index])
    };
    let extra_data = match r.u8()? {
        0 => None,
        1 => Some(r.bytes()?),
        other => {
            return Err(CodecError::Malformed(format!(
                "invalid extra-data flag: {other}"
            )))
        }
    };
    let envelope = decode_envelope(r)?;
    Ok(Node {
        name,
        kind,
        object_id,
        metadata_id,
        extra_data,
        envelope,
    })
}

fn decode_bucket(r: &mut Reader<'_>) -> CodecResult<Bucket> {
    let index = r.u8()?;
    let object_id = r.id()?;
    let envelope = decode_envelope(r)?;
    Ok(Bucket {
        index,
        object_id,
        envelope,
    })
}

fn decode_envelope(r: &mut Reader<'_>) -> CodecResult<Option<Envelope>> {
    match r.u8()? {
        ENVELOPE_NONE => Ok(None),
        ENVELOPE_2D => Ok(Some(Envelope::Rect {
            min_x: r.f64()?,
            min_y: r.f64()?,
            max_x: r.f64()?,
            max_y: r.f64()?,
        })),
        ENVELOPE_3D => Ok(Some(Envelope::Cube {
            min_x: r.f64()?,
            min_y: r.f64()?,
            min_z: r.f64()?,
            max_x: r.f64()?,
            max_y: r.f64()?,
            max_z: r.f64()?,
        })),
        other => Err(CodecError::Malformed(format!(
            "invalid envelope flag: {other}"
        ))),
    }
}

fn decode_feature(r: &mut Reader<'_>) -> CodecResult<RevFeature> {
    Ok(RevFeature::new(r.bytes()?))
}

fn decode_feature_type(r: &mut Reader<'_>) -> CodecResult<RevFeatureType> {
    let name = r.str()?;
    let payload = r.bytes()?;
    Ok(RevFeatureType { name, payload })
}

fn decode_tag(r: &mut Reader<'_>) -> CodecResult<RevTag> {
    let name = r.str()?;
    let target = r.id()?;
    let tagger = decode_signature(r)?;
    let message = r.str()?;
    Ok(RevTag {
        name,
        target,
        tagger,
        message,
    })
}
