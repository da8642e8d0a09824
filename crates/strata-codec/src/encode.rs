//! Canonical encoding of revision objects.

use std::sync::LazyLock;

use strata_types::{
    Bucket, Envelope, Node, NodeKind, ObjectId, RevCommit, RevFeature, RevFeatureType, RevObject,
    RevTag, RevTree, Signature,
};

use crate::format::{
    put_f64, put_i32, put_i64, put_id, put_str, put_u32, put_u64, put_u8, ENVELOPE_2D,
    ENVELOPE_3D, ENVELOPE_NONE, FORMAT_VERSION, METADATA_NONE, NODE_FEATURE, NODE_FEATURETYPE,
    NODE_TREE, SHAPE_BUCKETS, SHAPE_LEAF, TAG_COMMIT, TAG_FEATURE, TAG_FEATURETYPE, TAG_TAG,
    TAG_TREE,
};

/// Encode a revision object into its canonical byte sequence.
///
/// The header (format version + object tag) is part of the hashed bytes,
/// so objects of different kinds with identical bodies never collide.
pub fn encode(obj: &RevObject) -> Vec<u8> {
    let mut buf = Vec::new();
    put_u8(&mut buf, FORMAT_VERSION);
    match obj {
        RevObject::Commit(c) => {
            put_u8(&mut buf, TAG_COMMIT);
            encode_commit(&mut buf, c);
        }
        RevObject::Tree(t) => {
            put_u8(&mut buf, TAG_TREE);
            encode_tree(&mut buf, t);
        }
        RevObject::Feature(f) => {
            put_u8(&mut buf, TAG_FEATURE);
            encode_feature(&mut buf, f);
        }
        RevObject::FeatureType(ft) => {
            put_u8(&mut buf, TAG_FEATURETYPE);
            encode_feature_type(&mut buf, ft);
        }
        RevObject::Tag(t) => {
            put_u8(&mut buf, TAG_TAG);
            encode_tag(&mut buf, t);
        }
    }
    buf
}

/// The content-addressed identity of an object: the hash of its canonical
/// encoding.
pub fn hash_object(obj: &RevObject) -> ObjectId {
    ObjectId::hash_of(&encode(obj))
}

static EMPTY_TREE_ID: LazyLock<ObjectId> =
    LazyLock::new(|| hash_object(&RevObject::Tree(RevTree::empty())));

/// The well-known id of the empty tree, stable across runs for a given
/// format version.
pub fn empty_tree_id() -> ObjectId {
    *EMPTY_TREE_ID
}

fn encode_commit(buf: &mut Vec<u8>, c: &RevCommit) {
    put_id(buf, &c.tree_id);
    put_u32(buf, c.parent_ids.len() as u32);
    for parent in &c.parent_ids {
        put_id(buf, parent);
    }
    encode_signature(buf, &c.author);
    encode_signature(buf, &c.committer);
    put_str(buf, &c.message);
}

fn encode_signature(buf: &mut Vec<u8>, sig: &Signature) {
    put_str(buf, &sig.name);
    put_str(buf, &sig.email);
    put_i64(buf, sig.timestamp_ms);
    put_i32(buf, sig.tz_offset_mins);
}

fn encode_tree(buf: &mut Vec<u8>, tree: &RevTree) {
    put_u64(buf, tree.size());
    put_u32(buf, tree.num_trees());
    if tree.is_leaf() {
        put_u8(buf, SHAPE_LEAF);
        let table = metadata_table(tree.nodes());
        put_u32(buf, table.len() as u32);
        for id in &table {
            put_id(buf, id);
        }
        put_u32(buf, tree.nodes().len() as u32);
        for node in tree.nodes() {
            encode_node(buf, node, &table);
        }
    } else {
        put_u8(buf, SHAPE_BUCKETS);
        // Bucket-shaped trees embed no nodes, so the table is empty.
        put_u32(buf, 0);
        put_u32(buf, tree.bucket_entries().len() as u32);
        for bucket in tree.bucket_entries() {
            encode_bucket(buf, bucket);
        }
    }
}

/// Distinct metadata ids across the tree's nodes, in first-seen order.
/// Nodes reference this table by index, collapsing the heavily repeated
/// per-feature schema ids to one stored copy each.
fn metadata_table(nodes: &[Node]) -> Vec<ObjectId> {
    let mut table = Vec::new();
    for node in nodes {
        if let Some(id) = node.metadata_id {
            if !table.contains(&id) {
                table.push(id);
            }
        }
    }
    table
}

fn encode_node(buf: &mut Vec<u8>, node: &Node, table: &[ObjectId]) {
    let kind = match node.kind {
        NodeKind::Feature => NODE_FEATURE,
        NodeKind::Tree => NODE_TREE,
        NodeKind::FeatureType => NODE_FEATURETYPE,
    };
    put_u8(buf, kind);
    put_str(buf, &node.name);
    put_id(buf, &node.object_id);
    let metadata_ref = match node.metadata_id {
        // The table was built from these nodes, so the lookup cannot miss.
        Some(id) => table.iter().position(|t| *t == id).unwrap_or_default() as u32,
        None => METADATA_NONE,
    };
    put_u32(buf, metadata_ref);
    match &node.extra_data {
        Some(data) => {
            put_u8(buf, 1);
            put_u32(buf, data.len() as u32);
            buf.extend_from_slice(data);
        }
        None => put_u8(buf, 0),
    }
    encode_envelope(buf, node.envelope.as_ref());
}

fn encode_bucket(buf: &mut Vec<u8>, bucket: &Bucket) {
    put_u8(buf, bucket.index);
    put_id(buf, &bucket.object_id);
    encode_envelope(buf, bucket.envelope.as_ref());
}

fn encode_envelope(buf: &mut Vec<u8>, envelope: Option<&Envelope>) {
    match envelope {
        None => put_u8(buf, ENVELOPE_NONE),
        Some(Envelope::Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }) => {
            put_u8(buf, ENVELOPE_2D);
            for v in [min_x, min_y, max_x, max_y] {
                put_f64(buf, *v);
            }
        }
        Some(Envelope::Cube {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }) => {
            put_u8(buf, ENVELOPE_3D);
            for v in [min_x, min_y, min_z, max_x, max_y, max_z] {
                put_f64(buf, *v);
            }
        }
    }
}

fn encode_feature(buf: &mut Vec<u8>, f: &RevFeature) {
    put_u32(buf, f.payload.len() as u32);
    buf.extend_from_slice(&f.payload);
}

fn encode_feature_type(buf: &mut Vec<u8>, ft: &RevFeatureType) {
    put_str(buf, &ft.name);
    put_u32(buf, ft.payload.len() as u32);
    buf.extend_from_slice(&ft.payload);
}

fn encode_tag(buf: &mut Vec<u8>, tag: &RevTag) {
    put_str(buf, &tag.name);
    put_id(buf, &tag.target);
    encode_signature(buf, &tag.tagger);
    put_str(buf, &tag.message);
}
