//! Size cache
//!
//! Four maps keyed by object id, one per object kind. An oid present in a
//! map has a fully-resolved size; partial results never land here.

use gix::ObjectId;
use rustc_hash::FxHashMap;

use crate::model::{BlobSize, CommitSize, TagSize, TreeSize};

#[derive(Debug, Default)]
pub(crate) struct SizeCache {
    pub(crate) blobs: FxHashMap<ObjectId, BlobSize>,
    pub(crate) trees: FxHashMap<ObjectId, TreeSize>,
    pub(crate) commits: FxHashMap<ObjectId, CommitSize>,
    pub(crate) tags: FxHashMap<ObjectId, TagSize>,
}
