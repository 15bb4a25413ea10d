//! Object store contract
//!
//! The solver never touches a repository directly; it goes through this
//! trait. The production implementation is backed by gix
//! (`git_store`), and tests substitute in-memory stores for shapes that
//! are awkward to build as real repositories.

use anyhow::Result;
use gix::ObjectId;
use gix::bstr::BString;
use smallvec::SmallVec;

use crate::model::ObjectKind;

const MODE_TYPE_MASK: u32 = 0o170000;
const MODE_TREE: u32 = 0o040000;
const MODE_LINK: u32 = 0o120000;
const MODE_SUBMODULE: u32 = 0o160000;

/// Kind and byte length of an object, as reported by its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub oid: ObjectId,
    pub kind: ObjectKind,
    pub size: u64,
}

/// A named entry point into the object graph, with its target's header
/// already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    pub oid: ObjectId,
    pub kind: ObjectKind,
    pub size: u64,
}

/// How a tree entry participates in size aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Tree,
    Blob,
    Link,
    Submodule,
}

/// One entry of a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: BString,
    pub mode: u32,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Classify the entry by the type bits of its file mode. Everything
    /// that is not a tree, symlink, or gitlink is a blob.
    pub fn kind(&self) -> EntryKind {
        match self.mode & MODE_TYPE_MASK {
            MODE_TREE => EntryKind::Tree,
            MODE_SUBMODULE => EntryKind::Submodule,
            MODE_LINK => EntryKind::Link,
            _ => EntryKind::Blob,
        }
    }
}

/// A parsed tree object: its entries in on-disk order and its raw byte
/// length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeData {
    pub entries: Vec<TreeEntry>,
    pub size: u64,
}

/// A parsed commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitData {
    pub tree: ObjectId,
    pub parents: SmallVec<[ObjectId; 2]>,
    pub size: u64,
}

/// A parsed annotated tag object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagData {
    pub referent: ObjectId,
    pub referent_kind: ObjectKind,
    pub size: u64,
}

/// Read access to a repository's object graph.
///
/// All operations are synchronous; iterators borrow the store and must be
/// dropped before solving starts, which is why callers collect them first.
pub trait ObjectStore {
    /// Every object in the store, headers only.
    fn iter_objects(&self) -> Result<Box<dyn Iterator<Item = Result<ObjectHeader>> + '_>>;

    /// Every commit reachable from a reference, parents before children.
    ///
    /// The order is best-effort: the solver falls back to its work list
    /// whenever a parent has not been seen yet.
    fn iter_commits(&self) -> Result<Box<dyn Iterator<Item = Result<(ObjectId, CommitData)>> + '_>>;

    /// All direct references, with their target headers resolved.
    fn iter_references(&self) -> Result<Box<dyn Iterator<Item = Result<Reference>> + '_>>;

    /// Resolve any revision spec the store understands to an object header.
    fn read_header(&self, spec: &str) -> Result<ObjectHeader>;

    /// Header lookup for a known object id.
    fn object_header(&self, oid: &ObjectId) -> Result<ObjectHeader>;

    fn read_tree(&self, oid: &ObjectId) -> Result<TreeData>;

    fn read_commit(&self, oid: &ObjectId) -> Result<CommitData>;

    fn read_tag(&self, oid: &ObjectId) -> Result<TagData>;
}
