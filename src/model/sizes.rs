//! Per-object size aggregates
//!
//! Each aggregate exposes combinators that fold an already-resolved child
//! size into the parent. The solver calls them while draining its work
//! list, so by the time a combinator runs the child value is final.

use gix::bstr::BStr;
use serde::Serialize;
use std::fmt;

use super::counter::Count;

/// The four kinds of object a repository stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
            ObjectKind::Tag => "tag",
        };
        f.write_str(name)
    }
}

/// Size of a single blob: its own byte length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlobSize {
    pub size: Count,
}

/// Aggregate over a directory subtree, measured across the transitive
/// closure of the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeSize {
    /// Longest path, in path components, from this tree to any descendant
    /// leaf, inclusive of this tree. A leaf tree has depth 1.
    pub max_path_depth: Count,
    /// Number of trees in the closure, including this one.
    pub expanded_tree_count: Count,
    /// Number of blobs in the closure.
    pub expanded_blob_count: Count,
    /// Summed byte length of blobs in the closure.
    pub expanded_blob_size: Count,
    /// Number of symlink entries in the closure.
    pub expanded_link_count: Count,
    /// Number of entries pointing at a commit (gitlinks) in the closure.
    pub expanded_submodule_count: Count,
}

impl TreeSize {
    /// Fold in a resolved child tree.
    ///
    /// The `name` parameter is reserved for per-entry metrics and does not
    /// affect the aggregate.
    pub fn add_descendent(&mut self, _name: &BStr, child: &TreeSize) {
        let mut depth = child.max_path_depth;
        depth.increment(1);
        self.max_path_depth.adjust_max(depth);
        self.expanded_tree_count.add(child.expanded_tree_count);
        self.expanded_blob_count.add(child.expanded_blob_count);
        self.expanded_blob_size.add(child.expanded_blob_size);
        self.expanded_link_count.add(child.expanded_link_count);
        self.expanded_submodule_count
            .add(child.expanded_submodule_count);
    }

    /// Fold in a blob entry: this tree plus the blob make a path of two
    /// components.
    pub fn add_blob(&mut self, _name: &BStr, blob: BlobSize) {
        self.expanded_blob_count.increment(1);
        self.expanded_blob_size.add(blob.size);
        self.max_path_depth.adjust_max(Count::new(2));
    }

    /// Fold in a symlink entry. The link target is not followed.
    pub fn add_link(&mut self, _name: &BStr) {
        self.expanded_link_count.increment(1);
        self.max_path_depth.adjust_max(Count::new(2));
    }

    /// Fold in a gitlink entry. The referenced commit is not recursed into.
    pub fn add_submodule(&mut self, _name: &BStr) {
        self.expanded_submodule_count.increment(1);
        self.max_path_depth.adjust_max(Count::new(2));
    }
}

/// Aggregate over a commit's ancestry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSize {
    /// Longest ancestor chain ending at this commit, inclusive. A root
    /// commit has depth 1.
    pub max_ancestor_depth: Count,
}

impl CommitSize {
    /// Ingest the commit's root tree aggregate.
    ///
    /// No field currently depends on the tree; the hook is kept so
    /// per-commit tree statistics can be added without reshaping the task
    /// protocol. Tree facts reach the rollup through `record_tree`.
    pub fn add_tree(&mut self, _tree: &TreeSize) {}

    /// Fold in a resolved parent commit.
    pub fn add_parent(&mut self, parent: &CommitSize) {
        let mut depth = parent.max_ancestor_depth;
        depth.increment(1);
        self.max_ancestor_depth.adjust_max(depth);
    }
}

/// Aggregate over a chain of annotated tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagSize {
    /// Number of consecutive annotated-tag indirections ending at this tag.
    /// A tag pointing at a non-tag has depth 1.
    pub tag_depth: Count,
}

impl Default for TagSize {
    fn default() -> Self {
        TagSize {
            tag_depth: Count::new(1),
        }
    }
}

/// The resolved size of an object of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSize {
    Blob(BlobSize),
    Tree(TreeSize),
    Commit(CommitSize),
    Tag(TagSize),
}
