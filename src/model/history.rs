//! Whole-repository rollup
//!
//! `HistorySize` accumulates one scan's worth of per-object facts into
//! counts, sums, and maxima. Each `record_*` method is called exactly once
//! per unique object; the solver's caches guarantee that.

use serde::Serialize;

use super::counter::Count;
use super::sizes::{BlobSize, CommitSize, ObjectKind, TagSize, TreeSize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistorySize {
    // Unique blobs.
    pub unique_blob_count: Count,
    pub unique_blob_size: Count,
    pub max_blob_size: Count,

    // Unique trees.
    pub unique_tree_count: Count,
    pub unique_tree_size: Count,
    pub unique_tree_entries: Count,
    pub max_tree_size: Count,
    pub max_tree_entries: Count,

    // Unique commits.
    pub unique_commit_count: Count,
    pub unique_commit_size: Count,
    pub max_commit_size: Count,
    pub max_parent_count: Count,
    pub max_ancestor_depth: Count,

    // Unique annotated tags.
    pub unique_tag_count: Count,
    pub unique_tag_size: Count,
    pub max_tag_size: Count,
    pub max_tag_depth: Count,

    // Maxima of the tree aggregates, over every tree recorded.
    pub max_path_depth: Count,
    pub max_expanded_tree_count: Count,
    pub max_expanded_blob_count: Count,
    pub max_expanded_blob_size: Count,
    pub max_expanded_link_count: Count,
    pub max_expanded_submodule_count: Count,

    // Sums of the tree aggregates, only across trees that references point
    // at directly. Trees reached through commits contribute to the maxima
    // above but not to these totals.
    pub expanded_tree_count: Count,
    pub expanded_blob_count: Count,
    pub expanded_blob_size: Count,
    pub expanded_link_count: Count,
    pub expanded_submodule_count: Count,

    // References, partitioned by the kind of object they point at.
    pub reference_count: Count,
    pub references_to_blobs: Count,
    pub references_to_trees: Count,
    pub references_to_commits: Count,
    pub references_to_tags: Count,
}

impl HistorySize {
    pub fn record_blob(&mut self, blob: BlobSize) {
        self.unique_blob_count.increment(1);
        self.unique_blob_size.add(blob.size);
        self.max_blob_size.adjust_max(blob.size);
    }

    pub fn record_tree(&mut self, tree: &TreeSize, object_size: Count, entry_count: Count) {
        self.unique_tree_count.increment(1);
        self.unique_tree_size.add(object_size);
        self.unique_tree_entries.add(entry_count);
        self.max_tree_size.adjust_max(object_size);
        self.max_tree_entries.adjust_max(entry_count);

        self.max_path_depth.adjust_max(tree.max_path_depth);
        self.max_expanded_tree_count
            .adjust_max(tree.expanded_tree_count);
        self.max_expanded_blob_count
            .adjust_max(tree.expanded_blob_count);
        self.max_expanded_blob_size
            .adjust_max(tree.expanded_blob_size);
        self.max_expanded_link_count
            .adjust_max(tree.expanded_link_count);
        self.max_expanded_submodule_count
            .adjust_max(tree.expanded_submodule_count);
    }

    pub fn record_commit(&mut self, commit: &CommitSize, object_size: Count, parent_count: Count) {
        self.unique_commit_count.increment(1);
        self.unique_commit_size.add(object_size);
        self.max_commit_size.adjust_max(object_size);
        self.max_parent_count.adjust_max(parent_count);
        self.max_ancestor_depth.adjust_max(commit.max_ancestor_depth);
    }

    pub fn record_tag(&mut self, tag: &TagSize, object_size: Count) {
        self.unique_tag_count.increment(1);
        self.unique_tag_size.add(object_size);
        self.max_tag_size.adjust_max(object_size);
        self.max_tag_depth.adjust_max(tag.tag_depth);
    }

    pub fn record_reference(&mut self, target_kind: ObjectKind) {
        self.reference_count.increment(1);
        match target_kind {
            ObjectKind::Blob => self.references_to_blobs.increment(1),
            ObjectKind::Tree => self.references_to_trees.increment(1),
            ObjectKind::Commit => self.references_to_commits.increment(1),
            ObjectKind::Tag => self.references_to_tags.increment(1),
        }
    }

    /// Fold a reference-rooted tree into the expanded totals.
    pub fn record_reference_root(&mut self, tree: &TreeSize) {
        self.expanded_tree_count.add(tree.expanded_tree_count);
        self.expanded_blob_count.add(tree.expanded_blob_count);
        self.expanded_blob_size.add(tree.expanded_blob_size);
        self.expanded_link_count.add(tree.expanded_link_count);
        self.expanded_submodule_count
            .add(tree.expanded_submodule_count);
    }
}
