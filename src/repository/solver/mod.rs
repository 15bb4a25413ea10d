//! Recursive size solver
//!
//! Computes per-object size aggregates over the object graph without
//! recursing on the call stack.
//!
//! # Architecture
//!
//! The solver is organized into layers:
//!
//! - **cache**: four oid-keyed maps of fully-resolved sizes
//! - **task**: pending tree/commit/tag computations carrying partial progress
//! - **todo**: the LIFO work list that stands in for the call stack
//! - **solver**: preload and the per-object entry points
//!
//! An object's size depends on the sizes of its children (tree entries,
//! the root tree plus parents, a tag's referent). On a cache miss the
//! solver pushes a task for the object and drains the work list; tasks
//! that find missing children re-push themselves behind sub-tasks for the
//! children, so everything resolves children-first and each object is
//! recorded at most once.

mod cache;
mod task;
mod todo;

use anyhow::{Context, Result, bail};
use gix::ObjectId;
use tracing::debug;

use crate::model::{
    BlobSize, CommitSize, Count, HistorySize, ObjectKind, ObjectSize, TagSize, TreeSize,
};
use crate::repository::store::{CommitData, ObjectStore, Reference};

use cache::SizeCache;
use task::{CommitTask, TagTask, Task, TreeTask};
use todo::ToDoList;

/// Cache-backed, iterative size evaluator over one repository.
///
/// All state lives here; two solvers over the same store are independent.
pub struct SizeSolver<S: ObjectStore> {
    pub(crate) store: S,
    pub(crate) cache: SizeCache,
    pub(crate) history: HistorySize,
    pub(crate) preloaded: bool,
}

impl<S: ObjectStore> SizeSolver<S> {
    /// Construct a solver and prime it with every blob and commit.
    pub fn new(store: S) -> Result<Self> {
        let mut solver = Self::without_preload(store);
        solver.preload()?;
        Ok(solver)
    }

    /// Construct a solver that resolves everything lazily. Results are
    /// identical to a preloaded solver's; preload only changes the access
    /// pattern.
    pub fn without_preload(store: S) -> Self {
        SizeSolver {
            store,
            cache: SizeCache::default(),
            history: HistorySize::default(),
            preloaded: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self) -> &HistorySize {
        &self.history
    }

    pub fn into_history(self) -> HistorySize {
        self.history
    }

    /// Prime the caches. Blobs are leaves, so one pass over the object
    /// headers records them all. Commits are then visited parents-first;
    /// in that order each one normally resolves on its first attempt, and
    /// the work list covers the stragglers.
    fn preload(&mut self) -> Result<()> {
        {
            let Self {
                store,
                cache,
                history,
                ..
            } = self;
            for header in store.iter_objects()? {
                let header = header?;
                if header.kind == ObjectKind::Blob && !cache.blobs.contains_key(&header.oid) {
                    let blob = BlobSize {
                        size: Count::clamped(header.size),
                    };
                    cache.blobs.insert(header.oid, blob);
                    history.record_blob(blob);
                }
            }
        }

        let commits: Vec<(ObjectId, CommitData)> =
            self.store.iter_commits()?.collect::<Result<_>>()?;
        debug!("preloading {} commits", commits.len());
        for (oid, commit) in commits {
            if self.cache.commits.contains_key(&oid) {
                continue;
            }
            let mut todo = ToDoList::new();
            todo.push(Task::Commit(CommitTask::preloaded(oid, commit)));
            todo.run(self)?;
        }
        self.preloaded = true;
        Ok(())
    }

    /// Size of a blob. Blobs are leaves, so a miss costs one header read.
    pub fn blob_size(&mut self, oid: &ObjectId) -> Result<BlobSize> {
        self.blob_size_of(oid)
    }

    pub(crate) fn blob_size_of(&mut self, oid: &ObjectId) -> Result<BlobSize> {
        if let Some(blob) = self.cache.blobs.get(oid) {
            return Ok(*blob);
        }
        let header = self
            .store
            .object_header(oid)
            .with_context(|| format!("Failed to read header for {oid}"))?;
        if header.kind != ObjectKind::Blob {
            bail!("{oid} is a {}, not a blob", header.kind);
        }
        let blob = BlobSize {
            size: Count::clamped(header.size),
        };
        self.record_blob(*oid, blob);
        Ok(blob)
    }

    /// Aggregate size of a directory tree and everything below it.
    pub fn tree_size(&mut self, oid: &ObjectId) -> Result<TreeSize> {
        if let Some(tree) = self.cache.trees.get(oid) {
            return Ok(*tree);
        }
        let data = self
            .store
            .read_tree(oid)
            .with_context(|| format!("Failed to read tree {oid}"))?;
        let mut todo = ToDoList::new();
        todo.push(Task::Tree(TreeTask::new(*oid, data)));
        todo.run(self)?;
        match self.cache.trees.get(oid) {
            Some(tree) => Ok(*tree),
            None => panic!("tree {oid} missing from the cache after the work list drained"),
        }
    }

    /// Ancestry aggregate of a commit.
    pub fn commit_size(&mut self, oid: &ObjectId) -> Result<CommitSize> {
        if let Some(commit) = self.cache.commits.get(oid) {
            return Ok(*commit);
        }
        let mut todo = ToDoList::new();
        todo.push(Task::Commit(CommitTask::new(*oid)));
        todo.run(self)?;
        match self.cache.commits.get(oid) {
            Some(commit) => Ok(*commit),
            None => panic!("commit {oid} missing from the cache after the work list drained"),
        }
    }

    /// Indirection depth of an annotated tag.
    pub fn tag_size(&mut self, oid: &ObjectId) -> Result<TagSize> {
        if let Some(tag) = self.cache.tags.get(oid) {
            return Ok(*tag);
        }
        let mut todo = ToDoList::new();
        todo.push(Task::Tag(TagTask::new(*oid)));
        todo.run(self)?;
        match self.cache.tags.get(oid) {
            Some(tag) => Ok(*tag),
            None => panic!("tag {oid} missing from the cache after the work list drained"),
        }
    }

    /// Fast path for callers that already hold the object's header, as the
    /// driver does for references.
    pub fn typed_object_size(
        &mut self,
        oid: &ObjectId,
        kind: ObjectKind,
        size: u64,
    ) -> Result<ObjectSize> {
        match kind {
            ObjectKind::Blob => {
                if let Some(blob) = self.cache.blobs.get(oid) {
                    return Ok(ObjectSize::Blob(*blob));
                }
                let blob = BlobSize {
                    size: Count::clamped(size),
                };
                self.record_blob(*oid, blob);
                Ok(ObjectSize::Blob(blob))
            }
            ObjectKind::Tree => Ok(ObjectSize::Tree(self.tree_size(oid)?)),
            ObjectKind::Commit => Ok(ObjectSize::Commit(self.commit_size(oid)?)),
            ObjectKind::Tag => Ok(ObjectSize::Tag(self.tag_size(oid)?)),
        }
    }

    /// Resolve a revision spec through the store, then size the object.
    pub fn object_size(&mut self, spec: &str) -> Result<ObjectSize> {
        let header = self.store.read_header(spec)?;
        self.typed_object_size(&header.oid, header.kind, header.size)
    }

    /// Size a reference's target and fold the reference into the rollup.
    pub fn reference_size(&mut self, reference: &Reference) -> Result<ObjectSize> {
        let size = self.typed_object_size(&reference.oid, reference.kind, reference.size)?;
        self.history.record_reference(reference.kind);
        if let ObjectSize::Tree(tree) = &size {
            self.history.record_reference_root(tree);
        }
        Ok(size)
    }

    // Recording helpers. The cache carries the record-once guarantee: only
    // a first insertion reaches the rollup.

    pub(crate) fn record_blob(&mut self, oid: ObjectId, blob: BlobSize) {
        if !self.cache.blobs.contains_key(&oid) {
            self.cache.blobs.insert(oid, blob);
            self.history.record_blob(blob);
        }
    }

    pub(crate) fn record_tree(
        &mut self,
        oid: ObjectId,
        tree: TreeSize,
        object_size: Count,
        entry_count: Count,
    ) {
        if !self.cache.trees.contains_key(&oid) {
            self.cache.trees.insert(oid, tree);
            self.history.record_tree(&tree, object_size, entry_count);
        }
    }

    pub(crate) fn record_commit(
        &mut self,
        oid: ObjectId,
        commit: CommitSize,
        object_size: Count,
        parent_count: Count,
    ) {
        if !self.cache.commits.contains_key(&oid) {
            self.cache.commits.insert(oid, commit);
            self.history.record_commit(&commit, object_size, parent_count);
        }
    }

    pub(crate) fn record_tag(&mut self, oid: ObjectId, tag: TagSize, object_size: Count) {
        if !self.cache.tags.contains_key(&oid) {
            self.cache.tags.insert(oid, tag);
            self.history.record_tag(&tag, object_size);
        }
    }
}
