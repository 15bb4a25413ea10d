//! Pending tasks
//!
//! A task represents one object whose size is not yet known. `queue` tries
//! to finish the object assuming every child is already cached; when a
//! child is missing it hands back sub-tasks and reports `NotYetKnown`,
//! and `run` re-pushes the task behind them. `run` also re-checks the
//! cache first, since a shared object may have been resolved through a
//! different parent while the task sat on the list.

use anyhow::{Context, Result};
use gix::ObjectId;
use tracing::debug;

use super::SizeSolver;
use super::todo::ToDoList;
use crate::model::{CommitSize, Count, ObjectKind, TagSize, TreeSize};
use crate::repository::store::{CommitData, EntryKind, ObjectStore, TagData, TreeData, TreeEntry};

/// Outcome of one `queue` attempt.
pub(crate) enum Queued<T> {
    /// Every child was cached; the aggregate is complete.
    Done(T),
    /// At least one child is missing. The task must be retried after the
    /// sub-tasks it produced have been solved.
    NotYetKnown,
}

pub(crate) enum Task {
    Tree(TreeTask),
    Commit(CommitTask),
    Tag(TagTask),
}

impl Task {
    pub(crate) fn run<S: ObjectStore>(
        self,
        solver: &mut SizeSolver<S>,
        todo: &mut ToDoList,
    ) -> Result<()> {
        match self {
            Task::Tree(task) => task.run(solver, todo),
            Task::Commit(task) => task.run(solver, todo),
            Task::Tag(task) => task.run(solver, todo),
        }
    }

    #[cfg(test)]
    pub(crate) fn oid(&self) -> ObjectId {
        match self {
            Task::Tree(task) => task.oid,
            Task::Commit(task) => task.oid,
            Task::Tag(task) => task.oid,
        }
    }
}

/// A tree whose entries are being folded in. The tree object itself is
/// parsed eagerly by whoever creates the task.
pub(crate) struct TreeTask {
    pub(crate) oid: ObjectId,
    object_size: Count,
    entry_count: Count,
    size: TreeSize,
    remaining: Vec<TreeEntry>,
}

impl TreeTask {
    pub(crate) fn new(oid: ObjectId, tree: TreeData) -> Self {
        let mut size = TreeSize::default();
        size.expanded_tree_count.increment(1);
        TreeTask {
            oid,
            object_size: Count::clamped(tree.size),
            entry_count: Count::default(),
            size,
            remaining: tree.entries,
        }
    }

    fn run<S: ObjectStore>(mut self, solver: &mut SizeSolver<S>, todo: &mut ToDoList) -> Result<()> {
        if solver.cache.trees.contains_key(&self.oid) {
            return Ok(());
        }
        let mut subtasks = ToDoList::new();
        match self.queue(solver, &mut subtasks)? {
            Queued::Done(()) => {
                solver.record_tree(self.oid, self.size, self.object_size, self.entry_count);
            }
            Queued::NotYetKnown => {
                todo.push(Task::Tree(self));
                todo.push_all(&mut subtasks);
            }
        }
        Ok(())
    }

    /// One pass over the unresolved entries. Entries still waiting on a
    /// child tree are compacted to the front of `remaining`, so a retry
    /// rescans only those instead of the whole entry list.
    fn queue<S: ObjectStore>(
        &mut self,
        solver: &mut SizeSolver<S>,
        subtasks: &mut ToDoList,
    ) -> Result<Queued<()>> {
        let mut deferred = 0;
        for i in 0..self.remaining.len() {
            let kind = self.remaining[i].kind();
            let child_oid = self.remaining[i].oid;
            match kind {
                EntryKind::Blob => {
                    let blob = solver.blob_size_of(&child_oid)?;
                    self.size.add_blob(self.remaining[i].name.as_ref(), blob);
                    self.entry_count.increment(1);
                }
                EntryKind::Link => {
                    self.size.add_link(self.remaining[i].name.as_ref());
                    self.entry_count.increment(1);
                }
                EntryKind::Submodule => {
                    self.size.add_submodule(self.remaining[i].name.as_ref());
                    self.entry_count.increment(1);
                }
                EntryKind::Tree => {
                    if let Some(child) = solver.cache.trees.get(&child_oid) {
                        let child = *child;
                        self.size.add_descendent(self.remaining[i].name.as_ref(), &child);
                        self.entry_count.increment(1);
                    } else {
                        let data = solver
                            .store
                            .read_tree(&child_oid)
                            .with_context(|| format!("Failed to read subtree {child_oid}"))?;
                        subtasks.push(Task::Tree(TreeTask::new(child_oid, data)));
                        self.remaining.swap(deferred, i);
                        deferred += 1;
                    }
                }
            }
        }
        if deferred > 0 {
            self.remaining.truncate(deferred);
            return Ok(Queued::NotYetKnown);
        }
        // This tree is itself one path component; an empty tree has depth 1.
        self.size.max_path_depth.adjust_max(Count::new(1));
        Ok(Queued::Done(()))
    }
}

/// A commit waiting on its root tree and parents.
pub(crate) struct CommitTask {
    pub(crate) oid: ObjectId,
    commit: Option<CommitData>,
    size: CommitSize,
}

impl CommitTask {
    pub(crate) fn new(oid: ObjectId) -> Self {
        CommitTask {
            oid,
            commit: None,
            size: CommitSize::default(),
        }
    }

    pub(crate) fn preloaded(oid: ObjectId, commit: CommitData) -> Self {
        CommitTask {
            oid,
            commit: Some(commit),
            size: CommitSize::default(),
        }
    }

    fn run<S: ObjectStore>(mut self, solver: &mut SizeSolver<S>, todo: &mut ToDoList) -> Result<()> {
        if solver.cache.commits.contains_key(&self.oid) {
            return Ok(());
        }
        let mut subtasks = ToDoList::new();
        match self.queue(solver, &mut subtasks)? {
            Queued::Done((object_size, parent_count)) => {
                solver.record_commit(self.oid, self.size, object_size, parent_count);
            }
            Queued::NotYetKnown => {
                todo.push(Task::Commit(self));
                todo.push_all(&mut subtasks);
            }
        }
        Ok(())
    }

    fn queue<S: ObjectStore>(
        &mut self,
        solver: &mut SizeSolver<S>,
        subtasks: &mut ToDoList,
    ) -> Result<Queued<(Count, Count)>> {
        let commit = match self.commit.take() {
            Some(commit) => commit,
            None => {
                if solver.preloaded {
                    debug!("commit {} was not covered by preload; reading it on demand", self.oid);
                }
                solver
                    .store
                    .read_commit(&self.oid)
                    .with_context(|| format!("Failed to read commit {}", self.oid))?
            }
        };

        // Until the root tree is resolved the parents are not inspected, so
        // a long linear history does not pile up half-loaded commits.
        match solver.cache.trees.get(&commit.tree) {
            Some(tree) => {
                let tree = *tree;
                self.size.add_tree(&tree);
            }
            None => {
                let data = solver
                    .store
                    .read_tree(&commit.tree)
                    .with_context(|| format!("Failed to read root tree of commit {}", self.oid))?;
                subtasks.push(Task::Tree(TreeTask::new(commit.tree, data)));
                self.commit = Some(commit);
                return Ok(Queued::NotYetKnown);
            }
        }

        let mut missing = false;
        for parent_oid in &commit.parents {
            match solver.cache.commits.get(parent_oid) {
                Some(parent) => {
                    let parent = *parent;
                    self.size.add_parent(&parent);
                }
                None => {
                    subtasks.push(Task::Commit(CommitTask::new(*parent_oid)));
                    missing = true;
                }
            }
        }
        if missing {
            self.commit = Some(commit);
            return Ok(Queued::NotYetKnown);
        }

        // The commit itself counts; a root commit has depth 1.
        self.size.max_ancestor_depth.adjust_max(Count::new(1));
        let object_size = Count::clamped(commit.size);
        let parent_count = Count::clamped(commit.parents.len() as u64);
        Ok(Queued::Done((object_size, parent_count)))
    }
}

/// An annotated tag waiting on its referent.
pub(crate) struct TagTask {
    pub(crate) oid: ObjectId,
    tag: Option<TagData>,
    size: TagSize,
}

impl TagTask {
    pub(crate) fn new(oid: ObjectId) -> Self {
        TagTask {
            oid,
            tag: None,
            size: TagSize::default(),
        }
    }

    fn run<S: ObjectStore>(mut self, solver: &mut SizeSolver<S>, todo: &mut ToDoList) -> Result<()> {
        if solver.cache.tags.contains_key(&self.oid) {
            return Ok(());
        }
        let mut subtasks = ToDoList::new();
        match self.queue(solver, &mut subtasks)? {
            Queued::Done(object_size) => {
                solver.record_tag(self.oid, self.size, object_size);
            }
            Queued::NotYetKnown => {
                todo.push(Task::Tag(self));
                todo.push_all(&mut subtasks);
            }
        }
        Ok(())
    }

    fn queue<S: ObjectStore>(
        &mut self,
        solver: &mut SizeSolver<S>,
        subtasks: &mut ToDoList,
    ) -> Result<Queued<Count>> {
        let tag = match self.tag {
            Some(tag) => tag,
            None => {
                let tag = solver
                    .store
                    .read_tag(&self.oid)
                    .with_context(|| format!("Failed to read tag {}", self.oid))?;
                self.tag = Some(tag);
                tag
            }
        };

        match tag.referent_kind {
            ObjectKind::Tag => match solver.cache.tags.get(&tag.referent) {
                Some(referent) => self.size.tag_depth.add(referent.tag_depth),
                None => {
                    subtasks.push(Task::Tag(TagTask::new(tag.referent)));
                    return Ok(Queued::NotYetKnown);
                }
            },
            ObjectKind::Commit => {
                if !solver.cache.commits.contains_key(&tag.referent) {
                    subtasks.push(Task::Commit(CommitTask::new(tag.referent)));
                    return Ok(Queued::NotYetKnown);
                }
            }
            ObjectKind::Tree => {
                if !solver.cache.trees.contains_key(&tag.referent) {
                    let data = solver
                        .store
                        .read_tree(&tag.referent)
                        .with_context(|| format!("Failed to read tree referent of tag {}", self.oid))?;
                    subtasks.push(Task::Tree(TreeTask::new(tag.referent, data)));
                    return Ok(Queued::NotYetKnown);
                }
            }
            ObjectKind::Blob => {
                // Blob referents are leaves: the blob cache answers, or a
                // single header read does. No deferral needed.
                solver.blob_size_of(&tag.referent)?;
            }
        }

        Ok(Queued::Done(Count::clamped(tag.size)))
    }
}
