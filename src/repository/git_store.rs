//! gix-backed object store
//!
//! Adapts a real repository to the `ObjectStore` contract. Object payloads
//! are decoded into scratch buffers per call; header lookups go through
//! the repository so packed and loose objects behave the same.

use anyhow::{Context, Result};
use gix::ObjectId;
use gix::prelude::FindExt;
use smallvec::SmallVec;
use std::path::Path;
use tracing::warn;

use crate::model::ObjectKind;
use super::store::{CommitData, ObjectHeader, ObjectStore, Reference, TagData, TreeData, TreeEntry};

pub struct GitObjectStore {
    repo: gix::Repository,
}

impl GitObjectStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::open(path.as_ref()).context("Failed to open git repository")?;
        Ok(Self { repo })
    }

    pub fn from_repo(repo: gix::Repository) -> Self {
        Self { repo }
    }

    /// Follow annotated tags from a reference target down to the object
    /// they ultimately name.
    fn peel_to_commit(&self, mut oid: ObjectId) -> Result<Option<ObjectId>> {
        loop {
            match self.object_header(&oid)?.kind {
                ObjectKind::Commit => return Ok(Some(oid)),
                ObjectKind::Tag => oid = self.read_tag(&oid)?.referent,
                _ => return Ok(None),
            }
        }
    }
}

fn object_kind(kind: gix::object::Kind) -> ObjectKind {
    match kind {
        gix::object::Kind::Blob => ObjectKind::Blob,
        gix::object::Kind::Tree => ObjectKind::Tree,
        gix::object::Kind::Commit => ObjectKind::Commit,
        gix::object::Kind::Tag => ObjectKind::Tag,
    }
}

/// Reconstruct classic mode bits from gix's entry kind, so entry
/// classification stays a plain mask test everywhere else.
fn entry_mode_bits(mode: gix::objs::tree::EntryMode) -> u32 {
    use gix::objs::tree::EntryKind;
    match mode.kind() {
        EntryKind::Tree => 0o040000,
        EntryKind::Blob => 0o100644,
        EntryKind::BlobExecutable => 0o100755,
        EntryKind::Link => 0o120000,
        EntryKind::Commit => 0o160000,
    }
}

impl ObjectStore for GitObjectStore {
    fn iter_objects(&self) -> Result<Box<dyn Iterator<Item = Result<ObjectHeader>> + '_>> {
        use gix::odb::store::iter::Ordering;

        let iter = self
            .repo
            .objects
            .iter()
            .context("Failed to iterate object database")?
            .with_ordering(Ordering::PackAscendingOffsetThenLooseLexicographical);
        Ok(Box::new(iter.map(move |oid| {
            let oid = oid.context("Failed to read object id")?;
            self.object_header(&oid)
        })))
    }

    fn iter_commits(&self) -> Result<Box<dyn Iterator<Item = Result<(ObjectId, CommitData)>> + '_>> {
        // Tips are every reference target that peels to a commit.
        let mut tips: Vec<ObjectId> = Vec::new();
        let platform = self.repo.references().context("Failed to load references")?;
        for reference in platform.all().context("Failed to iterate references")? {
            let reference = match reference {
                Ok(reference) => reference,
                Err(err) => {
                    warn!("Skipping undecodable reference: {err}");
                    continue;
                }
            };
            let Some(id) = reference.try_id() else {
                continue;
            };
            if let Some(commit) = self.peel_to_commit(id.detach())? {
                tips.push(commit);
            }
        }
        tips.sort_unstable();
        tips.dedup();
        if tips.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }

        let mut commits: Vec<ObjectId> = Vec::new();
        let walk = self.repo.rev_walk(tips);
        for info in walk.all().context("Failed to walk commits")? {
            let info = info.context("Failed to read commit during walk")?;
            commits.push(info.id);
        }
        // The walk reaches a parent only through its children, so the
        // reversed order yields parents first.
        commits.reverse();

        Ok(Box::new(commits.into_iter().map(move |oid| {
            let commit = self.read_commit(&oid)?;
            Ok((oid, commit))
        })))
    }

    fn iter_references(&self) -> Result<Box<dyn Iterator<Item = Result<Reference>> + '_>> {
        let mut out: Vec<Reference> = Vec::new();
        let platform = self.repo.references().context("Failed to load references")?;
        for reference in platform.all().context("Failed to iterate references")? {
            let reference = match reference {
                Ok(reference) => reference,
                Err(err) => {
                    warn!("Skipping undecodable reference: {err}");
                    continue;
                }
            };
            let name = reference.name().as_bstr().to_string();
            let Some(id) = reference.try_id() else {
                warn!("Skipping symbolic reference {name}");
                continue;
            };
            let oid = id.detach();
            let header = self.object_header(&oid)?;
            out.push(Reference {
                name,
                oid,
                kind: header.kind,
                size: header.size,
            });
        }
        Ok(Box::new(out.into_iter().map(Ok)))
    }

    fn read_header(&self, spec: &str) -> Result<ObjectHeader> {
        let id = self
            .repo
            .rev_parse_single(spec)
            .with_context(|| format!("Failed to resolve {spec:?}"))?;
        self.object_header(&id.detach())
    }

    fn object_header(&self, oid: &ObjectId) -> Result<ObjectHeader> {
        let header = self
            .repo
            .find_header(*oid)
            .with_context(|| format!("Failed to read object header for {oid}"))?;
        Ok(ObjectHeader {
            oid: *oid,
            kind: object_kind(header.kind()),
            size: header.size(),
        })
    }

    fn read_tree(&self, oid: &ObjectId) -> Result<TreeData> {
        let mut buf = Vec::new();
        let tree = self
            .repo
            .objects
            .find_tree(oid, &mut buf)
            .with_context(|| format!("Failed to read tree {oid}"))?;
        let entries = tree
            .entries
            .iter()
            .map(|entry| TreeEntry {
                name: entry.filename.to_owned(),
                mode: entry_mode_bits(entry.mode),
                oid: entry.oid.to_owned(),
            })
            .collect();
        Ok(TreeData {
            entries,
            size: buf.len() as u64,
        })
    }

    fn read_commit(&self, oid: &ObjectId) -> Result<CommitData> {
        let mut buf = Vec::new();
        let commit = self
            .repo
            .objects
            .find_commit(oid, &mut buf)
            .with_context(|| format!("Failed to read commit {oid}"))?;
        let tree = commit.tree();
        let parents: SmallVec<[ObjectId; 2]> = commit.parents().collect();
        drop(commit);
        Ok(CommitData {
            tree,
            parents,
            size: buf.len() as u64,
        })
    }

    fn read_tag(&self, oid: &ObjectId) -> Result<TagData> {
        let mut buf = Vec::new();
        let tag = self
            .repo
            .objects
            .find_tag(oid, &mut buf)
            .with_context(|| format!("Failed to read tag {oid}"))?;
        let referent = ObjectId::from_hex(tag.target.as_ref())
            .with_context(|| format!("Malformed target in tag {oid}"))?;
        Ok(TagData {
            referent,
            referent_kind: object_kind(tag.target_kind),
            size: buf.len() as u64,
        })
    }
}
