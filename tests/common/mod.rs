// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary git repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    // Configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

pub fn signature() -> Signature<'static> {
    Signature::now("Test User", "test@example.com").unwrap()
}

/// Add files to the repository and create a commit on HEAD
pub fn add_commit(repo: &Repository, files: &[(&str, &[u8])], message: &str) -> Oid {
    let sig = signature();

    let mut index = repo.index().unwrap();

    for (path, content) in files {
        // Write file to working directory
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();

        // Add to index
        index.add_path(std::path::Path::new(path)).unwrap();
    }

    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    if let Some(parent) = parent {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    } else {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap()
    }
}

/// Create a commit from an existing tree without touching the index.
/// Pass `update_ref` to create or move a named reference.
pub fn commit_tree(
    repo: &Repository,
    tree: Oid,
    parents: &[Oid],
    message: &str,
    update_ref: Option<&str>,
) -> Oid {
    let sig = signature();
    let tree = repo.find_tree(tree).unwrap();
    let parent_commits: Vec<git2::Commit> = parents
        .iter()
        .map(|oid| repo.find_commit(*oid).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();
    repo.commit(update_ref, &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Build a tree directly from (name, oid, filemode) entries.
/// Modes: 0o100644 blob, 0o040000 tree, 0o120000 symlink, 0o160000 gitlink.
pub fn build_tree(repo: &Repository, entries: &[(&str, Oid, i32)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, oid, mode) in entries {
        builder.insert(name, *oid, *mode).unwrap();
    }
    builder.write().unwrap()
}

/// Create an annotated tag (and its refs/tags/<name> reference).
/// The target may itself be a tag, which is how tag chains are built.
pub fn annotated_tag(repo: &Repository, name: &str, target: Oid, message: &str) -> Oid {
    let object = repo.find_object(target, None).unwrap();
    repo.tag(name, &object, &signature(), message, false)
        .unwrap()
}

/// Create or update a plain reference pointing at any object.
pub fn plain_reference(repo: &Repository, name: &str, target: Oid) {
    repo.reference(name, target, true, "test reference").unwrap();
}
