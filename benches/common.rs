// Shared benchmark helpers
// Functions here are used across different benchmark files
#![allow(dead_code)]

use git2::{Repository, Signature};
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary git repository for benchmarks
pub fn create_bench_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Bench User").unwrap();
    config.set_str("user.email", "bench@example.com").unwrap();

    (dir, repo_path, repo)
}

/// Add files and create a commit
pub fn add_commit(repo: &Repository, files: &[(String, Vec<u8>)], message: &str) -> git2::Oid {
    let sig = Signature::now("Bench User", "bench@example.com").unwrap();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, content).unwrap();
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

/// Generate files spread over nested directories
pub fn generate_files(num_files: usize) -> Vec<(String, Vec<u8>)> {
    (0..num_files)
        .map(|i| {
            let path = format!("src/dir_{}/file_{}.rs", i % 20, i);
            let content = format!("// File {}\nfn func_{}() {{}}\n", i, i).into_bytes();
            (path, content)
        })
        .collect()
}

/// Build a repository with `commits` commits, each touching a few files
pub fn generate_history(repo: &Repository, commits: usize) {
    for c in 0..commits {
        let files: Vec<(String, Vec<u8>)> = (0..4)
            .map(|f| {
                let path = format!("src/dir_{}/file_{}.rs", c % 20, f);
                let content = format!("// Revision {}\nfn func_{}() {{}}\n", c, f).into_bytes();
                (path, content)
            })
            .collect();
        add_commit(repo, &files, &format!("commit {c}"));
    }
}
