// Solver integration tests
// Exercises the size solver against real (temporary) git repositories

mod common;

use repogauge::model::{HistorySize, ObjectSize};
use repogauge::repository::{GitObjectStore, ObjectStore, RepoScanner, SizeSolver};

fn open_store(path: &std::path::Path) -> GitObjectStore {
    GitObjectStore::open(path).unwrap()
}

fn scan_all(path: &std::path::Path) -> HistorySize {
    RepoScanner::quiet().scan(open_store(path), |_| true).unwrap()
}

#[test]
fn test_empty_repository_rolls_up_to_zero() {
    let (_dir, repo_path, _repo) = common::create_test_repo();

    let history = scan_all(&repo_path);

    assert_eq!(history, HistorySize::default());
}

#[test]
fn test_reference_to_single_blob() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let blob = repo.blob(&[7u8; 100]).unwrap();
    common::plain_reference(&repo, "refs/misc/raw", blob);

    let history = scan_all(&repo_path);

    assert_eq!(history.unique_blob_count.get(), 1);
    assert_eq!(history.max_blob_size.get(), 100);
    assert_eq!(history.reference_count.get(), 1);
    assert_eq!(history.references_to_blobs.get(), 1);
    assert_eq!(history.unique_tree_count.get(), 0);
    assert_eq!(history.unique_commit_count.get(), 0);
    assert_eq!(history.unique_tag_count.get(), 0);
    assert_eq!(history.max_path_depth.get(), 0);
}

#[test]
fn test_commit_with_three_blobs() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    common::add_commit(
        &repo,
        &[
            ("a.txt", &[b'a'; 10]),
            ("b.txt", &[b'b'; 20]),
            ("c.txt", &[b'c'; 30]),
        ],
        "three blobs",
    );

    let history = scan_all(&repo_path);

    assert_eq!(history.unique_blob_count.get(), 3);
    assert_eq!(history.unique_tree_count.get(), 1);
    assert_eq!(history.unique_commit_count.get(), 1);
    assert_eq!(history.max_path_depth.get(), 2);
    assert_eq!(history.max_expanded_blob_count.get(), 3);
    assert_eq!(history.max_expanded_blob_size.get(), 60);
    assert_eq!(history.max_tree_entries.get(), 3);
    assert_eq!(history.max_ancestor_depth.get(), 1);
    assert_eq!(history.references_to_commits.get(), 1);
}

#[test]
fn test_nested_directories_deepen_paths() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    common::add_commit(
        &repo,
        &[
            ("a.txt", b"top".as_slice()),
            ("src/lib.rs", b"pub mod x;".as_slice()),
            ("src/deep/more/file.rs", b"fn f() {}".as_slice()),
        ],
        "nested",
    );

    let history = scan_all(&repo_path);

    // root -> src -> deep -> more -> file.rs
    assert_eq!(history.max_path_depth.get(), 5);
    assert_eq!(history.max_expanded_tree_count.get(), 4);
    assert_eq!(history.max_expanded_blob_count.get(), 3);
    assert_eq!(history.unique_tree_count.get(), 4);
}

#[test]
fn test_linear_history_shares_one_tree() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    for i in 0..5 {
        common::add_commit(
            &repo,
            &[("file.txt", b"stable content".as_slice())],
            &format!("commit {i}"),
        );
    }

    let history = scan_all(&repo_path);

    assert_eq!(history.unique_commit_count.get(), 5);
    assert_eq!(history.max_ancestor_depth.get(), 5);
    assert_eq!(history.unique_tree_count.get(), 1);
    assert_eq!(history.unique_blob_count.get(), 1);
    assert_eq!(history.max_parent_count.get(), 1);
}

#[test]
fn test_diamond_history_depth_and_unique_counts() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let a = common::add_commit(&repo, &[("f.txt", b"base".as_slice())], "A");
    let tree = repo.find_commit(a).unwrap().tree_id();
    let b = common::commit_tree(&repo, tree, &[a], "B", None);
    let c = common::commit_tree(&repo, tree, &[a], "C", None);
    let d = common::commit_tree(&repo, tree, &[b, c], "D", Some("refs/heads/merged"));

    let history = scan_all(&repo_path);
    assert_eq!(history.unique_commit_count.get(), 4);
    assert_eq!(history.max_ancestor_depth.get(), 3);
    assert_eq!(history.max_parent_count.get(), 2);

    // Sizing the merge directly reports the longest chain through it.
    let mut solver = SizeSolver::without_preload(open_store(&repo_path));
    match solver.object_size(&d.to_string()).unwrap() {
        ObjectSize::Commit(commit) => assert_eq!(commit.max_ancestor_depth.get(), 3),
        other => panic!("expected a commit size, got {other:?}"),
    }
    assert_eq!(solver.history().unique_commit_count.get(), 4);
}

#[test]
fn test_annotated_tag_chain_depths() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let commit = common::add_commit(&repo, &[("f.txt", b"content".as_slice())], "tagged");
    let t3 = common::annotated_tag(&repo, "t3", commit, "points at the commit");
    let t2 = common::annotated_tag(&repo, "t2", t3, "points at t3");
    common::annotated_tag(&repo, "t1", t2, "points at t2");

    let history = scan_all(&repo_path);
    assert_eq!(history.unique_tag_count.get(), 3);
    assert_eq!(history.max_tag_depth.get(), 3);
    assert_eq!(history.references_to_tags.get(), 3);
    assert_eq!(history.references_to_commits.get(), 1);

    let mut solver = SizeSolver::without_preload(open_store(&repo_path));
    for (name, depth) in [("refs/tags/t1", 3), ("refs/tags/t2", 2), ("refs/tags/t3", 1)] {
        match solver.object_size(name).unwrap() {
            ObjectSize::Tag(tag) => assert_eq!(tag.tag_depth.get(), depth, "{name}"),
            other => panic!("expected a tag size for {name}, got {other:?}"),
        }
    }
}

#[test]
fn test_symlink_and_gitlink_entries_are_leaves() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let base = common::add_commit(&repo, &[("README", b"hello".as_slice())], "base");

    let file = repo.blob(b"contents").unwrap();
    let link_target = repo.blob(b"README").unwrap();
    let tree = common::build_tree(
        &repo,
        &[
            ("file.txt", file, 0o100644),
            ("link", link_target, 0o120000),
            ("vendor", base, 0o160000),
        ],
    );
    common::commit_tree(&repo, tree, &[base], "special entries", Some("refs/heads/special"));

    let history = scan_all(&repo_path);

    assert_eq!(history.max_expanded_link_count.get(), 1);
    assert_eq!(history.max_expanded_submodule_count.get(), 1);
    // The gitlink is not recursed into, so the special tree stays flat.
    assert_eq!(history.max_path_depth.get(), 2);
    assert_eq!(history.max_tree_entries.get(), 3);
}

#[test]
fn test_reference_to_tree_counts_expanded_totals() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let commit = common::add_commit(
        &repo,
        &[("a.txt", &[b'x'; 40]), ("b.txt", &[b'y'; 2])],
        "snapshot",
    );
    let tree = repo.find_commit(commit).unwrap().tree_id();
    common::plain_reference(&repo, "refs/misc/snapshot", tree);

    let history = scan_all(&repo_path);

    assert_eq!(history.references_to_trees.get(), 1);
    assert_eq!(history.expanded_tree_count.get(), 1);
    assert_eq!(history.expanded_blob_count.get(), 2);
    assert_eq!(history.expanded_blob_size.get(), 42);
    // The same tree reached through the commit does not add to the totals.
    assert_eq!(history.unique_tree_count.get(), 1);
}

#[test]
fn test_resolving_a_reference_twice_changes_nothing_but_ref_counts() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    common::add_commit(&repo, &[("f.txt", b"data".as_slice())], "only");

    let mut solver = SizeSolver::new(open_store(&repo_path)).unwrap();
    let refs: Vec<_> = solver
        .store()
        .iter_references()
        .unwrap()
        .collect::<anyhow::Result<_>>()
        .unwrap();
    assert_eq!(refs.len(), 1);

    let first = solver.reference_size(&refs[0]).unwrap();
    let unique_commits = solver.history().unique_commit_count;
    let second = solver.reference_size(&refs[0]).unwrap();

    assert_eq!(first, second);
    assert_eq!(solver.history().unique_commit_count, unique_commits);
    assert_eq!(solver.history().reference_count.get(), 2);
}
