//! Test helpers for git-backed writers.

#![cfg(test)]

use git2::{Repository, Signature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A bare remote on `master` holding one commit, cloned from a seed repo
/// inside `dir`.
pub fn bare_remote(dir: &TempDir) -> PathBuf {
    let seed_path = dir.path().join("seed");
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("master");
    let seed = Repository::init_opts(&seed_path, &opts).expect("Failed to init seed repo");
    std::fs::write(seed_path.join("README.md"), "# site").expect("Failed to write file");

    let mut index = seed.index().expect("Failed to get index");
    index
        .add_path(Path::new("README.md"))
        .expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree_oid = index.write_tree().expect("Failed to write tree");
    let tree = seed.find_tree(tree_oid).expect("Failed to find tree");
    let sig = Signature::now("Seed", "seed@example.com").expect("Failed to create signature");
    seed.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .expect("Failed to create commit");

    let bare_path = dir.path().join("remote.git");
    git2::build::RepoBuilder::new()
        .bare(true)
        .clone(
            seed_path.to_str().expect("utf-8 temp path"),
            &bare_path,
        )
        .expect("Failed to clone bare remote");
    bare_path
}
