use crate::layer_build::domain::{PathMutation, PathMutationType};
use crate::ports::outbound::FilesystemTree;
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// Applies every path mutation in declaration order
///
/// # Errors
/// Returns an error naming the mutated path when any mutation fails
pub fn mutate_paths(tree: &mut dyn FilesystemTree, mutations: &[PathMutation]) -> Result<()> {
    for mutation in mutations {
        apply_mutation(tree, mutation)
            .with_context(|| format!("Failed to apply path mutation to {}", mutation.path))?;
    }
    Ok(())
}

fn apply_mutation(tree: &mut dyn FilesystemTree, mutation: &PathMutation) -> Result<()> {
    let path = Path::new(&mutation.path);

    match mutation.mutation_type {
        PathMutationType::Directory => {
            tree.mkdir_all(path, mutation.permissions)?;
            set_attributes(tree, path, mutation)?;
        }
        PathMutationType::EmptyFile => {
            tree.write_file(path, &[], mutation.permissions)?;
            set_attributes(tree, path, mutation)?;
        }
        PathMutationType::Hardlink => {
            tree.hardlink(Path::new(required_source(mutation)?), path)?;
            set_attributes(tree, path, mutation)?;
        }
        PathMutationType::Symlink => {
            tree.symlink(Path::new(required_source(mutation)?), path)?;
        }
        PathMutationType::Permissions => {
            set_attributes(tree, path, mutation)?;
        }
    }

    if mutation.recursive && tree.entry(path)?.is_dir() {
        apply_recursive(tree, path, mutation)?;
    }

    Ok(())
}

fn required_source(mutation: &PathMutation) -> Result<&str> {
    mutation
        .source
        .as_deref()
        .filter(|source| !source.is_empty())
        .ok_or_else(|| anyhow::anyhow!("a {:?} mutation requires a source", mutation.mutation_type))
}

fn set_attributes(tree: &mut dyn FilesystemTree, path: &Path, mutation: &PathMutation) -> Result<()> {
    tree.chmod(path, mutation.permissions)?;
    tree.chown(path, mutation.uid, mutation.gid)
}

/// Symlinks below `dir` are skipped so the mutation never leaves the subtree.
fn apply_recursive(tree: &mut dyn FilesystemTree, dir: &Path, mutation: &PathMutation) -> Result<()> {
    for name in tree.read_dir(dir)? {
        let child = dir.join(name);
        let entry = tree.entry(&child)?;
        if entry.is_symlink() {
            continue;
        }
        let is_dir = entry.is_dir();
        set_attributes(tree, &child, mutation)?;
        if is_dir {
            apply_recursive(tree, &child, mutation)?;
        }
    }
    Ok(())
}
