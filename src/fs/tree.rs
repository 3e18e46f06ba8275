//! Output tree lifecycle helpers.
//!
//! The output root is deleted and recreated empty when a run starts, so no file
//! from a previous run survives into the current one.

use crate::error::{GenError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Delete `root` (if present) and recreate it as an empty directory.
///
/// Refuses to wipe a filesystem root or any directory that contains the
/// current working directory.
pub fn recreate_dir(root: &Path) -> Result<()> {
    guard_removal(root)?;

    if root.exists() {
        fs::remove_dir_all(root).map_err(|e| {
            GenError::Io(format!(
                "failed to remove previous output '{}': {}",
                root.display(),
                e
            ))
        })?;
    }

    fs::create_dir_all(root).map_err(|e| {
        GenError::Io(format!(
            "failed to create output directory '{}': {}",
            root.display(),
            e
        ))
    })
}

fn guard_removal(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() || root.parent().is_none() {
        return Err(GenError::UserError(format!(
            "refusing to use '{}' as an output directory",
            root.display()
        )));
    }

    if !root.exists() {
        return Ok(());
    }

    let canonical_root = root.canonicalize().map_err(|e| {
        GenError::Io(format!("failed to resolve '{}': {}", root.display(), e))
    })?;
    if canonical_root.parent().is_none() {
        return Err(GenError::UserError(format!(
            "refusing to use '{}' as an output directory",
            root.display()
        )));
    }

    if let Ok(cwd) = std::env::current_dir()
        && let Ok(cwd) = cwd.canonicalize()
        && cwd.starts_with(&canonical_root)
    {
        return Err(GenError::UserError(format!(
            "refusing to recreate '{}': it contains the current working directory\n\
             Fix: choose an output directory outside the project you are working in.",
            root.display()
        )));
    }

    Ok(())
}

/// List every regular file under `root` as a `/`-separated relative path, sorted.
pub fn list_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| {
        GenError::Io(format!("failed to read directory '{}': {}", dir.display(), e))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            GenError::Io(format!("failed to read directory '{}': {}", dir.display(), e))
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| {
            GenError::Io(format!("failed to stat '{}': {}", path.display(), e))
        })?;

        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            out.push(relative_slash_path(root, &path));
        }
    }

    Ok(())
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}
