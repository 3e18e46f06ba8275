use super::CodeBlock;
use crate::error::{GenError, Result};
use crate::fs::atomic_write;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Files produced by [`write_blocks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTree {
    pub root: PathBuf,
    /// Distinct relative paths, in order of first write.
    pub files: Vec<String>,
    /// Paths written more than once; the last block won.
    pub overwritten: Vec<String>,
}

/// Write every block under `root`, creating intermediate directories.
///
/// Blocks are written in order, so a later block with the same path replaces
/// an earlier one. The caller prepares `root`; nothing else is removed here.
///
/// A block whose path is also needed as a directory by another block fails
/// the whole write before any file is created.
pub fn write_blocks(root: &Path, blocks: &[CodeBlock]) -> Result<WrittenTree> {
    check_file_dir_conflicts(blocks)?;

    let mut files: Vec<String> = Vec::with_capacity(blocks.len());
    let mut overwritten = Vec::new();

    for block in blocks {
        atomic_write(root.join(&block.path), block.content.as_bytes())?;

        if files.contains(&block.path) {
            if !overwritten.contains(&block.path) {
                overwritten.push(block.path.clone());
            }
        } else {
            files.push(block.path.clone());
        }
    }

    Ok(WrittenTree {
        root: root.to_path_buf(),
        files,
        overwritten,
    })
}

fn check_file_dir_conflicts(blocks: &[CodeBlock]) -> Result<()> {
    let files: HashSet<&str> = blocks.iter().map(|b| b.path.as_str()).collect();

    for block in blocks {
        let dirs = block.path.match_indices('/').map(|(i, _)| &block.path[..i]);
        for dir in dirs {
            if files.contains(dir) {
                return Err(GenError::Io(format!(
                    "cannot write '{}': '{}' is also a generated file\n\
                     Fix: rename one of the two blocks in the response.",
                    block.path, dir
                )));
            }
        }
    }

    Ok(())
}
