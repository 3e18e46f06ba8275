//! Implementation of the `mdxgen extract` command.

use crate::cli::ExtractArgs;
use crate::error::{GenError, Result};
use crate::extract::{WrittenTree, extract_blocks, write_blocks};
use crate::fs::recreate_dir;
use crate::log::RunLog;
use std::fs;
use std::path::Path;

/// Execute the `mdxgen extract` command.
pub fn cmd_extract(args: ExtractArgs) -> Result<()> {
    let log = RunLog::stderr();
    let tree = extract_response(&args.response_file, &args.out, &log)?;

    println!("Extracted {} file(s) to {}", tree.files.len(), tree.root.display());
    for file in &tree.files {
        println!("  {}", file);
    }
    Ok(())
}

/// Extract a saved response into a freshly recreated `out`.
pub(super) fn extract_response(response_file: &Path, out: &Path, log: &RunLog) -> Result<WrittenTree> {
    let text = fs::read_to_string(response_file).map_err(|e| {
        GenError::UserError(format!(
            "failed to read response file '{}': {}",
            response_file.display(),
            e
        ))
    })?;

    let extraction = extract_blocks(&text);
    for skipped in &extraction.skipped {
        log.warn(format!(
            "skipped fenced block #{} (info '{}'): {}",
            skipped.ordinal, skipped.info, skipped.reason
        ));
    }
    if extraction.has_unterminated() {
        log.warn("response ends inside a fenced block; output may be truncated");
    }
    extraction.require_blocks()?;

    recreate_dir(out)?;
    write_blocks(out, &extraction.blocks)
}
