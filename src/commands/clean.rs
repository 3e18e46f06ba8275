//! Implementation of the `mdxgen clean` command.

use crate::cli::CleanArgs;
use crate::config::Config;
use crate::error::{GenError, Result};
use crate::mdx::MdxPreprocessor;
use std::fs;
use std::path::Path;

/// Execute the `mdxgen clean` command. The cleaned document goes to stdout.
pub fn cmd_clean(args: CleanArgs) -> Result<()> {
    let config = Config::resolve(args.config.as_deref())?;
    print!("{}", clean_file(&args.file, &config)?);
    Ok(())
}

pub(super) fn clean_file(path: &Path, config: &Config) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        GenError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })?;
    Ok(MdxPreprocessor::from_config(config)?.clean(&text))
}
