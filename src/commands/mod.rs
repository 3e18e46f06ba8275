//! Command implementations for mdxgen.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod clean;
mod extract;
mod generate;
mod init;
mod validate;


use crate::cli::Command;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate::cmd_generate(args),
        Command::Extract(args) => extract::cmd_extract(args),
        Command::Clean(args) => clean::cmd_clean(args),
        Command::Validate(args) => validate::cmd_validate(args),
        Command::Init => init::cmd_init(),
    }
}

/// Append `extra` to `paths`, skipping entries already present.
fn merge_required(paths: &mut Vec<String>, extra: &[String]) {
    for path in extra {
        let path = path.trim();
        if !path.is_empty() && !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }
}
