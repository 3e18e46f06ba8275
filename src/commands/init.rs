//! Implementation of the `mdxgen init` command.
//!
//! Writes a commented `mdxgen.yaml` template and prepares the state
//! directory. Running it again never overwrites an existing config.

use crate::config::{Config, DEFAULT_CONFIG_FILE, config_template};
use crate::error::{GenError, Result};
use crate::fs::atomic_write_file;
use std::fs;
use std::path::Path;

/// What `init` did in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct InitOutcome {
    pub config_created: bool,
    pub gitignore_created: bool,
}

/// Execute the `mdxgen init` command in the current directory.
pub fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        GenError::UserError(format!("failed to get current working directory: {}", e))
    })?;

    let outcome = init_in(&cwd)?;

    if outcome.config_created {
        println!("Created {}", DEFAULT_CONFIG_FILE);
    } else {
        println!("{} already exists; left unchanged", DEFAULT_CONFIG_FILE);
    }
    println!();
    println!("Next steps:");
    println!("  1. Set prompt_source in {}", DEFAULT_CONFIG_FILE);
    println!("  2. export GEMINI_API_KEY=<your API key>");
    println!("  3. mdxgen generate");

    Ok(())
}

pub(super) fn init_in(dir: &Path) -> Result<InitOutcome> {
    let config_path = dir.join(DEFAULT_CONFIG_FILE);
    let config_created = !config_path.exists();
    if config_created {
        atomic_write_file(&config_path, &config_template())?;
    }

    // The state dir holds logs, caches and raw responses; keep it out of git.
    let config = Config::load(&config_path)?;
    let state_dir = dir.join(&config.state_dir);
    fs::create_dir_all(&state_dir).map_err(|e| {
        GenError::Io(format!(
            "failed to create state directory '{}': {}",
            state_dir.display(),
            e
        ))
    })?;

    let gitignore_path = state_dir.join(".gitignore");
    let gitignore_created = !gitignore_path.exists();
    if gitignore_created {
        atomic_write_file(&gitignore_path, "*\n")?;
    }

    Ok(InitOutcome {
        config_created,
        gitignore_created,
    })
}
