//! Per-run path resolution for mdxgen.
//!
//! Every run gets an id of the form `<UTC timestamp>-<host>-<pid>`. The id
//! names the run's diagnostics directory under the state dir and, unless an
//! explicit output directory is given, the output root:
//!
//! ```text
//! <state_dir>/
//!   mdxgen.log                  append-only run log
//!   cache/<source>.mdx          prompt cache, one file per remote source
//!   runs/<run_id>/response.md   raw model response
//! <output_base>/<run_id>/       generated tree
//! ```
//!
//! Relative config paths are resolved against the invocation directory.

use crate::config::Config;
use crate::error::{GenError, Result};
use chrono::{DateTime, Utc};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the log file within the state directory.
pub const LOG_FILE_NAME: &str = "mdxgen.log";

/// Resolved, absolute paths for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub state_dir: PathBuf,
    pub run_dir: PathBuf,
    pub output_root: PathBuf,
}

impl RunContext {
    /// Resolve from the current working directory with a fresh run id.
    pub fn resolve(config: &Config, explicit_out: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            GenError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Ok(Self::resolve_from(&cwd, config, explicit_out, new_run_id(Utc::now())))
    }

    /// Resolve against `cwd` with a given run id.
    pub fn resolve_from(
        cwd: &Path,
        config: &Config,
        explicit_out: Option<&Path>,
        run_id: String,
    ) -> Self {
        let state_dir = cwd.join(&config.state_dir);
        let run_dir = state_dir.join("runs").join(&run_id);
        let output_root = match explicit_out {
            Some(out) => cwd.join(out),
            None => cwd.join(&config.output_base).join(&run_id),
        };

        Self {
            run_id,
            state_dir,
            run_dir,
            output_root,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join(LOG_FILE_NAME)
    }

    pub fn response_file(&self) -> PathBuf {
        self.run_dir.join("response.md")
    }

    /// Cache file for a remote prompt source.
    pub fn prompt_cache(&self, source_ref: &str) -> PathBuf {
        self.state_dir
            .join("cache")
            .join(format!("{}.mdx", cache_key(source_ref)))
    }
}

/// `<UTC timestamp>-<host>-<pid>`, e.g. `20261015T093012Z-buildbox-4121`.
pub fn new_run_id(now: DateTime<Utc>) -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!(
        "{}-{}-{}",
        now.format("%Y%m%dT%H%M%SZ"),
        sanitize(&host),
        std::process::id()
    )
}

/// Keep ASCII alphanumerics, `.`, `_` and `-`; replace everything else.
fn sanitize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

fn cache_key(source_ref: &str) -> String {
    let without_scheme = source_ref
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let key: String = without_scheme
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let key = key.trim_matches('_');
    if key.len() > 120 {
        key[key.len() - 120..].to_string()
    } else {
        key.to_string()
    }
}
