//! Prompt resolution with a local freshness cache.
//!
//! A source reference is either an `http(s)://` URL or a local path. Local
//! paths are read as-is. URLs go through a single-file cache:
//!
//! | Cache state        | Fetch      | Result                           |
//! |--------------------|------------|----------------------------------|
//! | younger than TTL   | not issued | cached text                      |
//! | missing or stale   | succeeds   | fetched text, cache rewritten    |
//! | stale              | fails      | stale text, WARNING (degraded)   |
//! | missing            | fails      | [`GenError::Unavailable`]        |

mod fetch;


pub use fetch::{Fetcher, HttpFetcher};

use crate::error::{GenError, Result};
use crate::fs::atomic_write_file;
use crate::log::RunLog;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Where a prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOrigin {
    LocalFile,
    FreshCache,
    Remote,
    StaleCache,
}

impl fmt::Display for PromptOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PromptOrigin::LocalFile => "local file",
            PromptOrigin::FreshCache => "fresh cache",
            PromptOrigin::Remote => "remote fetch",
            PromptOrigin::StaleCache => "stale cache",
        };
        write!(f, "{}", s)
    }
}

/// Prompt text and the time it was obtained from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDocument {
    pub text: String,
    pub fetched_at: DateTime<Utc>,
    pub origin: PromptOrigin,
}

pub fn is_remote(source_ref: &str) -> bool {
    source_ref.starts_with("http://") || source_ref.starts_with("https://")
}

/// Resolve `source_ref` into a prompt document.
///
/// `cache_path` and `ttl` only apply to remote sources.
pub fn resolve_prompt(
    source_ref: &str,
    cache_path: &Path,
    ttl: Duration,
    fetcher: &dyn Fetcher,
    log: &RunLog,
) -> Result<PromptDocument> {
    if !is_remote(source_ref) {
        return read_local(Path::new(source_ref), log);
    }

    let cached = read_cache(cache_path);

    if let Some((text, modified)) = &cached {
        let age = age_of(*modified);
        if age < ttl {
            log.info(format!(
                "using cached prompt {} (age {}s, ttl {}s)",
                cache_path.display(),
                age.as_secs(),
                ttl.as_secs()
            ));
            return Ok(PromptDocument {
                text: text.clone(),
                fetched_at: (*modified).into(),
                origin: PromptOrigin::FreshCache,
            });
        }
    }

    log.info(format!("fetching prompt from {}", source_ref));
    match fetcher.fetch(source_ref) {
        Ok(text) => {
            atomic_write_file(cache_path, &text)?;
            log.info(format!(
                "fetched {} bytes, cache updated at {}",
                text.len(),
                cache_path.display()
            ));
            Ok(PromptDocument {
                text,
                fetched_at: Utc::now(),
                origin: PromptOrigin::Remote,
            })
        }
        Err(cause) => match cached {
            Some((text, modified)) => {
                log.warn(format!(
                    "prompt fetch failed ({}); degraded: using stale cache from {}",
                    cause,
                    DateTime::<Utc>::from(modified).to_rfc3339()
                ));
                Ok(PromptDocument {
                    text,
                    fetched_at: modified.into(),
                    origin: PromptOrigin::StaleCache,
                })
            }
            None => Err(GenError::Unavailable(format!(
                "fetch of {} failed and no cached copy exists at {}: {}",
                source_ref,
                cache_path.display(),
                cause
            ))),
        },
    }
}

fn read_local(path: &Path, log: &RunLog) -> Result<PromptDocument> {
    let text = fs::read_to_string(path).map_err(|e| {
        GenError::Unavailable(format!("cannot read prompt file '{}': {}", path.display(), e))
    })?;
    let fetched_at = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    log.info(format!("read prompt from {}", path.display()));
    Ok(PromptDocument {
        text,
        fetched_at,
        origin: PromptOrigin::LocalFile,
    })
}

/// Cached text with its mtime, if the cache file is readable.
fn read_cache(path: &Path) -> Option<(String, SystemTime)> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let text = fs::read_to_string(path).ok()?;
    Some((text, modified))
}

/// A modification time in the future counts as age zero.
fn age_of(modified: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO)
}
