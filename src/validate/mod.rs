//! Post-generation validation of an output tree.
//!
//! Two kinds of requirement:
//! - every configured required path exists under the root;
//! - when enabled and at least one generated file matches `applies_to`, the
//!   type check command exits successfully.
//!
//! A checker binary that is not installed is recorded as a warning and does
//! not fail the verdict.

mod command;

#[cfg(test)]
mod tests;

pub use command::{CommandOutcome, FAILURE_MAX_CHARS, FAILURE_MAX_LINES, run_checker, truncate_output};

use crate::config::TypeCheckConfig;
use crate::error::{GenError, Result};
use crate::fs::list_files;
use crate::log::RunLog;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use std::time::Duration;

/// One checked requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub satisfied: bool,
    pub detail: Option<String>,
}

/// Outcome of validating a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub checks: Vec<Requirement>,
    /// Soft findings that do not affect the verdict.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn unmet(&self) -> usize {
        self.checks.iter().filter(|c| !c.satisfied).count()
    }

    pub fn passed(&self) -> bool {
        self.unmet() == 0
    }

    /// Convert a failing verdict into [`GenError::Validation`].
    pub fn into_result(self) -> Result<ValidationReport> {
        if self.passed() {
            return Ok(self);
        }
        let detail = self
            .checks
            .iter()
            .filter(|c| !c.satisfied)
            .map(|c| match &c.detail {
                Some(d) => format!("{} ({})", c.name, first_line(d)),
                None => c.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        Err(GenError::Validation {
            unmet: self.unmet(),
            detail,
        })
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Validate the tree at `root`.
///
/// `type_check` is consulted only when its `enabled` flag is set. Errors are
/// reserved for an unreadable tree or an invalid glob; unmet requirements are
/// reported in the returned report.
pub fn validate_tree(
    root: &Path,
    required_paths: &[String],
    type_check: &TypeCheckConfig,
    log: &RunLog,
) -> Result<ValidationReport> {
    if !root.is_dir() {
        return Err(GenError::Io(format!(
            "output root '{}' is not a directory",
            root.display()
        )));
    }

    let mut report = ValidationReport::default();

    for path in required_paths {
        let present = root.join(path).exists();
        report.checks.push(Requirement {
            name: format!("required path {}", path),
            satisfied: present,
            detail: (!present).then(|| "missing".to_string()),
        });
    }

    if type_check.enabled {
        check_types(root, type_check, log, &mut report)?;
    }

    for check in &report.checks {
        if check.satisfied {
            log.info(format!("{}: ok", check.name));
        } else {
            log.warn(format!(
                "{}: FAILED\n{}",
                check.name,
                check.detail.as_deref().unwrap_or("")
            ));
        }
    }

    Ok(report)
}

fn check_types(
    root: &Path,
    config: &TypeCheckConfig,
    log: &RunLog,
    report: &mut ValidationReport,
) -> Result<()> {
    let globs = build_globset(&config.applies_to)?;
    let applicable = list_files(root)?
        .into_iter()
        .filter(|f| globs.is_match(f))
        .count();

    if applicable == 0 {
        log.info(format!(
            "type check skipped: no files match {}",
            config.applies_to.join(", ")
        ));
        return Ok(());
    }

    log.info(format!(
        "running type check `{}` over {} file(s)",
        config.command, applicable
    ));
    let name = format!("type check `{}`", config.command);
    match run_checker(&config.command, root, Duration::from_secs(config.timeout_secs)) {
        CommandOutcome::Passed => report.checks.push(Requirement {
            name,
            satisfied: true,
            detail: None,
        }),
        CommandOutcome::Failed(detail) => report.checks.push(Requirement {
            name,
            satisfied: false,
            detail: Some(detail),
        }),
        CommandOutcome::NotFound(detail) => {
            log.warn(detail.clone());
            report.warnings.push(detail);
        }
    }
    Ok(())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let normalized = pattern.trim().replace('\\', "/");
        if normalized.is_empty() {
            continue;
        }
        let glob = Glob::new(&normalized).map_err(|e| {
            GenError::UserError(format!(
                "invalid type_check.applies_to pattern '{}': {}",
                pattern, e
            ))
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| GenError::UserError(format!("invalid type_check.applies_to patterns: {}", e)))
}
