//! Implementation of the `mdxgen validate` command.

use super::merge_required;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::log::RunLog;
use crate::validate::validate_tree;

/// Execute the `mdxgen validate` command.
///
/// Exits with the validation failure code when any requirement is unmet.
pub fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let mut config = Config::resolve(args.config.as_deref())?;
    apply_overrides(&mut config, &args)?;

    let log = RunLog::stderr();
    let report = validate_tree(&args.dir, &config.required_paths, &config.type_check, &log)?;

    for check in &report.checks {
        let mark = if check.satisfied { "ok" } else { "FAIL" };
        println!("  [{}] {}", mark, check.name);
    }
    for warning in &report.warnings {
        println!("  [warn] {}", warning.lines().next().unwrap_or(""));
    }

    let report = report.into_result()?;
    println!();
    println!("Validation passed ({} check(s)).", report.checks.len());
    Ok(())
}

/// Fold command-line flags into the loaded config and re-check it.
pub(super) fn apply_overrides(config: &mut Config, args: &ValidateArgs) -> Result<()> {
    merge_required(&mut config.required_paths, &args.require);
    if args.type_check {
        config.type_check.enabled = true;
    }
    config.validate()
}
