//! Tests for output tree validation.

use super::*;
use crate::extract::{extract_blocks, write_blocks};
use crate::log::Level;
use std::fs;
use tempfile::TempDir;

fn disabled() -> TypeCheckConfig {
    TypeCheckConfig::default()
}

fn type_check(command: &str) -> TypeCheckConfig {
    TypeCheckConfig {
        enabled: true,
        command: command.to_string(),
        ..Default::default()
    }
}

fn required(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[test]
fn test_tsx_page_without_manifest_fails() {
    let temp = TempDir::new().unwrap();
    let extraction = extract_blocks(
        "```tsx file=\"src/app/page.tsx\"\nexport default function Page(){}\n```",
    );
    write_blocks(temp.path(), &extraction.blocks).unwrap();

    let report = validate_tree(
        temp.path(),
        &required(&["package.json"]),
        &disabled(),
        &RunLog::capture(),
    )
    .unwrap();

    assert!(!report.passed());
    assert_eq!(report.unmet(), 1);
    assert_eq!(report.checks[0].name, "required path package.json");
    assert_eq!(report.checks[0].detail.as_deref(), Some("missing"));

    let err = report.into_result().unwrap_err();
    assert!(matches!(err, GenError::Validation { unmet: 1, .. }));
    assert!(err.to_string().contains("package.json"));
}

#[test]
fn test_all_required_present_passes() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), "{}").unwrap();
    fs::create_dir_all(temp.path().join("src/app")).unwrap();
    fs::write(temp.path().join("src/app/page.tsx"), "").unwrap();

    let report = validate_tree(
        temp.path(),
        &required(&["package.json", "src/app/page.tsx"]),
        &disabled(),
        &RunLog::capture(),
    )
    .unwrap();

    assert!(report.passed());
    assert_eq!(report.checks.len(), 2);
    assert!(report.into_result().is_ok());
}

#[test]
fn test_unmet_count_covers_every_missing_path() {
    let temp = TempDir::new().unwrap();
    let log = RunLog::capture();

    let report = validate_tree(
        temp.path(),
        &required(&["package.json", "tsconfig.json", "README.md"]),
        &disabled(),
        &log,
    )
    .unwrap();

    assert_eq!(report.unmet(), 3);
    assert_eq!(log.messages_at(Level::Warning).len(), 3);
}

#[test]
fn test_no_requirements_passes() {
    let temp = TempDir::new().unwrap();
    let report = validate_tree(temp.path(), &[], &disabled(), &RunLog::capture()).unwrap();
    assert!(report.passed());
    assert!(report.checks.is_empty());
}

#[test]
fn test_missing_root_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = validate_tree(
        &temp.path().join("nope"),
        &[],
        &disabled(),
        &RunLog::capture(),
    )
    .unwrap_err();
    assert!(matches!(err, GenError::Io(_)));
}

#[test]
fn test_type_check_skipped_without_applicable_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.py"), "print(1)").unwrap();

    // Would fail if it ran.
    let report = validate_tree(
        temp.path(),
        &[],
        &type_check("mdxgen-no-such-checker"),
        &RunLog::capture(),
    )
    .unwrap();

    assert!(report.checks.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_missing_checker_is_soft_warning() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("index.ts"), "export {}").unwrap();

    let report = validate_tree(
        temp.path(),
        &[],
        &type_check("mdxgen-no-such-checker --noEmit"),
        &RunLog::capture(),
    )
    .unwrap();

    assert!(report.passed());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("not found"));
}

#[cfg(unix)]
#[test]
fn test_failing_checker_fails_verdict() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/page.tsx"), "").unwrap();

    let report = validate_tree(
        temp.path(),
        &[],
        &type_check("sh -c 'echo \"src/page.tsx(1,1): error TS1005\"; exit 2'"),
        &RunLog::capture(),
    )
    .unwrap();

    assert_eq!(report.unmet(), 1);
    let detail = report.checks[0].detail.as_deref().unwrap();
    assert!(detail.contains("exit code 2"));
    assert!(detail.contains("TS1005"));
}

#[cfg(unix)]
#[test]
fn test_passing_checker_is_recorded() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("index.ts"), "").unwrap();

    let report = validate_tree(temp.path(), &[], &type_check("true"), &RunLog::capture()).unwrap();

    assert_eq!(report.checks.len(), 1);
    assert!(report.checks[0].satisfied);
}

#[test]
fn test_invalid_glob_is_user_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("index.ts"), "").unwrap();
    let config = TypeCheckConfig {
        applies_to: vec!["src/[".to_string()],
        ..type_check("true")
    };

    let err = validate_tree(temp.path(), &[], &config, &RunLog::capture()).unwrap_err();

    assert!(matches!(err, GenError::UserError(_)));
}
