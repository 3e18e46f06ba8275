//! Configuration types and defaults for mdxgen.
//!
//! This module defines nested config sections and the default value functions
//! used by the Config struct.

use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "mdxgen.yaml";

/// Optional static check run against the generated tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeCheckConfig {
    /// Whether to run the check at all.
    pub enabled: bool,

    /// Command line, split with shell-words (e.g. `npx tsc --noEmit`).
    pub command: String,

    /// Glob patterns selecting files the check applies to. The check is skipped
    /// when no generated file matches.
    pub applies_to: Vec<String>,

    /// Seconds before the checker process is killed.
    pub timeout_secs: u64,
}

impl Default for TypeCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_type_check_command(),
            applies_to: default_type_check_globs(),
            timeout_secs: default_type_check_timeout_secs(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
pub(crate) fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
pub(crate) fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
pub(crate) fn default_system_instruction() -> String {
    "You are a code generator. Produce every file of the requested project as a \
     fenced code block whose info string names the language and a file=\"relative/path\" \
     attribute. Do not omit files and do not abbreviate file contents."
        .to_string()
}
pub(crate) fn default_temperature() -> f32 {
    0.7
}
pub(crate) fn default_top_p() -> f32 {
    0.95
}
pub(crate) fn default_max_output_tokens() -> u32 {
    8192
}
pub(crate) fn default_max_attempts() -> u32 {
    3
}
pub(crate) fn default_attempt_timeout_secs() -> u64 {
    300
}
pub(crate) fn default_cache_ttl_minutes() -> u64 {
    60
}
pub(crate) fn default_fetch_timeout_secs() -> u64 {
    30
}
pub(crate) fn default_state_dir() -> String {
    ".mdxgen".to_string()
}
pub(crate) fn default_output_base() -> String {
    "generated".to_string()
}
pub(crate) fn default_reasoning_tag() -> String {
    "Thinking".to_string()
}

/// Non-code UI components removed from prompts and responses.
pub fn default_strip_components() -> Vec<String> {
    [
        "LinearProcessFlow",
        "Quiz",
        "QuickEdit",
        "DeleteFile",
        "MoveFile",
        "AddEnvironmentVariables",
        "AddIntegration",
        "Math",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub(crate) fn default_type_check_command() -> String {
    "npx tsc --noEmit".to_string()
}
pub(crate) fn default_type_check_globs() -> Vec<String> {
    vec!["**/*.ts".to_string(), "**/*.tsx".to_string()]
}
pub(crate) fn default_type_check_timeout_secs() -> u64 {
    300
}
