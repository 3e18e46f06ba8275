//! Configuration model for mdxgen.
//!
//! This module defines the Config struct that represents `mdxgen.yaml`.
//! Unknown fields are ignored and every field has a default, so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};

use super::types::*;

/// Configuration for a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Model settings
    // =========================================================================
    /// Model identifier, substituted into the endpoint path.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the completion API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Role instruction sent with every request (empty disables).
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus-sampling threshold.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    // =========================================================================
    // Retry settings
    // =========================================================================
    /// Maximum completion attempts per run.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Hard timeout for a single completion request.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    // =========================================================================
    // Prompt settings
    // =========================================================================
    /// URL or local path of the prompt document.
    #[serde(default)]
    pub prompt_source: Option<String>,

    /// Minutes a cached remote prompt stays fresh.
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Reasoning directive whose paired regions are removed.
    #[serde(default = "default_reasoning_tag")]
    pub reasoning_tag: String,

    /// Self-closing / empty-body components removed during preprocessing.
    #[serde(default = "default_strip_components")]
    pub strip_components: Vec<String>,

    // =========================================================================
    // Output settings
    // =========================================================================
    /// Directory for the prompt cache, run logs and saved responses.
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Parent of per-run output roots.
    #[serde(default = "default_output_base")]
    pub output_base: String,

    // =========================================================================
    // Validation settings
    // =========================================================================
    /// Relative paths that must exist after generation.
    #[serde(default)]
    pub required_paths: Vec<String>,

    #[serde(default)]
    pub type_check: TypeCheckConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            system_instruction: default_system_instruction(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            prompt_source: None,
            cache_ttl_minutes: default_cache_ttl_minutes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            reasoning_tag: default_reasoning_tag(),
            strip_components: default_strip_components(),
            state_dir: default_state_dir(),
            output_base: default_output_base(),
            required_paths: Vec::new(),
            type_check: TypeCheckConfig::default(),
        }
    }
}
