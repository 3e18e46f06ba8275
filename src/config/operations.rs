//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::DEFAULT_CONFIG_FILE;
use crate::error::{GenError, Result};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Resolve the config for a command invocation.
    ///
    /// An explicitly requested file must exist. Without one, `mdxgen.yaml` in
    /// the current directory is used when present, defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects a completely empty document; treat it as all defaults.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| GenError::UserError(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| GenError::UserError(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `model` and `endpoint` must be non-empty
    /// - `max_attempts`, `attempt_timeout_secs`, `fetch_timeout_secs` must be positive
    /// - `temperature` must be within 0.0..=2.0, `top_p` within 0.0..=1.0
    /// - `max_output_tokens` must be positive
    /// - `required_paths` must be relative and must not contain `..`
    /// - an enabled type check needs a command; `type_check.timeout_secs` must be positive
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(invalid("model must not be empty"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(invalid("endpoint must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(invalid("max_attempts must be greater than 0"));
        }
        if self.attempt_timeout_secs == 0 {
            return Err(invalid("attempt_timeout_secs must be greater than 0"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(invalid("fetch_timeout_secs must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid("temperature must be between 0.0 and 2.0"));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(invalid("top_p must be between 0.0 and 1.0"));
        }
        if self.max_output_tokens == 0 {
            return Err(invalid("max_output_tokens must be greater than 0"));
        }
        if self.reasoning_tag.trim().is_empty() {
            return Err(invalid("reasoning_tag must not be empty"));
        }
        for path in &self.required_paths {
            let escapes = Path::new(path).components().any(|c| {
                matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
            });
            if path.trim().is_empty() || escapes {
                return Err(invalid(&format!(
                    "required_paths entries must be non-empty relative paths inside the output tree (got '{}')",
                    path
                )));
            }
        }
        if self.type_check.enabled && self.type_check.command.trim().is_empty() {
            return Err(invalid("type_check.command must be set when type_check is enabled"));
        }
        if self.type_check.timeout_secs == 0 {
            return Err(invalid("type_check.timeout_secs must be greater than 0"));
        }

        Ok(())
    }

    /// Per-attempt completion timeout.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Freshness window of the prompt cache.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes * 60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn invalid(msg: &str) -> GenError {
    GenError::UserError(format!(
        "config validation failed: {}\nFix: edit {} and correct this value.",
        msg, DEFAULT_CONFIG_FILE
    ))
}

/// Commented template written by `mdxgen init`.
pub fn config_template() -> String {
    r#"# mdxgen configuration. Every field is optional.

# Completion API
model: gemini-2.0-flash
endpoint: https://generativelanguage.googleapis.com/v1beta
api_key_env: GEMINI_API_KEY
temperature: 0.7
top_p: 0.95
max_output_tokens: 8192

# Retry policy
max_attempts: 3
attempt_timeout_secs: 300

# Prompt document (URL or local path) and cache freshness
# prompt_source: https://example.com/prompts/app.mdx
cache_ttl_minutes: 60
fetch_timeout_secs: 30

# Run state (prompt cache, log file, saved responses) and output parent
state_dir: .mdxgen
output_base: generated

# Files that must exist after generation
required_paths:
  - package.json

# Optional static check against the generated tree
type_check:
  enabled: false
  command: npx tsc --noEmit
  applies_to:
    - "**/*.ts"
    - "**/*.tsx"
  timeout_secs: 300
"#
    .to_string()
}
