//! Generation request and completion API wire types.
//!
//! Request body:
//!
//! ```text
//! {
//!   "contents": [{"role": "user", "parts": [{"text": "<prompt>"}]}],
//!   "systemInstruction": {"parts": [{"text": "<instruction>"}]},
//!   "generationConfig": {"temperature": 0.7, "topP": 0.95, "maxOutputTokens": 8192}
//! }
//! ```
//!
//! Successful responses carry `candidates[0].content.parts[*].text`; failures
//! carry `error.message`.

use crate::config::Config;
use serde::{Deserialize, Serialize};

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

/// Everything needed to issue one completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub user_content: String,
    pub params: GenerationParams,
}

impl GenerationRequest {
    /// Build a request for `user_content` with the model settings from `config`.
    pub fn from_config(config: &Config, user_content: impl Into<String>) -> Self {
        Self {
            model: config.model.clone(),
            system_instruction: config.system_instruction.clone(),
            user_content: user_content.into(),
            params: GenerationParams {
                temperature: config.temperature,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
        }
    }

    /// Render the JSON body for one attempt.
    pub fn to_body(&self) -> CompletionBody {
        let system_instruction = if self.system_instruction.trim().is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part::text(&self.system_instruction)],
            })
        };

        CompletionBody {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(&self.user_content)],
            }],
            system_instruction,
            generation_config: self.params,
        }
    }
}

/// JSON request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionBody {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

/// JSON response body. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiErrorBody {
    /// One-line description, e.g. `429 RESOURCE_EXHAUSTED: quota exceeded`.
    pub fn describe(&self) -> String {
        let message = self.message.as_deref().unwrap_or("no error message");
        match (self.code, self.status.as_deref()) {
            (Some(code), Some(status)) => format!("{} {}: {}", code, status, message),
            (Some(code), None) => format!("{}: {}", code, message),
            (None, Some(status)) => format!("{}: {}", status, message),
            (None, None) => message.to_string(),
        }
    }
}

impl CompletionResponse {
    /// Text of the first candidate, joining its text parts.
    ///
    /// `None` when there is no candidate or no text part at all.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let texts: Vec<&str> = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Finish reason of the first candidate, if reported.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}
