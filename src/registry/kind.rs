//! Supported backend kinds and their built-in defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of upstream providers the router can talk to.
///
/// Each kind carries defaults for every tunable so a config entry only needs
/// to name the kind and where its credential lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OpenAi,
    Anthropic,
    Gemini,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::OpenAi, BackendKind::Anthropic, BackendKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "gpt-4o",
            BackendKind::Anthropic => "claude-3-5-sonnet-latest",
            BackendKind::Gemini => "gemini-1.5-pro",
        }
    }

    /// Priority tier: 1 = primary, 2 = secondary, 3 = tertiary.
    pub fn default_tier(&self) -> u8 {
        match self {
            BackendKind::OpenAi => 1,
            BackendKind::Anthropic => 2,
            BackendKind::Gemini => 3,
        }
    }

    pub fn default_requests_per_window(&self) -> u32 {
        match self {
            BackendKind::OpenAi => 500,
            BackendKind::Anthropic => 50,
            BackendKind::Gemini => 60,
        }
    }

    pub fn default_max_output_tokens(&self) -> u32 {
        match self {
            BackendKind::OpenAi => 4096,
            BackendKind::Anthropic => 8192,
            BackendKind::Gemini => 8192,
        }
    }

    /// USD per 1,000 processed tokens.
    pub fn default_cost_per_1k(&self) -> f64 {
        match self {
            BackendKind::OpenAi => 0.005,
            BackendKind::Anthropic => 0.003,
            BackendKind::Gemini => 0.00125,
        }
    }

    pub fn default_capabilities(&self) -> &'static [&'static str] {
        match self {
            BackendKind::OpenAi => &["function-calling", "multimodal", "json-mode"],
            BackendKind::Anthropic => &["long-context", "function-calling", "multimodal"],
            BackendKind::Gemini => &["long-context", "multimodal"],
        }
    }

    /// Environment variable holding the API key when none is given inline.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "OPENAI_API_KEY",
            BackendKind::Anthropic => "ANTHROPIC_API_KEY",
            BackendKind::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "https://api.openai.com",
            BackendKind::Anthropic => "https://api.anthropic.com",
            BackendKind::Gemini => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
