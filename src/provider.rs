//! Provider routing
//!
//! Model names follow the `provider/model` convention. The family decides the
//! endpoint, the credential variable and the shape of media content parts.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::LlmError;

static REASONING_MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(o\d+.*|openai/o.*)$").expect("reasoning model pattern is valid")
});

/// Provider family a model name routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    OpenAi,
    Gemini,
    Anthropic,
    DeepSeek,
    OpenRouter,
    Azure,
}

impl ProviderFamily {
    /// Resolve the family from a model name.
    pub fn from_model(model: &str) -> Self {
        let lower = model.to_lowercase();
        if let Some((prefix, _)) = lower.split_once('/') {
            match prefix {
                "gemini" | "vertex_ai" | "google" => return Self::Gemini,
                "anthropic" => return Self::Anthropic,
                "deepseek" => return Self::DeepSeek,
                "openrouter" => return Self::OpenRouter,
                "azure" => return Self::Azure,
                "openai" => return Self::OpenAi,
                _ => {}
            }
        }

        if lower.contains("gemini") {
            Self::Gemini
        } else if lower.starts_with("claude") {
            Self::Anthropic
        } else if lower.starts_with("deepseek") {
            Self::DeepSeek
        } else {
            Self::OpenAi
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
            Self::DeepSeek => "deepseek",
            Self::OpenRouter => "openrouter",
            Self::Azure => "azure",
        }
    }

    /// Default OpenAI-compatible base URL; Azure has none.
    pub const fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Gemini => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
            Self::Anthropic => Some("https://api.anthropic.com/v1"),
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Azure => None,
        }
    }

    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Azure => "AZURE_API_KEY",
        }
    }

    pub const fn api_base_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_BASE",
            Self::Gemini => "GEMINI_API_BASE",
            Self::Anthropic => "ANTHROPIC_API_BASE",
            Self::DeepSeek => "DEEPSEEK_API_BASE",
            Self::OpenRouter => "OPENROUTER_API_BASE",
            Self::Azure => "AZURE_API_BASE",
        }
    }

    /// Base URL from the environment override or the built-in default.
    pub fn resolve_base_url(self) -> Result<String, LlmError> {
        if let Ok(base) = std::env::var(self.api_base_env())
            && !base.trim().is_empty()
        {
            return Ok(base.trim_end_matches('/').to_string());
        }
        self.default_base_url()
            .map(str::to_string)
            .ok_or_else(|| {
                LlmError::ConfigurationError(format!(
                    "{} must be set for {} models",
                    self.api_base_env(),
                    self.id()
                ))
            })
    }
}

/// Whether the model should get the flat Gemini media shape.
pub fn is_gemini_model(model: &str) -> bool {
    model.to_lowercase().contains("gemini")
}

/// OpenAI o-series models take `reasoning_effort` instead of `temperature`.
pub fn is_reasoning_model(model: &str) -> bool {
    REASONING_MODEL.is_match(model)
}

/// Model name as sent on the wire, without the routing prefix.
///
/// Only the first known provider segment is removed, so OpenRouter names
/// such as `openrouter/anthropic/claude-3.5-sonnet` keep their vendor part.
pub fn wire_model_name(model: &str) -> &str {
    match model.split_once('/') {
        Some((prefix, rest))
            if matches!(
                prefix.to_lowercase().as_str(),
                "openai" | "gemini" | "vertex_ai" | "google" | "anthropic" | "deepseek"
                    | "openrouter" | "azure"
            ) =>
        {
            rest
        }
        _ => model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_model() {
        assert_eq!(ProviderFamily::from_model("gpt-4o"), ProviderFamily::OpenAi);
        assert_eq!(ProviderFamily::from_model("o3-mini"), ProviderFamily::OpenAi);
        assert_eq!(
            ProviderFamily::from_model("gemini/gemini-1.5-pro-002"),
            ProviderFamily::Gemini
        );
        assert_eq!(
            ProviderFamily::from_model("gemini-2.0-flash"),
            ProviderFamily::Gemini
        );
        assert_eq!(
            ProviderFamily::from_model("claude-3-5-sonnet-20241022"),
            ProviderFamily::Anthropic
        );
        assert_eq!(
            ProviderFamily::from_model("deepseek/deepseek-chat"),
            ProviderFamily::DeepSeek
        );
        assert_eq!(
            ProviderFamily::from_model("azure/gpt-4o"),
            ProviderFamily::Azure
        );
        assert_eq!(
            ProviderFamily::from_model("openrouter/google/gemini-pro"),
            ProviderFamily::OpenRouter
        );
    }

    #[test]
    fn test_reasoning_model_detection() {
        assert!(is_reasoning_model("o1"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(is_reasoning_model("openai/o4-mini"));
        assert!(is_reasoning_model("openai/o1-preview"));

        assert!(!is_reasoning_model("gpt-4o"));
        assert!(!is_reasoning_model("openai/gpt-4o"));
        assert!(!is_reasoning_model("omni-model"));
        assert!(!is_reasoning_model("azure/o1"));
    }

    #[test]
    fn test_gemini_detection_is_case_insensitive() {
        assert!(is_gemini_model("Gemini/Gemini-1.5-Flash"));
        assert!(is_gemini_model("vertex_ai/gemini-pro"));
        assert!(!is_gemini_model("gpt-4o"));
    }

    #[test]
    fn test_wire_model_name() {
        assert_eq!(wire_model_name("gemini/gemini-1.5-pro"), "gemini-1.5-pro");
        assert_eq!(wire_model_name("gpt-4o"), "gpt-4o");
        assert_eq!(wire_model_name("openai/o3-mini"), "o3-mini");
        assert_eq!(
            wire_model_name("openrouter/anthropic/claude-3.5-sonnet"),
            "anthropic/claude-3.5-sonnet"
        );
        assert_eq!(wire_model_name("meta-llama/llama-3"), "meta-llama/llama-3");
    }

    #[test]
    fn test_azure_requires_base_url() {
        // Only meaningful when the variable is absent in the test environment
        if std::env::var("AZURE_API_BASE").is_err() {
            let err = ProviderFamily::Azure.resolve_base_url().unwrap_err();
            assert!(matches!(err, LlmError::ConfigurationError(_)));
        }
    }
}
