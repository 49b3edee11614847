use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::MnemonicError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Settings for the chat-completion expression service.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_retries: u32,
    /// Rate-limit backoff waits `2^(attempt + 1) * backoff_base_ms`.
    pub backoff_base_ms: u64,
    pub timeout_secs: u64,
    /// Return placeholder phenotypes instead of failing the batch.
    pub fallback_on_error: bool,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_retries: 3,
            backoff_base_ms: 2000,
            timeout_secs: 60,
            fallback_on_error: true,
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for ExpressionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("timeout_secs", &self.timeout_secs)
            .field("fallback_on_error", &self.fallback_on_error)
            .finish()
    }
}

impl ConfigSection for ExpressionConfig {
    fn section_name() -> &'static str {
        "expression"
    }

    fn validate(&self) -> Result<(), MnemonicError> {
        if self.endpoint.trim().is_empty() {
            return Err(MnemonicError::Configuration(
                "Expression endpoint must not be empty".to_string()
            ));
        }
        if self.model.trim().is_empty() {
            return Err(MnemonicError::Configuration(
                "Expression model must not be empty".to_string()
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(MnemonicError::Configuration(
                "Temperature must be between 0 and 2".to_string()
            ));
        }
        if self.timeout_secs == 0 {
            return Err(MnemonicError::Configuration(
                "Timeout must be positive".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Expression".to_string(),
            fields: vec![
                FieldManifest::new(
                    "endpoint",
                    "string",
                    serde_json::json!(DEFAULT_CHAT_ENDPOINT),
                    "OpenAI-compatible chat completions URL",
                ),
                FieldManifest::new(
                    "model",
                    "string",
                    serde_json::json!(DEFAULT_MODEL),
                    "Model used to write the sentences",
                ),
                FieldManifest::new(
                    "api_key",
                    "secret",
                    serde_json::Value::Null,
                    "Bearer token for the endpoint",
                ),
                FieldManifest::new(
                    "temperature",
                    "float",
                    serde_json::json!(0.7),
                    "Sampling temperature",
                )
                .range(0.0, 2.0),
                FieldManifest::new(
                    "max_retries",
                    "integer",
                    serde_json::json!(3),
                    "Retries after HTTP 429",
                )
                .range(0.0, 10.0),
                FieldManifest::new(
                    "backoff_base_ms",
                    "integer",
                    serde_json::json!(2000),
                    "Base delay for exponential backoff",
                ),
                FieldManifest::new(
                    "timeout_secs",
                    "integer",
                    serde_json::json!(60),
                    "Per-request timeout",
                )
                .range(1.0, 600.0),
                FieldManifest::new(
                    "fallback_on_error",
                    "bool",
                    serde_json::json!(true),
                    "Use placeholder sentences when the service fails",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ExpressionConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_validate() {
        assert!(ExpressionConfig::default().validate().is_ok());
        let config = ExpressionConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
