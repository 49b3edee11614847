//! Expression service backed by an OpenAI-compatible chat completions API.

use super::expression::{conform_batch, fallback_batch, ExpressionService};
use super::prompt::{build_prompt, parse_mnemonics, SYSTEM_PROMPT};
use crate::config::expression::ExpressionConfig;
use crate::config::traits::ConfigSection;
use crate::engines::generation::genome::Genome;
use crate::error::{MnemonicError, Result};
use crate::types::Phenotype;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

pub struct ChatCompletionService {
    client: Client,
    config: ExpressionConfig,
}

impl ChatCompletionService {
    pub fn new(config: ExpressionConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ExpressionConfig {
        &self.config
    }

    async fn request(
        &self,
        genomes: &[Genome],
        topic: &str,
        target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| MnemonicError::ExpressionService("API key missing".to_string()))?;

        let payload = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(genomes, topic, target_terms) },
            ],
            "response_format": { "type": "json_object" },
            "temperature": self.config.temperature,
        });

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&self.config.endpoint)
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < self.config.max_retries {
                    let wait = backoff_delay(self.config.backoff_base_ms, attempt);
                    log::warn!(
                        "Rate limited. Retrying in {:.1}s (attempt {}/{})",
                        wait.as_secs_f64(),
                        attempt + 1,
                        self.config.max_retries
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                    continue;
                }
                return Err(MnemonicError::ExpressionService(format!(
                    "rate limit exceeded after {} retries",
                    self.config.max_retries
                )));
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(MnemonicError::ExpressionService(format!(
                    "API returned {}: {}",
                    status,
                    truncate(&body, 320)
                )));
            }

            let body: ChatResponse = response.json().await?;
            let content = body
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| {
                    MnemonicError::ExpressionService("response has no message content".to_string())
                })?;

            return parse_mnemonics(&content, genomes);
        }
    }
}

#[async_trait]
impl ExpressionService for ChatCompletionService {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        topic: &str,
        target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        if genomes.is_empty() {
            return Ok(Vec::new());
        }

        match self.request(genomes, topic, target_terms).await {
            Ok(mut phenotypes) => {
                conform_batch(genomes, &mut phenotypes);
                Ok(phenotypes)
            }
            Err(e) if self.config.fallback_on_error => {
                log::error!("Batch expression failed, using placeholders: {}", e);
                Ok(fallback_batch(genomes))
            }
            Err(e) => Err(e),
        }
    }
}

/// `2^(attempt + 1) * base_ms`: 4s, 8s, 16s for the default 2s base.
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << (attempt + 1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
