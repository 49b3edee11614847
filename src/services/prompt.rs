//! Prompt construction and reply parsing for chat-model expression services.

use crate::engines::generation::genome::Genome;
use crate::error::{MnemonicError, Result};
use crate::types::{Phenotype, DEFAULT_PHENOTYPE_SCORE};
use serde::Deserialize;
use serde_json::Value;

pub const SYSTEM_PROMPT: &str =
    "You are a mnemonic expert that outputs ONLY valid JSON. Do not include introductory text.";

/// User prompt asking for one sentence per genome.
pub fn build_prompt(genomes: &[Genome], topic: &str, target_terms: &[String]) -> String {
    let targets = if target_terms.is_empty() {
        "the items".to_string()
    } else {
        target_terms.join(", ")
    };

    let sequences = genomes
        .iter()
        .enumerate()
        .map(|(i, genome)| {
            let slots = genome
                .iter()
                .map(|s| format!("{} ({})", s.letter, s.role.label()))
                .collect::<Vec<_>>()
                .join(" -> ");
            format!("Mnemonic #{}: {}", i + 1, slots)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create exactly {count} mnemonic sentences for the topic: \"{topic}\".\n\
         Targets: {targets}.\n\n\
         Strict requirements for each mnemonic:\n\
         1. Follow the letter sequence provided, one word per letter.\n\
         2. Words MUST match the assigned semantic roles.\n\
         3. Prefer words that share letters with their target \
         (e.g. 'Mercury' -> 'Merchant', 'Venus' -> 'Ventriloquist').\n\
         4. The sentence must describe a vivid, imaginable scene.\n\n\
         {sequences}\n\n\
         Return ONLY a JSON object with a \"mnemonics\" key containing an array:\n\
         {{\"mnemonics\": [{{\"sentence\": \"...\", \"words\": [\"...\"], \
         \"memorability_score\": 85, \"coherence_score\": 90}}]}}",
        count = genomes.len(),
        topic = topic,
        targets = targets,
        sequences = sequences,
    )
}

/// Remove Markdown code fences some models wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[derive(Debug, Deserialize)]
struct MnemonicEnvelope {
    #[serde(default)]
    mnemonics: Vec<RawMnemonic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMnemonic {
    sentence: Option<String>,
    words: Vec<Value>,
    #[serde(alias = "memorability")]
    memorability_score: Value,
    #[serde(alias = "coherence")]
    coherence_score: Value,
}

/// Parse a model reply into phenotypes aligned with `genomes`.
///
/// Entries with a missing sentence become `Phenotype::fallback` for their
/// genome. The result may still be shorter or longer than `genomes`; callers
/// conform it.
pub fn parse_mnemonics(text: &str, genomes: &[Genome]) -> Result<Vec<Phenotype>> {
    let cleaned = strip_code_fences(text);
    let json = extract_object(&cleaned).ok_or_else(|| {
        MnemonicError::ExpressionService("reply contains no JSON object".to_string())
    })?;

    let envelope: MnemonicEnvelope = serde_json::from_str(json)?;

    Ok(envelope
        .mnemonics
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| match raw.sentence.filter(|s| !s.trim().is_empty()) {
            Some(sentence) => Some(Phenotype {
                sentence,
                words: raw.words.iter().filter_map(value_as_word).collect(),
                memorability: value_as_score(&raw.memorability_score),
                coherence: value_as_score(&raw.coherence_score),
            }),
            // no sentence: the whole entry becomes the placeholder
            None => genomes.get(i).map(Phenotype::fallback),
        })
        .collect())
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn value_as_word(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_score(value: &Value) -> f64 {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(DEFAULT_PHENOTYPE_SCORE)
}
