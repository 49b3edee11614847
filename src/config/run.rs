use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::evaluation::fitness::{AdditiveFitness, FitnessStrategy, WeightedFitness};
use crate::error::MnemonicError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOPIC: &str = "planets in order";

pub const DEFAULT_TERMS: &str = "Mercury
Venus
Earth
Mars
Jupiter
Saturn
Uranus
Neptune";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMode {
    /// Structure plus orthographic similarity, uncapped.
    Additive,
    /// Structure plus the model's own memorability/coherence ratings, capped.
    Weighted,
}

impl FitnessMode {
    pub fn build(&self) -> Box<dyn FitnessStrategy> {
        match self {
            FitnessMode::Additive => Box::new(AdditiveFitness::default()),
            FitnessMode::Weighted => Box::new(WeightedFitness::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub topic: String,
    /// Newline separated; bullets are allowed.
    pub terms: String,
    pub fitness: FitnessMode,
    pub hall_of_fame_size: usize,
    /// Pause before each generation's service call.
    pub generation_delay_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            terms: DEFAULT_TERMS.to_string(),
            fitness: FitnessMode::Additive,
            hall_of_fame_size: 5,
            generation_delay_ms: 0,
        }
    }
}

impl ConfigSection for RunConfig {
    fn section_name() -> &'static str {
        "run"
    }

    fn validate(&self) -> Result<(), MnemonicError> {
        if self.hall_of_fame_size == 0 {
            return Err(MnemonicError::Configuration(
                "Hall of fame size must be at least 1".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Run".to_string(),
            fields: vec![
                FieldManifest::new(
                    "topic",
                    "string",
                    serde_json::json!(DEFAULT_TOPIC),
                    "What the terms have in common, given to the model as context",
                ),
                FieldManifest::new(
                    "terms",
                    "text",
                    serde_json::json!(DEFAULT_TERMS),
                    "One term per line",
                ),
                FieldManifest::new(
                    "fitness",
                    "enum",
                    serde_json::json!("additive"),
                    "additive or weighted",
                ),
                FieldManifest::new(
                    "hall_of_fame_size",
                    "integer",
                    serde_json::json!(5),
                    "Distinct best mnemonics kept across the run",
                )
                .range(1.0, 100.0),
                FieldManifest::new(
                    "generation_delay_ms",
                    "integer",
                    serde_json::json!(0),
                    "Pause before each generation's service call",
                ),
            ],
        }
    }
}
