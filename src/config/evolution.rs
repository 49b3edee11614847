use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::MnemonicError;
use serde::{Deserialize, Serialize};

/// Largest batch the expression service is asked to fill in one call.
pub const MAX_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub mutation_rate: f64,
    /// Top individuals copied unchanged into the next generation.
    pub elite_size: usize,
    pub max_generations: usize,
    pub tournament_size: usize,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 5,
            mutation_rate: 0.3,
            elite_size: 1,
            max_generations: 10,
            tournament_size: 3,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Number of new individuals each generation.
    pub fn offspring_count(&self) -> usize {
        self.population_size.saturating_sub(self.elite_size)
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), MnemonicError> {
        if self.population_size < 2 {
            return Err(MnemonicError::Configuration(
                "Population size must be at least 2".to_string()
            ));
        }
        if self.population_size > MAX_BATCH_SIZE {
            return Err(MnemonicError::Configuration(format!(
                "Population size must not exceed {}",
                MAX_BATCH_SIZE
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(MnemonicError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        if self.elite_size >= self.population_size {
            return Err(MnemonicError::Configuration(
                "Elite size must be smaller than population size".to_string()
            ));
        }
        if self.max_generations < 1 {
            return Err(MnemonicError::Configuration(
                "Max generations must be at least 1".to_string()
            ));
        }
        if self.tournament_size < 1 {
            return Err(MnemonicError::Configuration(
                "Tournament size must be at least 1".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new(
                    "population_size",
                    "integer",
                    serde_json::json!(5),
                    "Number of candidate mnemonics per generation",
                )
                .range(2.0, MAX_BATCH_SIZE as f64),
                FieldManifest::new(
                    "mutation_rate",
                    "float",
                    serde_json::json!(0.3),
                    "Probability that a slot's role is re-rolled",
                )
                .range(0.0, 1.0),
                FieldManifest::new(
                    "elite_size",
                    "integer",
                    serde_json::json!(1),
                    "Top individuals carried over unchanged",
                )
                .range(0.0, (self.population_size.max(1) - 1) as f64),
                FieldManifest::new(
                    "max_generations",
                    "integer",
                    serde_json::json!(10),
                    "Generations to evolve after initialization",
                )
                .range(1.0, 100.0),
                FieldManifest::new(
                    "tournament_size",
                    "integer",
                    serde_json::json!(3),
                    "Candidates sampled per parent selection",
                )
                .range(1.0, MAX_BATCH_SIZE as f64),
                FieldManifest::new(
                    "seed",
                    "integer",
                    serde_json::Value::Null,
                    "Random seed; empty for a fresh run each time",
                ),
            ],
        }
    }
}
