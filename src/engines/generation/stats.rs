use crate::types::Population;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one generation. Generation 0 is the initial population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub best_ortho_score: f64,
    pub genome_diversity: usize,
    pub population_size: usize,
    pub best_sentence: String,
    pub recorded_at: DateTime<Utc>,
}

impl GenerationStats {
    pub fn from_population(generation: usize, population: &Population) -> Self {
        let best = population.best();
        Self {
            generation,
            best_fitness: best.map(|b| b.fitness).unwrap_or(0.0),
            average_fitness: population.average_fitness(),
            best_ortho_score: best.map(|b| b.ortho_score).unwrap_or(0.0),
            genome_diversity: population.genome_diversity(),
            population_size: population.len(),
            best_sentence: best.map(|b| b.phenotype.sentence.clone()).unwrap_or_default(),
            recorded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    entries: Vec<GenerationStats>,
}

impl EvolutionHistory {
    pub fn record(&mut self, stats: GenerationStats) {
        self.entries.push(stats);
    }

    pub fn entries(&self) -> &[GenerationStats] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&GenerationStats> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best fitness of the last generation minus that of the first.
    pub fn improvement(&self) -> f64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.best_fitness - first.best_fitness,
            _ => 0.0,
        }
    }
}
