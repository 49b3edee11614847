use crate::engines::generation::genome::Genome;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Score assumed when the expression service does not rate a sentence.
pub const DEFAULT_PHENOTYPE_SCORE: f64 = 50.0;

fn default_score() -> f64 {
    DEFAULT_PHENOTYPE_SCORE
}

/// Concrete sentence produced for a genome by the expression service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    pub sentence: String,
    /// One word per slot, best effort. May be shorter or longer than the genome.
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default = "default_score", alias = "memorability_score")]
    pub memorability: f64,
    #[serde(default = "default_score", alias = "coherence_score")]
    pub coherence: f64,
}

impl Phenotype {
    pub fn new(sentence: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            sentence: sentence.into(),
            words,
            memorability: DEFAULT_PHENOTYPE_SCORE,
            coherence: DEFAULT_PHENOTYPE_SCORE,
        }
    }

    /// Placeholder used wherever a phenotype is missing or the service failed.
    ///
    /// Carries no words, so orthographic scoring yields 0 and the individual
    /// competes on structure alone.
    pub fn fallback(genome: &Genome) -> Self {
        let sentence = genome
            .iter()
            .map(|slot| format!("{}...", slot.letter))
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(sentence, Vec::new())
    }

    pub fn is_fallback_for(&self, genome: &Genome) -> bool {
        *self == Self::fallback(genome)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub id: u64,
    pub genome: Genome,
    pub phenotype: Phenotype,
    pub fitness: f64,
    pub genome_fitness: f64,
    /// Average orthographic similarity of the words to their terms, 0-100.
    pub ortho_score: f64,
}

/// Individuals ordered by fitness, best first.
///
/// Individuals are shared (`Arc`) so elites move into the next generation
/// without being copied or rescored.
#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Arc<Individual>>,
}

impl Population {
    /// Sort descending by fitness. The sort is stable: equal fitness keeps
    /// insertion order.
    pub fn from_individuals(mut individuals: Vec<Arc<Individual>>) -> Self {
        individuals.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { individuals }
    }

    pub fn individuals(&self) -> &[Arc<Individual>] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn best(&self) -> Option<&Arc<Individual>> {
        self.individuals.first()
    }

    pub fn elites(&self, count: usize) -> &[Arc<Individual>] {
        &self.individuals[..count.min(self.individuals.len())]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Individual>> {
        self.individuals.iter()
    }

    pub fn average_fitness(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        let total: f64 = self.individuals.iter().map(|i| i.fitness).sum();
        total / self.individuals.len() as f64
    }

    /// Number of structurally distinct genomes.
    pub fn genome_diversity(&self) -> usize {
        self.individuals
            .iter()
            .map(|i| &i.genome)
            .collect::<HashSet<_>>()
            .len()
    }
}
