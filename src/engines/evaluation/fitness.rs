use super::levenshtein::levenshtein_distance;
use crate::engines::generation::genome::Genome;
use crate::types::Phenotype;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Upper bound of the uniform exploration noise added to structural fitness.
pub const DEFAULT_EXPLORATION_NOISE: f64 = 15.0;

/// Cap applied by `WeightedFitness`.
pub const WEIGHTED_FITNESS_CAP: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    pub total_fitness: f64,
    pub genome_fitness: f64,
    pub ortho_score: f64,
}

/// Similarity of two words in `[0, 100]` based on case-insensitive edit distance.
pub fn orthographic_similarity(keyword: &str, target: &str) -> f64 {
    let keyword_len = keyword.to_lowercase().chars().count();
    let target_len = target.to_lowercase().chars().count();

    match (keyword_len, target_len) {
        (0, 0) => return 100.0,
        (0, _) | (_, 0) => return 0.0,
        _ => {}
    }

    let max_len = keyword_len.max(target_len) as f64;
    let distance = levenshtein_distance(keyword, target) as f64;

    ((max_len - distance) / max_len * 100.0).max(0.0)
}

/// Mean similarity of `keywords[i]` to `targets[i]`.
///
/// Pairs with an empty side are skipped. Returns 0 when the lists differ in
/// length or no pair is usable.
pub fn average_orthographic_similarity(keywords: &[String], targets: &[String]) -> f64 {
    if keywords.len() != targets.len() {
        return 0.0;
    }

    let scores: Vec<f64> = keywords
        .iter()
        .zip(targets)
        .filter(|(k, t)| !k.is_empty() && !t.is_empty())
        .map(|(k, t)| orthographic_similarity(k, t))
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Deterministic part of the genome fitness.
///
/// - role diversity: `unique / len * 25`
/// - noun-like followed by verb-like: +15
/// - adjective followed by noun-like: +10
/// - concreteness: `concrete / len * 20`
/// - any verb: +15
pub fn structural_score(genome: &Genome) -> f64 {
    if genome.is_empty() {
        return 0.0;
    }

    let roles = genome.roles();
    let len = roles.len() as f64;
    let mut score = 0.0;

    let unique = roles.iter().collect::<HashSet<_>>().len() as f64;
    score += unique / len * 25.0;

    if roles
        .windows(2)
        .any(|pair| pair[0].is_noun_like() && pair[1].is_verb_like())
    {
        score += 15.0;
    }

    if roles
        .windows(2)
        .any(|pair| pair[0].is_adjective_like() && pair[1].is_noun_like())
    {
        score += 10.0;
    }

    let concrete = roles.iter().filter(|r| r.is_concrete()).count() as f64;
    score += concrete / len * 20.0;

    if roles.iter().any(|r| r.is_verb_like()) {
        score += 15.0;
    }

    score
}

/// Structural score plus uniform noise in `[0, noise)`.
pub fn genome_fitness<R: Rng + ?Sized>(genome: &Genome, noise: f64, rng: &mut R) -> f64 {
    let jitter = if noise > 0.0 { rng.gen::<f64>() * noise } else { 0.0 };
    structural_score(genome) + jitter
}

/// Orthographic score of a phenotype's words against the genome's terms.
pub fn phenotype_ortho_score(genome: &Genome, phenotype: &Phenotype) -> f64 {
    let targets = genome.original_terms();
    let keywords: Vec<String> = phenotype
        .words
        .iter()
        .filter(|w| !w.trim().is_empty())
        .cloned()
        .collect();
    average_orthographic_similarity(&keywords, &targets)
}

/// Scores a (genome, phenotype) pair.
pub trait FitnessStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        genome: &Genome,
        phenotype: Option<&Phenotype>,
        rng: &mut dyn RngCore,
    ) -> FitnessBreakdown;
}

/// `genome fitness + orthographic score`, uncapped.
#[derive(Debug, Clone)]
pub struct AdditiveFitness {
    pub exploration_noise: f64,
}

impl Default for AdditiveFitness {
    fn default() -> Self {
        Self {
            exploration_noise: DEFAULT_EXPLORATION_NOISE,
        }
    }
}

impl FitnessStrategy for AdditiveFitness {
    fn name(&self) -> &'static str {
        "additive"
    }

    fn evaluate(
        &self,
        genome: &Genome,
        phenotype: Option<&Phenotype>,
        rng: &mut dyn RngCore,
    ) -> FitnessBreakdown {
        let genome_fitness = genome_fitness(genome, self.exploration_noise, rng);

        let ortho_score = phenotype
            .map(|p| phenotype_ortho_score(genome, p))
            .unwrap_or(0.0);

        FitnessBreakdown {
            total_fitness: genome_fitness + ortho_score,
            genome_fitness,
            ortho_score,
        }
    }
}

/// `genome fitness + 0.4 * memorability + 0.6 * coherence`, capped at 200.
///
/// Uses the scores the model reports for its own sentence. The orthographic
/// score is still computed for display.
#[derive(Debug, Clone)]
pub struct WeightedFitness {
    pub exploration_noise: f64,
    pub memorability_weight: f64,
    pub coherence_weight: f64,
}

impl Default for WeightedFitness {
    fn default() -> Self {
        Self {
            exploration_noise: DEFAULT_EXPLORATION_NOISE,
            memorability_weight: 0.4,
            coherence_weight: 0.6,
        }
    }
}

impl FitnessStrategy for WeightedFitness {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn evaluate(
        &self,
        genome: &Genome,
        phenotype: Option<&Phenotype>,
        rng: &mut dyn RngCore,
    ) -> FitnessBreakdown {
        let genome_fitness = genome_fitness(genome, self.exploration_noise, rng);

        let (phenotype_fitness, ortho_score) = match phenotype {
            Some(p) => {
                let weighted = p.memorability * self.memorability_weight
                    + p.coherence * self.coherence_weight;
                let weighted = if weighted.is_finite() { weighted.max(0.0) } else { 0.0 };
                (weighted, phenotype_ortho_score(genome, p))
            }
            None => (0.0, 0.0),
        };

        FitnessBreakdown {
            total_fitness: (genome_fitness + phenotype_fitness).min(WEIGHTED_FITNESS_CAP),
            genome_fitness,
            ortho_score,
        }
    }
}
