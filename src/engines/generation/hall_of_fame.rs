use crate::types::Individual;

use std::collections::HashSet;
use std::sync::Arc;

/// Best distinct mnemonics seen during a run.
///
/// Individuals are deduplicated by their normalized sentence, so the same
/// mnemonic surviving as an elite for many generations is only listed once.
/// Placeholder phenotypes are never admitted.
pub struct HallOfFame {
    entries: Vec<Arc<Individual>>,
    max_size: usize,
    seen_signatures: HashSet<String>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add an individual to the Hall of Fame
    pub fn try_add(&mut self, individual: &Arc<Individual>) -> bool {
        if individual.phenotype.is_fallback_for(&individual.genome) {
            return false;
        }

        let signature = canonical_sentence(&individual.phenotype.sentence);
        if signature.is_empty() || self.seen_signatures.contains(&signature) {
            return false; // Duplicate, reject
        }

        self.entries.push(Arc::clone(individual));
        self.seen_signatures.insert(signature);

        self.sort_and_trim();
        true
    }

    fn sort_and_trim(&mut self) {
        self.entries.sort_by(|a, b| {
            b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.entries.len() > self.max_size {
            if let Some(removed) = self.entries.pop() {
                self.seen_signatures
                    .remove(&canonical_sentence(&removed.phenotype.sentence));
            }
        }
    }

    pub fn get_all(&self) -> &[Arc<Individual>] {
        &self.entries
    }

    pub fn get_top_n(&self, n: usize) -> &[Arc<Individual>] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn filter_by_threshold(&self, min_fitness: f64) -> Vec<Arc<Individual>> {
        self.entries
            .iter()
            .filter(|i| i.fitness >= min_fitness)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercased sentence with punctuation dropped and whitespace collapsed.
pub fn canonical_sentence(sentence: &str) -> String {
    sentence
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
