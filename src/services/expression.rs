use crate::engines::generation::genome::Genome;
use crate::error::Result;
use crate::types::Phenotype;
use async_trait::async_trait;

/// Turns genomes into concrete sentences.
///
/// Implementations must return exactly one phenotype per genome, in order,
/// substituting `Phenotype::fallback` for anything they cannot produce. An
/// `Err` means the whole batch failed and the evolution step must stop.
/// Retries and rate limiting are the implementation's concern.
#[async_trait]
pub trait ExpressionService: Send + Sync {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        topic: &str,
        target_terms: &[String],
    ) -> Result<Vec<Phenotype>>;
}

/// Pad or truncate `phenotypes` so it lines up one-to-one with `genomes`.
///
/// Missing entries become fallbacks. Returns the number of substitutions.
pub fn conform_batch(genomes: &[Genome], phenotypes: &mut Vec<Phenotype>) -> usize {
    if phenotypes.len() > genomes.len() {
        log::debug!(
            "Dropping {} surplus phenotypes",
            phenotypes.len() - genomes.len()
        );
        phenotypes.truncate(genomes.len());
    }

    let missing = genomes.len() - phenotypes.len();
    for genome in &genomes[phenotypes.len()..] {
        phenotypes.push(Phenotype::fallback(genome));
    }

    if missing > 0 {
        log::warn!(
            "Expression batch short by {}; substituted placeholder phenotypes",
            missing
        );
    }
    missing
}

/// A full batch of placeholders.
pub fn fallback_batch(genomes: &[Genome]) -> Vec<Phenotype> {
    genomes.iter().map(Phenotype::fallback).collect()
}
