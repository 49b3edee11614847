use crate::engines::generation::genome::Genome;
use crate::engines::generation::roles::SemanticRole;
use crate::error::{MnemonicError, Result};
use crate::types::Individual;
use rand::Rng;
use std::sync::Arc;

/// Chance that a mutated slot stays within its role category.
pub const RELATED_MUTATION_PROBABILITY: f64 = 0.6;

/// Tournament selection: pick best of K random candidates (sampled with replacement).
///
/// Ties keep the earliest sampled candidate. Returns `None` for an empty population.
pub fn tournament_selection<'a, R: Rng + ?Sized>(
    population: &'a [Arc<Individual>],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual> {
    if population.is_empty() {
        return None;
    }

    let mut best = &population[rng.gen_range(0..population.len())];

    for _ in 1..tournament_size.max(1) {
        let candidate = &population[rng.gen_range(0..population.len())];
        if candidate.fitness > best.fitness {
            best = candidate;
        }
    }

    Some(best.as_ref())
}

/// Single-point crossover: `parent1[..cut] ++ parent2[cut..]` with `cut` in `[0, len)`.
pub fn crossover<R: Rng + ?Sized>(
    parent1: &Genome,
    parent2: &Genome,
    rng: &mut R,
) -> Result<Genome> {
    ensure_same_length(parent1, parent2)?;
    if parent1.is_empty() {
        return Ok(parent1.clone());
    }

    let cut = rng.gen_range(0..parent1.len());
    crossover_at(parent1, parent2, cut)
}

/// Crossover with an explicit cut point.
pub fn crossover_at(parent1: &Genome, parent2: &Genome, cut: usize) -> Result<Genome> {
    ensure_same_length(parent1, parent2)?;
    let cut = cut.min(parent1.len());

    Ok(parent1.slots()[..cut]
        .iter()
        .chain(parent2.slots()[cut..].iter())
        .cloned()
        .collect())
}

/// Mutation: each slot's role is re-rolled with probability `mutation_rate`.
///
/// Letters and original terms are never touched; the input genome is left as is.
pub fn mutate<R: Rng + ?Sized>(genome: &Genome, mutation_rate: f64, rng: &mut R) -> Genome {
    genome
        .iter()
        .map(|slot| {
            if rng.gen::<f64>() < mutation_rate {
                slot.with_role(mutate_role(slot.role, rng))
            } else {
                slot.clone()
            }
        })
        .collect()
}

/// Pick a replacement role: usually a sibling from the same category,
/// otherwise (or when the category has a single member) any role.
pub fn mutate_role<R: Rng + ?Sized>(current: SemanticRole, rng: &mut R) -> SemanticRole {
    if rng.gen::<f64>() < RELATED_MUTATION_PROBABILITY {
        let related = current.related();
        if related.len() > 1 {
            return related[rng.gen_range(0..related.len())];
        }
    }
    SemanticRole::random(rng)
}

fn ensure_same_length(a: &Genome, b: &Genome) -> Result<()> {
    if a.len() != b.len() {
        return Err(MnemonicError::GenomeLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}
