//! Genome representation for the acrostic search
//!
//! A genome holds one `Slot` per target term. Position `i` always belongs to
//! term `i`: the slot's letter and original term are fixed for the whole run,
//! only the semantic role is evolved.
//!
//! # Why evolve roles instead of sentences?
//!
//! Sentences are produced by an external model and are expensive. The GA works
//! on the cheap structural layer (which kind of word goes where) and asks the
//! expression service to turn each structure into a concrete sentence:
//! - **Crossover**: splicing two role sequences is trivial
//! - **Mutation**: swapping one role for another never breaks the acrostic
//! - **No invalid states**: every genome still spells the same letters
//!
//! # Example
//!
//! ```text
//! // M(animal) V(action_verb) E(noun_place)
//! // might be expressed as "Moose Vaults Everest"
//! ```

use super::roles::SemanticRole;
use crate::error::{MnemonicError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub letter: char,
    pub role: SemanticRole,
    pub original_term: String,
}

impl Slot {
    pub fn with_role(&self, role: SemanticRole) -> Slot {
        Slot {
            letter: self.letter,
            role,
            original_term: self.original_term.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    slots: Vec<Slot>,
}

impl Genome {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slot> {
        self.slots.iter()
    }

    pub fn letters(&self) -> Vec<char> {
        self.slots.iter().map(|s| s.letter).collect()
    }

    pub fn roles(&self) -> Vec<SemanticRole> {
        self.slots.iter().map(|s| s.role).collect()
    }

    pub fn original_terms(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.original_term.clone()).collect()
    }

    /// Compact `M(animal) V(action_verb)` form used in prompts and logs.
    pub fn describe(&self) -> String {
        self.slots
            .iter()
            .map(|s| format!("{}({})", s.letter, s.role))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<Slot> for Genome {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        Genome::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Genome {
    type Item = &'a Slot;
    type IntoIter = std::slice::Iter<'a, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

/// Build a genome with a uniformly random role for every term.
pub fn generate_genome<R: Rng + ?Sized>(
    first_letters: &[char],
    original_terms: &[String],
    rng: &mut R,
) -> Result<Genome> {
    if first_letters.len() != original_terms.len() {
        return Err(MnemonicError::GenomeLengthMismatch {
            left: first_letters.len(),
            right: original_terms.len(),
        });
    }

    Ok(first_letters
        .iter()
        .zip(original_terms)
        .map(|(&letter, term)| Slot {
            letter,
            role: SemanticRole::random(rng),
            original_term: term.clone(),
        })
        .collect())
}
