pub mod levenshtein;
pub mod fitness;

pub use levenshtein::levenshtein_distance;
pub use fitness::{
    AdditiveFitness, FitnessBreakdown, FitnessStrategy, WeightedFitness,
    average_orthographic_similarity, orthographic_similarity, structural_score,
};
