use thiserror::Error;

#[derive(Error, Debug)]
pub enum MnemonicError {
    #[error("No usable terms: input produced no non-empty terms")]
    EmptyTerm,

    #[error("Genome length mismatch: {left} vs {right}")]
    GenomeLengthMismatch { left: usize, right: usize },

    #[error("Expression service error: {0}")]
    ExpressionService(String),

    #[error("Cannot evolve an empty population")]
    EmptyPopulation,

    #[error("Degenerate offspring: required {required}, produced {produced}")]
    DegenerateOffspring { required: usize, produced: usize },

    #[error("Evolution step failed: {0}")]
    EvolutionStepFailed(String),

    #[error("Evolution terminated after {max_generations} generations")]
    Terminated { max_generations: usize },

    #[error("Engine has no population yet; initialize first")]
    NotInitialized,

    #[error("Evolution cancelled; pending result discarded")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, MnemonicError>;
