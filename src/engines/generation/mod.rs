pub mod roles;
pub mod genome;
pub mod operators;
pub mod hall_of_fame;
pub mod evolution_engine;
pub mod progress;
pub mod stats;

pub use roles::SemanticRole;
pub use genome::{generate_genome, Genome, Slot};
pub use hall_of_fame::HallOfFame;
pub use evolution_engine::{
    CancellationFlag, EngineState, EvolutionEngine, ProgressCallback, RunSummary,
};
pub use operators::{crossover, crossover_at, mutate, tournament_selection};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage};
pub use stats::{EvolutionHistory, GenerationStats};
