pub mod traits;
pub mod evolution;
pub mod expression;
pub mod run;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use evolution::EvolutionConfig;
pub use expression::ExpressionConfig;
pub use run::{FitnessMode, RunConfig};
pub use traits::{ConfigManifest, ConfigSection, FieldManifest};
