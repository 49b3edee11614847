pub mod chat_completion;
pub mod evolution_runner;
pub mod expression;
pub mod prompt;

pub use chat_completion::ChatCompletionService;
pub use evolution_runner::EvolutionRunner;
pub use expression::{conform_batch, fallback_batch, ExpressionService};
pub use prompt::{build_prompt, parse_mnemonics};
