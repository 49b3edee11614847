use acrostic_ga::config::ConfigManager;
use acrostic_ga::engines::generation::{
    CancellationFlag, ConsoleProgressCallback, EvolutionEngine,
};
use acrostic_ga::services::ChatCompletionService;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Evolve acrostic mnemonics for an ordered list of terms.
#[derive(Debug, Parser)]
#[command(name = "acrostic-ga", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// File with one term per line (defaults to the configured terms)
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    topic: Option<String>,

    #[arg(long)]
    population_size: Option<usize>,

    #[arg(long)]
    mutation_rate: Option<f64>,

    #[arg(long)]
    elite_size: Option<usize>,

    #[arg(long)]
    generations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Chat completions API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let manager = ConfigManager::new();
    manager
        .load(cli.config.as_deref())
        .context("loading configuration")?;

    let terms = match &cli.input {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading terms from {}", path.display()))?,
        ),
        None => None,
    };

    manager
        .update(|config| {
            if let Some(terms) = terms {
                config.run.terms = terms;
            }
            if let Some(topic) = &cli.topic {
                config.run.topic = topic.clone();
            }
            if let Some(size) = cli.population_size {
                config.evolution.population_size = size;
            }
            if let Some(rate) = cli.mutation_rate {
                config.evolution.mutation_rate = rate;
            }
            if let Some(elite) = cli.elite_size {
                config.evolution.elite_size = elite;
            }
            if let Some(generations) = cli.generations {
                config.evolution.max_generations = generations;
            }
            if cli.seed.is_some() {
                config.evolution.seed = cli.seed;
            }
            if cli.api_key.is_some() {
                config.expression.api_key = cli.api_key.clone();
            }
        })
        .context("applying command line overrides")?;

    let config = manager.get()?;
    if config.expression.api_key.is_none() {
        log::warn!("No API key configured; every mnemonic will be a placeholder");
    }

    let service = Arc::new(ChatCompletionService::new(config.expression.clone())?);
    let mut engine =
        EvolutionEngine::new(service, &config.evolution).with_fitness(config.run.fitness.build());

    let cancel = CancellationFlag::new();
    let ctrl_c_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping after the current generation");
            ctrl_c_flag.cancel();
        }
    });

    let mut callback = ConsoleProgressCallback;
    let summary = engine
        .run(&config.evolution, &config.run, &mut callback, &cancel)
        .await
        .context("evolution failed")?;

    if summary.cancelled {
        println!(
            "Stopped early after {} generation(s).",
            summary.generations_completed
        );
    }

    println!("\nBest mnemonics for \"{}\":", config.run.topic);
    if summary.hall_of_fame.is_empty() {
        if let Some(best) = summary.population.best() {
            println!("  {:>7.2}  {}", best.fitness, best.phenotype.sentence);
        }
    }
    for (rank, individual) in summary.hall_of_fame.get_all().iter().enumerate() {
        println!(
            "{:>2}. {:>7.2}  {}",
            rank + 1,
            individual.fitness,
            individual.phenotype.sentence
        );
        println!("              {}", individual.genome.describe());
    }

    if let Some(latest) = summary.history.latest() {
        println!(
            "\nFitness improved by {:.2} over {} generation(s); diversity {}",
            summary.history.improvement(),
            latest.generation,
            latest.genome_diversity
        );
    }

    Ok(())
}
