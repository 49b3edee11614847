use crate::config::evolution::EvolutionConfig;
use crate::config::run::RunConfig;
use crate::engines::evaluation::fitness::{AdditiveFitness, FitnessStrategy};
use crate::engines::generation::{
    genome::{generate_genome, Genome},
    hall_of_fame::HallOfFame,
    operators::{crossover, mutate, tournament_selection},
    stats::{EvolutionHistory, GenerationStats},
};
use crate::error::{MnemonicError, Result};
use crate::services::expression::{conform_batch, ExpressionService};
use crate::types::{Individual, Phenotype, Population};
use crate::utils::text_parser::{first_letters, parse_terms};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Parent pairs tried per required child before giving up on a generation.
const MAX_ATTEMPTS_PER_CHILD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Empty,
    Initialized,
    Evolving { generation: usize },
    Terminated,
}

pub trait ProgressCallback: Send {
    /// Generation 0 is initialization.
    fn on_generation_start(&mut self, generation: usize);
    fn on_batch_submitted(&mut self, generation: usize, batch_size: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
}

/// Shared flag a driver sets to stop a run between generations.
///
/// A batch call already in flight is allowed to finish; its result is then
/// dropped and the previous population stays current.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of `EvolutionEngine::run`.
pub struct RunSummary {
    pub population: Population,
    pub history: EvolutionHistory,
    pub hall_of_fame: HallOfFame,
    pub generations_completed: usize,
    pub cancelled: bool,
}

pub struct EvolutionEngine<R: Rng = StdRng> {
    service: Arc<dyn ExpressionService>,
    fitness: Box<dyn FitnessStrategy>,
    rng: R,
    state: EngineState,
    next_id: u64,
}

impl EvolutionEngine<StdRng> {
    pub fn new(service: Arc<dyn ExpressionService>, config: &EvolutionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(service, rng)
    }
}

impl<R: Rng + Send> EvolutionEngine<R> {
    pub fn with_rng(service: Arc<dyn ExpressionService>, rng: R) -> Self {
        Self {
            service,
            fitness: Box::new(AdditiveFitness::default()),
            rng,
            state: EngineState::Empty,
            next_id: 1,
        }
    }

    pub fn with_fitness(mut self, fitness: Box<dyn FitnessStrategy>) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Completed generations since initialization.
    pub fn generation(&self) -> usize {
        match self.state {
            EngineState::Evolving { generation } => generation,
            _ => 0,
        }
    }

    pub fn reset(&mut self) {
        self.state = EngineState::Empty;
    }

    /// Build `population_size` random genomes, express them in one batch and
    /// score them.
    pub async fn initialize_population(
        &mut self,
        first_letters: &[char],
        terms: &[String],
        topic: &str,
        population_size: usize,
    ) -> Result<Population> {
        self.initialize(first_letters, terms, topic, population_size, None)
            .await
    }

    /// Produce the next generation: elites carried over, the rest bred by
    /// tournament selection, crossover and mutation, then expressed in one
    /// batch and scored.
    pub async fn evolve_generation(
        &mut self,
        population: &Population,
        settings: &EvolutionConfig,
        topic: &str,
    ) -> Result<Population> {
        self.step(population, settings, topic, None).await
    }

    async fn initialize(
        &mut self,
        first_letters: &[char],
        terms: &[String],
        topic: &str,
        population_size: usize,
        cancel: Option<&CancellationFlag>,
    ) -> Result<Population> {
        if terms.is_empty() {
            return Err(MnemonicError::EmptyTerm);
        }
        if population_size == 0 {
            return Err(MnemonicError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }

        let genomes = (0..population_size)
            .map(|_| generate_genome(first_letters, terms, &mut self.rng))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Generated {} genomes", genomes.len());

        let phenotypes = self.express(&genomes, topic, terms).await?;
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(MnemonicError::Cancelled);
        }

        let individuals = self.assemble(genomes, phenotypes);
        self.state = EngineState::Initialized;

        Ok(Population::from_individuals(individuals))
    }

    async fn step(
        &mut self,
        population: &Population,
        settings: &EvolutionConfig,
        topic: &str,
        cancel: Option<&CancellationFlag>,
    ) -> Result<Population> {
        let completed = match self.state {
            EngineState::Empty => return Err(MnemonicError::NotInitialized),
            EngineState::Terminated => {
                return Err(MnemonicError::Terminated {
                    max_generations: settings.max_generations,
                })
            }
            EngineState::Initialized => 0,
            EngineState::Evolving { generation } => generation,
        };
        if completed >= settings.max_generations {
            self.state = EngineState::Terminated;
            return Err(MnemonicError::Terminated {
                max_generations: settings.max_generations,
            });
        }

        if population.is_empty() {
            log::error!("evolve_generation called with empty population");
            return Err(MnemonicError::EmptyPopulation);
        }

        let elite_size = settings.elite_size.min(population.len());
        let required = settings.population_size.saturating_sub(elite_size);
        let offspring_genomes = self.breed(population, settings, required);

        if required == 0 || offspring_genomes.len() < required {
            let warning = MnemonicError::DegenerateOffspring {
                required,
                produced: offspring_genomes.len(),
            };
            log::warn!("{}; keeping current population", warning);
            self.advance(completed, settings);
            return Ok(population.clone());
        }

        // Every individual shares the same term list; the leader's is canonical.
        let target_terms = population
            .best()
            .map(|b| b.genome.original_terms())
            .unwrap_or_default();

        let phenotypes = self
            .express(&offspring_genomes, topic, &target_terms)
            .await?;
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(MnemonicError::Cancelled);
        }

        let mut next: Vec<Arc<Individual>> = population.elites(elite_size).to_vec();
        next.extend(self.assemble(offspring_genomes, phenotypes));

        self.advance(completed, settings);
        Ok(Population::from_individuals(next))
    }

    fn breed(
        &mut self,
        population: &Population,
        settings: &EvolutionConfig,
        required: usize,
    ) -> Vec<Genome> {
        let parents = population.individuals();
        let mut offspring = Vec::with_capacity(required);
        let mut attempts = 0;

        while offspring.len() < required && attempts < required * MAX_ATTEMPTS_PER_CHILD {
            attempts += 1;

            let parent1 = tournament_selection(parents, settings.tournament_size, &mut self.rng);
            let parent2 = tournament_selection(parents, settings.tournament_size, &mut self.rng);
            let (parent1, parent2) = match (parent1, parent2) {
                (Some(a), Some(b)) => (a, b),
                _ => break,
            };

            match crossover(&parent1.genome, &parent2.genome, &mut self.rng) {
                Ok(child) => {
                    offspring.push(mutate(&child, settings.mutation_rate, &mut self.rng));
                }
                Err(e) => log::warn!("Skipping incompatible parents: {}", e),
            }
        }

        offspring
    }

    fn advance(&mut self, completed: usize, settings: &EvolutionConfig) {
        let generation = completed + 1;
        self.state = if generation >= settings.max_generations {
            EngineState::Terminated
        } else {
            EngineState::Evolving { generation }
        };
    }

    async fn express(
        &self,
        genomes: &[Genome],
        topic: &str,
        target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        log::debug!("Expressing batch of {} genomes", genomes.len());

        let mut phenotypes = self
            .service
            .express_batch(genomes, topic, target_terms)
            .await
            .map_err(|e| {
                log::error!("Expression batch failed: {}", e);
                e
            })?;

        if phenotypes.is_empty() && !genomes.is_empty() {
            return Err(MnemonicError::EvolutionStepFailed(format!(
                "expression service returned no phenotypes for {} genomes",
                genomes.len()
            )));
        }

        conform_batch(genomes, &mut phenotypes);
        Ok(phenotypes)
    }

    fn assemble(&mut self, genomes: Vec<Genome>, phenotypes: Vec<Phenotype>) -> Vec<Arc<Individual>> {
        genomes
            .into_iter()
            .zip(phenotypes)
            .map(|(genome, phenotype)| {
                let score = self.fitness.evaluate(&genome, Some(&phenotype), &mut self.rng);
                let id = self.next_id;
                self.next_id += 1;
                Arc::new(Individual {
                    id,
                    genome,
                    phenotype,
                    fitness: score.total_fitness,
                    genome_fitness: score.genome_fitness,
                    ortho_score: score.ortho_score,
                })
            })
            .collect()
    }

    /// Parse the configured terms, initialize and evolve until
    /// `max_generations` or cancellation.
    pub async fn run<C: ProgressCallback>(
        &mut self,
        settings: &EvolutionConfig,
        run: &RunConfig,
        callback: &mut C,
        cancel: &CancellationFlag,
    ) -> Result<RunSummary> {
        let terms = parse_terms(&run.terms);
        let letters = first_letters(&terms)?;

        log::info!(
            "Evolving mnemonics for {} terms ({}) using {} fitness",
            terms.len(),
            letters.iter().collect::<String>(),
            self.fitness.name()
        );

        self.reset();
        let mut summary = RunSummary {
            population: Population::default(),
            history: EvolutionHistory::default(),
            hall_of_fame: HallOfFame::new(run.hall_of_fame_size),
            generations_completed: 0,
            cancelled: false,
        };

        callback.on_generation_start(0);
        callback.on_batch_submitted(0, settings.population_size);
        match self
            .initialize(&letters, &terms, &run.topic, settings.population_size, Some(cancel))
            .await
        {
            Ok(population) => summary.population = population,
            Err(MnemonicError::Cancelled) => {
                summary.cancelled = true;
                return Ok(summary);
            }
            Err(e) => return Err(e),
        }
        Self::record(&mut summary, 0, callback);

        while self.state != EngineState::Terminated {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let generation = self.generation() + 1;
            callback.on_generation_start(generation);

            if run.generation_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(run.generation_delay_ms)).await;
            }

            callback.on_batch_submitted(generation, settings.offspring_count());
            match self
                .step(&summary.population, settings, &run.topic, Some(cancel))
                .await
            {
                Ok(population) => summary.population = population,
                Err(MnemonicError::Cancelled) => {
                    log::info!("Cancelled during generation {}", generation);
                    summary.cancelled = true;
                    break;
                }
                Err(e) => {
                    log::error!("Evolution step {} failed: {}", generation, e);
                    return Err(e);
                }
            }

            summary.generations_completed = generation;
            Self::record(&mut summary, generation, callback);
        }

        Ok(summary)
    }

    fn record<C: ProgressCallback>(summary: &mut RunSummary, generation: usize, callback: &mut C) {
        for individual in summary.population.iter() {
            summary.hall_of_fame.try_add(individual);
        }
        let stats = GenerationStats::from_population(generation, &summary.population);
        callback.on_generation_complete(&stats);
        summary.history.record(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Echoes each term back as the chosen word.
    struct EchoService;

    #[async_trait]
    impl ExpressionService for EchoService {
        async fn express_batch(
            &self,
            genomes: &[Genome],
            _topic: &str,
            _target_terms: &[String],
        ) -> Result<Vec<Phenotype>> {
            Ok(genomes
                .iter()
                .map(|g| Phenotype::new(g.original_terms().join(" "), g.original_terms()))
                .collect())
        }
    }

    fn terms() -> Vec<String> {
        vec!["Mercury".to_string(), "Venus".to_string()]
    }

    fn engine(seed: u64) -> EvolutionEngine<StdRng> {
        EvolutionEngine::with_rng(Arc::new(EchoService), StdRng::seed_from_u64(seed))
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let mut engine = engine(1);
        let settings = EvolutionConfig {
            population_size: 3,
            max_generations: 2,
            ..Default::default()
        };
        assert_eq!(engine.state(), EngineState::Empty);

        let err = engine
            .evolve_generation(&Population::default(), &settings, "planets")
            .await
            .unwrap_err();
        assert!(matches!(err, MnemonicError::NotInitialized));

        let population = engine
            .initialize_population(&['M', 'V'], &terms(), "planets", 3)
            .await
            .unwrap();
        assert_eq!(engine.state(), EngineState::Initialized);

        let population = engine
            .evolve_generation(&population, &settings, "planets")
            .await
            .unwrap();
        assert_eq!(engine.state(), EngineState::Evolving { generation: 1 });

        let population = engine
            .evolve_generation(&population, &settings, "planets")
            .await
            .unwrap();
        assert_eq!(engine.state(), EngineState::Terminated);

        let err = engine
            .evolve_generation(&population, &settings, "planets")
            .await
            .unwrap_err();
        assert!(matches!(err, MnemonicError::Terminated { max_generations: 2 }));
    }

    #[tokio::test]
    async fn test_echo_words_score_full_ortho() {
        let mut engine = engine(2);
        let population = engine
            .initialize_population(&['M', 'V'], &terms(), "planets", 4)
            .await
            .unwrap();

        assert_eq!(population.len(), 4);
        for individual in population.iter() {
            assert_eq!(individual.ortho_score, 100.0);
            assert!(individual.fitness >= 100.0);
        }
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let mut engine = engine(3);
        let settings = EvolutionConfig {
            population_size: 4,
            elite_size: 1,
            ..Default::default()
        };
        let first = engine
            .initialize_population(&['M', 'V'], &terms(), "planets", 4)
            .await
            .unwrap();
        let second = engine
            .evolve_generation(&first, &settings, "planets")
            .await
            .unwrap();

        let mut ids: Vec<u64> = first.iter().chain(second.iter()).map(|i| i.id).collect();
        ids.sort_unstable();
        ids.dedup();
        // the elite appears in both generations
        assert_eq!(ids.len(), 7);
    }

    #[tokio::test]
    async fn test_degenerate_settings_keep_population() {
        let mut engine = engine(4);
        let population = engine
            .initialize_population(&['M', 'V'], &terms(), "planets", 2)
            .await
            .unwrap();
        let settings = EvolutionConfig {
            population_size: 2,
            elite_size: 2,
            ..Default::default()
        };

        let next = engine
            .evolve_generation(&population, &settings, "planets")
            .await
            .unwrap();
        let before: Vec<u64> = population.iter().map(|i| i.id).collect();
        let after: Vec<u64> = next.iter().map(|i| i.id).collect();
        assert_eq!(before, after);
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn test_cancellation_flag_is_shared() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
