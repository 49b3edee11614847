use acrostic_ga::config::{AppConfig, EvolutionConfig, FitnessMode, RunConfig};
use acrostic_ga::engines::evaluation::fitness::WEIGHTED_FITNESS_CAP;
use acrostic_ga::engines::generation::{
    CancellationFlag, EngineState, EvolutionEngine, Genome, ProgressCallback, ProgressMessage,
    GenerationStats,
};
use acrostic_ga::services::{EvolutionRunner, ExpressionService};
use acrostic_ga::types::{Phenotype, Population};
use acrostic_ga::{MnemonicError, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Echoes the target terms back as the chosen words and records batch sizes.
#[derive(Default)]
struct RecordingService {
    batches: Mutex<Vec<usize>>,
}

impl RecordingService {
    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExpressionService for RecordingService {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        _topic: &str,
        _target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        self.batches.lock().unwrap().push(genomes.len());
        Ok(genomes
            .iter()
            .map(|g| {
                let mut phenotype = Phenotype::new(g.describe(), g.original_terms());
                phenotype.memorability = 80.0;
                phenotype.coherence = 90.0;
                phenotype
            })
            .collect())
    }
}

/// Services that misbehave in one specific way.
enum Faulty {
    Error,
    Empty,
    Short,
}

#[async_trait]
impl ExpressionService for Faulty {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        _topic: &str,
        _target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        match self {
            Faulty::Error => Err(MnemonicError::ExpressionService("upstream down".into())),
            Faulty::Empty => Ok(Vec::new()),
            Faulty::Short => Ok(genomes
                .iter()
                .take(1)
                .map(|_| Phenotype::new("Merry Vikings", vec!["Merry".into(), "Vikings".into()]))
                .collect()),
        }
    }
}

/// Always answers with the same sentence.
struct FixedService;

#[async_trait]
impl ExpressionService for FixedService {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        _topic: &str,
        _target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        Ok(genomes
            .iter()
            .map(|_| Phenotype::new("Mighty Volcano", vec!["Mighty".into(), "Volcano".into()]))
            .collect())
    }
}

/// Answers the first call normally, then behaves like `later`.
struct DegradingService {
    calls: AtomicUsize,
    later: Faulty,
}

impl DegradingService {
    fn new(later: Faulty) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            later,
        }
    }
}

#[async_trait]
impl ExpressionService for DegradingService {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        topic: &str,
        target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return FixedService.express_batch(genomes, topic, target_terms).await;
        }
        self.later.express_batch(genomes, topic, target_terms).await
    }
}

/// Sets the cancellation flag while serving call number `cancel_on`.
struct CancellingService {
    flag: CancellationFlag,
    calls: AtomicUsize,
    cancel_on: usize,
}

#[async_trait]
impl ExpressionService for CancellingService {
    async fn express_batch(
        &self,
        genomes: &[Genome],
        _topic: &str,
        _target_terms: &[String],
    ) -> Result<Vec<Phenotype>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.cancel_on {
            self.flag.cancel();
        }
        Ok(genomes
            .iter()
            .map(|g| Phenotype::new(g.describe(), g.original_terms()))
            .collect())
    }
}

#[derive(Default)]
struct TestProgressCallback {
    completed: Vec<usize>,
}

impl ProgressCallback for TestProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_batch_submitted(&mut self, _generation: usize, _batch_size: usize) {}

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        self.completed.push(stats.generation);
    }
}

fn mercury_venus() -> Vec<String> {
    vec!["Mercury".to_string(), "Venus".to_string()]
}

fn settings(population_size: usize, elite_size: usize, max_generations: usize) -> EvolutionConfig {
    EvolutionConfig {
        population_size,
        elite_size,
        max_generations,
        seed: Some(42),
        ..Default::default()
    }
}

fn run_config(terms: &str) -> RunConfig {
    RunConfig {
        topic: "planets in order".to_string(),
        terms: terms.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_two_planet_run_sends_one_child_per_generation() {
    let service = Arc::new(RecordingService::default());
    let mut engine =
        EvolutionEngine::with_rng(service.clone(), StdRng::seed_from_u64(1));
    let settings = settings(2, 1, 3);
    let mut callback = TestProgressCallback::default();

    let summary = engine
        .run(
            &settings,
            &run_config("Mercury\nVenus"),
            &mut callback,
            &CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(service.batch_sizes(), vec![2, 1, 1, 1]);
    assert_eq!(summary.generations_completed, 3);
    assert!(!summary.cancelled);
    assert_eq!(callback.completed, vec![0, 1, 2, 3]);
    assert_eq!(summary.history.len(), 4);
    assert_eq!(engine.state(), EngineState::Terminated);

    assert_eq!(summary.population.len(), 2);
    for individual in summary.population.iter() {
        assert_eq!(individual.genome.letters(), vec!['M', 'V']);
        assert_eq!(individual.ortho_score, 100.0);
    }
    assert!(!summary.hall_of_fame.is_empty());
}

#[tokio::test]
async fn test_initial_population_is_scored_and_sorted() {
    let mut engine = EvolutionEngine::with_rng(Arc::new(FixedService), StdRng::seed_from_u64(10));

    let population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 2)
        .await
        .unwrap();

    assert_eq!(population.len(), 2);
    let fitness: Vec<f64> = population.iter().map(|i| i.fitness).collect();
    assert!(fitness.iter().all(|f| f.is_finite() && *f >= 0.0));
    assert!(fitness[0] >= fitness[1]);
    for individual in population.iter() {
        assert_eq!(individual.phenotype.sentence, "Mighty Volcano");
        assert!(individual.ortho_score > 0.0);
    }
}

#[tokio::test]
async fn test_elites_survive_unchanged() {
    let service = Arc::new(RecordingService::default());
    let mut engine = EvolutionEngine::with_rng(service, StdRng::seed_from_u64(2));
    let settings = settings(6, 2, 5);

    let mut population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 6)
        .await
        .unwrap();

    for _ in 0..settings.max_generations {
        let next = engine
            .evolve_generation(&population, &settings, "planets")
            .await
            .unwrap();

        assert_eq!(next.len(), settings.population_size);
        for elite in population.elites(settings.elite_size) {
            let survivor = next
                .iter()
                .find(|i| i.id == elite.id)
                .expect("elite missing from next generation");
            assert!(Arc::ptr_eq(elite, survivor));
            assert_eq!(survivor.fitness, elite.fitness);
        }
        assert!(next.best().unwrap().fitness >= population.best().unwrap().fitness);

        population = next;
    }
}

#[tokio::test]
async fn test_single_offspring_batch_when_elites_fill_population() {
    let service = Arc::new(RecordingService::default());
    let mut engine = EvolutionEngine::with_rng(service.clone(), StdRng::seed_from_u64(3));
    let settings = settings(4, 3, 2);

    let population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 4)
        .await
        .unwrap();
    engine
        .evolve_generation(&population, &settings, "planets")
        .await
        .unwrap();

    assert_eq!(service.batch_sizes(), vec![4, 1]);
}

#[tokio::test]
async fn test_service_error_propagates() {
    let mut engine = EvolutionEngine::with_rng(Arc::new(Faulty::Error), StdRng::seed_from_u64(4));

    let err = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 3)
        .await
        .unwrap_err();

    assert!(matches!(err, MnemonicError::ExpressionService(_)));
    assert_eq!(engine.state(), EngineState::Empty);
}

#[tokio::test]
async fn test_empty_batch_fails_the_step() {
    let mut engine = EvolutionEngine::with_rng(Arc::new(Faulty::Empty), StdRng::seed_from_u64(5));

    let err = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 3)
        .await
        .unwrap_err();

    assert!(matches!(err, MnemonicError::EvolutionStepFailed(_)));
}

#[tokio::test]
async fn test_evolving_empty_population_fails_without_advancing() {
    let mut engine = EvolutionEngine::with_rng(Arc::new(FixedService), StdRng::seed_from_u64(11));
    engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 3)
        .await
        .unwrap();

    let err = engine
        .evolve_generation(&Population::default(), &settings(3, 1, 5), "planets")
        .await
        .unwrap_err();

    assert!(matches!(err, MnemonicError::EmptyPopulation));
    assert_eq!(engine.state(), EngineState::Initialized);
    assert_eq!(engine.generation(), 0);
}

#[tokio::test]
async fn test_empty_offspring_batch_fails_generation() {
    let service = Arc::new(DegradingService::new(Faulty::Empty));
    let mut engine = EvolutionEngine::with_rng(service, StdRng::seed_from_u64(12));
    let population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 3)
        .await
        .unwrap();

    let err = engine
        .evolve_generation(&population, &settings(3, 1, 5), "planets")
        .await
        .unwrap_err();

    assert!(matches!(err, MnemonicError::EvolutionStepFailed(_)));
    assert_eq!(engine.state(), EngineState::Initialized);
    assert_eq!(engine.generation(), 0);
}

#[tokio::test]
async fn test_service_error_during_generation_propagates() {
    let service = Arc::new(DegradingService::new(Faulty::Error));
    let mut engine = EvolutionEngine::with_rng(service, StdRng::seed_from_u64(13));
    let population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 3)
        .await
        .unwrap();

    let err = engine
        .evolve_generation(&population, &settings(3, 1, 5), "planets")
        .await
        .unwrap_err();

    assert!(matches!(err, MnemonicError::ExpressionService(_)));
    assert_eq!(engine.state(), EngineState::Initialized);
    assert_eq!(engine.generation(), 0);
}

#[tokio::test]
async fn test_short_batch_is_padded_with_placeholders() {
    let mut engine = EvolutionEngine::with_rng(Arc::new(Faulty::Short), StdRng::seed_from_u64(6));

    let population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 3)
        .await
        .unwrap();

    assert_eq!(population.len(), 3);
    let placeholders = population
        .iter()
        .filter(|i| i.phenotype.is_fallback_for(&i.genome))
        .count();
    assert_eq!(placeholders, 2);
    assert!(population
        .iter()
        .any(|i| i.phenotype.sentence == "Merry Vikings" && i.ortho_score > 0.0));
}

#[tokio::test]
async fn test_cancellation_discards_in_flight_generation() {
    let flag = CancellationFlag::new();
    let service = Arc::new(CancellingService {
        flag: flag.clone(),
        calls: AtomicUsize::new(0),
        cancel_on: 2,
    });
    let mut engine = EvolutionEngine::with_rng(service, StdRng::seed_from_u64(7));
    let mut callback = TestProgressCallback::default();

    let summary = engine
        .run(&settings(4, 1, 5), &run_config("Mercury\nVenus"), &mut callback, &flag)
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.generations_completed, 0);
    assert_eq!(callback.completed, vec![0]);

    let mut ids: Vec<u64> = summary.population.iter().map(|i| i.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_run_rejects_empty_terms() {
    let mut engine =
        EvolutionEngine::with_rng(Arc::new(RecordingService::default()), StdRng::seed_from_u64(8));
    let mut callback = TestProgressCallback::default();

    let err = engine
        .run(
            &settings(2, 1, 1),
            &run_config("\n  \n"),
            &mut callback,
            &CancellationFlag::new(),
        )
        .await
        .err()
        .expect("empty input must fail");

    assert!(matches!(err, MnemonicError::EmptyTerm));
}

#[tokio::test]
async fn test_weighted_fitness_is_capped() {
    let mut engine = EvolutionEngine::with_rng(
        Arc::new(RecordingService::default()),
        StdRng::seed_from_u64(9),
    )
    .with_fitness(FitnessMode::Weighted.build());

    let population = engine
        .initialize_population(&['M', 'V'], &mercury_venus(), "planets", 5)
        .await
        .unwrap();

    for individual in population.iter() {
        assert!(individual.fitness <= WEIGHTED_FITNESS_CAP);
        assert!(individual.fitness >= 0.4 * 80.0 + 0.6 * 90.0);
    }
}

#[tokio::test]
async fn test_runner_streams_progress_and_returns_summary() {
    let mut config = AppConfig::default();
    config.evolution = settings(3, 1, 2);
    config.run = run_config("• Mercury\n• Venus\n• Earth");

    let service = Arc::new(RecordingService::default());
    let mut runner = EvolutionRunner::start(service.clone(), config).unwrap();

    let mut completed = Vec::new();
    while let Some(message) = runner.next_progress().await {
        if let ProgressMessage::GenerationComplete(stats) = message {
            completed.push(stats.generation);
        }
    }

    let summary = runner.join().await.unwrap();

    assert_eq!(completed, vec![0, 1, 2]);
    assert_eq!(summary.generations_completed, 2);
    assert_eq!(service.batch_sizes(), vec![3, 2, 2]);
    for individual in summary.population.iter() {
        assert_eq!(individual.genome.letters(), vec!['M', 'V', 'E']);
    }
}

#[tokio::test]
async fn test_runner_rejects_invalid_config() {
    let mut config = AppConfig::default();
    config.evolution.elite_size = config.evolution.population_size;

    let result = EvolutionRunner::start(Arc::new(RecordingService::default()), config);
    assert!(matches!(result, Err(MnemonicError::Configuration(_))));
}
