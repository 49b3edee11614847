use crate::config::manager::AppConfig;
use crate::engines::generation::evolution_engine::{CancellationFlag, EvolutionEngine, RunSummary};
use crate::engines::generation::progress::{ChannelProgressCallback, ProgressMessage};
use crate::error::{MnemonicError, Result};
use crate::services::expression::ExpressionService;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

/// Runs an evolution on a background tokio task and streams its progress.
pub struct EvolutionRunner {
    handle: Option<JoinHandle<Result<RunSummary>>>,
    progress_rx: UnboundedReceiver<ProgressMessage>,
    cancel_flag: CancellationFlag,
}

impl EvolutionRunner {
    /// Start evolution in a background task. Must be called from within a
    /// tokio runtime.
    pub fn start(service: Arc<dyn ExpressionService>, config: AppConfig) -> Result<Self> {
        config.validate()?;

        let (progress_tx, progress_rx) = unbounded_channel();
        let cancel_flag = CancellationFlag::new();
        let task_flag = cancel_flag.clone();

        let handle = tokio::spawn(async move {
            let mut engine = EvolutionEngine::new(service, &config.evolution)
                .with_fitness(config.run.fitness.build());
            let mut callback = ChannelProgressCallback::new(progress_tx);

            engine
                .run(&config.evolution, &config.run, &mut callback, &task_flag)
                .await
        });

        Ok(Self {
            handle: Some(handle),
            progress_rx,
            cancel_flag,
        })
    }

    /// Poll for progress updates (non-blocking)
    pub fn poll_progress(&mut self) -> Option<ProgressMessage> {
        self.progress_rx.try_recv().ok()
    }

    /// Wait for the next progress update. `None` once the run has ended and
    /// every update was drained.
    pub async fn next_progress(&mut self) -> Option<ProgressMessage> {
        self.progress_rx.recv().await
    }

    pub fn cancel(&self) {
        self.cancel_flag.cancel();
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel_flag.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the run to end and take its summary.
    pub async fn join(mut self) -> Result<RunSummary> {
        let handle = self.handle.take().ok_or_else(|| {
            MnemonicError::EvolutionStepFailed("evolution task already joined".to_string())
        })?;

        handle.await.map_err(|e| {
            MnemonicError::EvolutionStepFailed(format!("evolution task failed: {}", e))
        })?
    }
}

impl Drop for EvolutionRunner {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel_flag.cancel();
        }
    }
}
