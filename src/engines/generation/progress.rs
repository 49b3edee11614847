use super::evolution_engine::ProgressCallback;
use super::stats::GenerationStats;
use tokio::sync::mpsc::UnboundedSender;

/// Logs progress through the `log` facade.
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        if generation == 0 {
            log::info!("Initializing population...");
        } else {
            log::info!("Generation {} starting...", generation);
        }
    }

    fn on_batch_submitted(&mut self, _generation: usize, batch_size: usize) {
        log::debug!("  Requesting {} sentences", batch_size);
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        log::info!(
            "Generation {} complete. Best: {:.2} (ortho {:.1}), avg: {:.2}, diversity: {} | {}",
            stats.generation,
            stats.best_fitness,
            stats.best_ortho_score,
            stats.average_fitness,
            stats.genome_diversity,
            stats.best_sentence
        );
    }
}

// For streaming progress to another task
pub struct ChannelProgressCallback {
    sender: UnboundedSender<ProgressMessage>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    GenerationStart(usize),
    BatchSubmitted { generation: usize, batch_size: usize },
    GenerationComplete(GenerationStats),
}

impl ChannelProgressCallback {
    pub fn new(sender: UnboundedSender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_batch_submitted(&mut self, generation: usize, batch_size: usize) {
        let _ = self.sender.send(ProgressMessage::BatchSubmitted {
            generation,
            batch_size,
        });
    }

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete(stats.clone()));
    }
}
