//! Concurrent consumer loop over a job queue

use crate::pipeline::{Disposition, Pipeline};
use crate::queue::JobQueue;
use std::sync::Arc;

/// Pulls deliveries off the queue and runs them through the pipeline.
///
/// Each consumer task processes one delivery at a time; concurrency comes
/// from running several tasks against the shared queue.
pub struct Worker {
    queue: Arc<dyn JobQueue>,
    pipeline: Arc<Pipeline>,
}

impl Worker {
    pub fn new(queue: Arc<dyn JobQueue>, pipeline: Arc<Pipeline>) -> Self {
        Worker { queue, pipeline }
    }

    /// Run `concurrency` consumer tasks until the queue is closed and
    /// drained.
    pub async fn run(&self, concurrency: usize) {
        let concurrency = concurrency.max(1);
        tracing::info!("starting {concurrency} consumer tasks");

        let mut tasks = Vec::with_capacity(concurrency);
        for task_id in 0..concurrency {
            let queue = Arc::clone(&self.queue);
            let pipeline = Arc::clone(&self.pipeline);
            tasks.push(tokio::spawn(async move {
                while let Some(delivery) = queue.receive().await {
                    let disposition = pipeline.handle(&delivery).await;
                    let settled = match disposition {
                        Disposition::Ack => queue.ack(&delivery).await,
                        Disposition::Nack => queue.nack(&delivery).await,
                    };
                    if let Err(e) = settled {
                        tracing::error!("failed to settle delivery {}: {e}", delivery.id);
                    }
                }
                tracing::debug!("consumer task {task_id} finished");
            }));
        }

        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!("consumer task panicked: {e}");
            }
        }
    }
}
