//! Queue handle and worker loop.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use corvid_telemetry::Metrics;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::job::{Job, JobEnvelope};

/// Seam the application implements to run dequeued jobs.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Execute one job to completion.
    async fn execute(&self, envelope: &JobEnvelope) -> anyhow::Result<()>;
}

/// Errors raised when accepting work onto the queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The worker has stopped and the queue no longer accepts jobs.
    #[error("job queue is closed")]
    Closed,
}

/// Receiving half of the queue; consumed when the worker loop starts.
pub struct JobReceiver {
    receiver: mpsc::UnboundedReceiver<JobEnvelope>,
    metrics: Metrics,
}

impl JobReceiver {
    /// Spawn the worker loop draining this receiver.
    ///
    /// Jobs enqueued before the worker starts simply buffer in the channel.
    #[must_use]
    pub fn start(self, executor: Arc<dyn JobExecutor>) -> JoinHandle<()> {
        tokio::spawn(run_worker(self.receiver, executor, self.metrics))
    }
}

/// Cloneable handle for enqueueing background jobs.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<JobEnvelope>,
    metrics: Metrics,
}

impl JobQueue {
    /// Create the queue without starting its worker.
    ///
    /// The returned receiver is handed to [`JobReceiver::start`] once the
    /// rest of the process is ready; enqueueing is valid immediately.
    #[must_use]
    pub fn channel(metrics: Metrics) -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender,
                metrics: metrics.clone(),
            },
            JobReceiver { receiver, metrics },
        )
    }

    /// Create the queue and spawn its worker in one step.
    #[must_use]
    pub fn start(executor: Arc<dyn JobExecutor>, metrics: Metrics) -> (Self, JoinHandle<()>) {
        let (queue, receiver) = Self::channel(metrics);
        let worker = receiver.start(executor);
        (queue, worker)
    }

    /// Accept a job for asynchronous execution.
    ///
    /// Returns the queue-assigned job id immediately; the job's eventual
    /// success or failure is never reported back through this handle.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] when the worker has stopped.
    pub fn enqueue(&self, job: Job) -> Result<Uuid, QueueError> {
        let envelope = JobEnvelope {
            id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
            job,
        };
        let id = envelope.id;
        let kind = envelope.job.kind();
        self.sender.send(envelope).map_err(|_| QueueError::Closed)?;
        self.metrics.inc_job_enqueued(kind);
        debug!(job_id = %id, kind, "enqueued background job");
        Ok(id)
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<JobEnvelope>,
    executor: Arc<dyn JobExecutor>,
    metrics: Metrics,
) {
    while let Some(envelope) = receiver.recv().await {
        let kind = envelope.job.kind();
        debug!(job_id = %envelope.id, kind, "executing background job");
        match executor.execute(&envelope).await {
            Ok(()) => metrics.inc_job_completed(kind),
            Err(error) => {
                warn!(job_id = %envelope.id, kind, error = %error, "background job failed");
                metrics.inc_job_failed(kind);
            }
        }
    }
    debug!("job queue worker drained");
}
