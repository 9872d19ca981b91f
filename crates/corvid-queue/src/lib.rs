//! In-process background job queue for the Corvid worker.
//!
//! Jobs are enqueued without waiting for execution and drained by a single
//! spawned worker task. Execution failures are logged and counted, never
//! propagated back to the enqueuer. Durability and cross-process delivery
//! are explicitly out of scope.

mod job;
mod queue;

pub use job::{Job, JobEnvelope};
pub use queue::{JobExecutor, JobQueue, JobReceiver, QueueError};
