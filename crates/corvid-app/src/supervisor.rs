//! Readiness signalling to a supervising parent process.
//!
//! When the worker runs under a process supervisor, the supervisor passes a
//! pipe (or file) path via `CORVID_READY_PIPE`; writing a `ready` line to it
//! tells the supervisor the worker is accepting traffic. Without the
//! variable the worker runs standalone and only logs readiness.

use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Environment variable naming the supervisor's readiness pipe.
pub const READY_PIPE_ENV: &str = "CORVID_READY_PIPE";

const READY_MESSAGE: &[u8] = b"ready\n";

/// Signal readiness to the supervisor when one is attached.
///
/// Returns whether a supervisor was notified.
///
/// # Errors
///
/// Returns an error if the configured pipe cannot be opened or written.
pub async fn notify_ready() -> AppResult<bool> {
    match std::env::var(READY_PIPE_ENV) {
        Ok(path) if !path.is_empty() => {
            notify_ready_at(Path::new(&path)).await?;
            Ok(true)
        }
        _ => {
            info!("no supervisor pipe configured; running standalone");
            Ok(false)
        }
    }
}

pub(crate) async fn notify_ready_at(path: &Path) -> AppResult<()> {
    let mut pipe = OpenOptions::new()
        .append(true)
        .open(path)
        .await
        .map_err(|source| AppError::io("supervisor.open_pipe", source))?;
    pipe.write_all(READY_MESSAGE)
        .await
        .map_err(|source| AppError::io("supervisor.write_ready", source))?;
    pipe.flush()
        .await
        .map_err(|source| AppError::io("supervisor.flush_ready", source))?;
    info!(pipe = %path.display(), "signalled readiness to supervisor");
    Ok(())
}
