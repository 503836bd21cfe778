// crates/blobcheck-validate/src/task.rs
// ============================================================================
// Module: Blocking Tasks
// Description: Runs blocking database work on the Tokio blocking pool.
// Purpose: Keep async phases responsive while statements execute.
// Dependencies: tokio
// ============================================================================

use crate::error::PhaseError;

/// Runs `work` on the blocking pool and flattens join failures.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, PhaseError>
where
    F: FnOnce() -> Result<T, PhaseError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(err) => Err(PhaseError::Task(err.to_string())),
    }
}
