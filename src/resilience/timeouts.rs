//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap each backend attempt with a deadline
//! - Cancel the in-flight call cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timeout is a `BackendError` like any other failure

use std::future::Future;
use std::time::Duration;

use crate::client::BackendError;

/// Run `attempt`, failing with `BackendError::Timeout` after `deadline`.
pub async fn with_deadline<F, T>(deadline: Duration, attempt: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match tokio::time::timeout(deadline, attempt).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(deadline)),
    }
}
