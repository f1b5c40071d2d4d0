//! Cooperative cancellation

use crate::error::{Result, StoreError};

pub use tokio_util::sync::CancellationToken;

/// Bail out with `Canceled` once the caller has given up
pub(crate) fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(StoreError::Canceled)
    } else {
        Ok(())
    }
}
