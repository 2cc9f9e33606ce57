use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::error::{PackagerError, PackagerResult};

/// Cooperative cancellation flag shared between a caller and a running workflow.
///
/// Workflows poll it between files and between stages. A cancelled unpack
/// leaves the output directory untouched; a cancelled pack leaves no archive.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn checkpoint(&self, stage: &'static str) -> PackagerResult<()> {
        if self.is_cancelled() {
            warn!(stage, "Cancellation requested");
            return Err(PackagerError::Cancelled(stage));
        }
        Ok(())
    }
}
