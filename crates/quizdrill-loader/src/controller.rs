//! Load supersession: at most one live load at a time.

use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Hands out cancellation tokens so that starting a load kills the previous
/// one.
///
/// Every load operation takes a token from [`begin`](Self::begin); a later
/// `begin` cancels the earlier token, so results from a superseded load are
/// dropped by the pipeline instead of arriving late.
#[derive(Default)]
pub struct LoadController {
    current: Mutex<Option<CancellationToken>>,
}

impl LoadController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the in-flight load, if any, and hand out a token for the next
    /// one.
    pub fn begin(&self) -> CancellationToken {
        let mut current = self.lock();
        if let Some(previous) = current.take() {
            debug!("superseding in-flight load");
            previous.cancel();
        }

        let token = CancellationToken::new();
        *current = Some(token.clone());
        token
    }

    /// Cancel the in-flight load without starting a new one.
    pub fn cancel_current(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
