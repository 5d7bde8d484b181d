//! Windowed batch loading of question pools.

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use quizdrill_core::model::Question;

use crate::error::LoadError;
use crate::fetcher::Fetcher;

/// Default number of documents fetched concurrently per window.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Load and pool the questions of every document in `files`, in order.
///
/// Documents are fetched in windows of `batch_size`; within a window the
/// fetches run concurrently but contribute their questions in `files` order.
/// A document that still fails after retries contributes nothing. A
/// cancellation aborts the whole load.
#[instrument(skip(fetcher, files, cancel), fields(files = files.len()))]
pub async fn load_pool(
    fetcher: &Fetcher,
    files: &[String],
    batch_size: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Question>, LoadError> {
    let batch_size = batch_size.max(1);
    let mut pool = Vec::new();

    for window in files.chunks(batch_size) {
        if cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let fetches = window.iter().map(|file| async move {
            match fetcher.fetch(file, cancel).await {
                Ok(set) => Ok(set.questions),
                Err(err) if err.is_cancelled() => Err(err),
                Err(err) => {
                    warn!(file = file.as_str(), error = %err, "dropping failed document from pool");
                    Ok(Vec::new())
                }
            }
        });

        for contribution in join_all(fetches).await {
            pool.extend(contribution?);
        }
    }

    debug!(questions = pool.len(), "pool assembled");
    Ok(pool)
}
