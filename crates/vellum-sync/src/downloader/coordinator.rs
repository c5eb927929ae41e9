//! Single-flight archive transfers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::http::HttpClient;
use crate::Result;

/// Receives the outcome of a transfer requested through
/// [`DownloadCoordinator::request`].
///
/// The call arrives on the transfer task, not on the context that issued the
/// request; implementations must not assume otherwise. The job stays in
/// flight until this returns, so work done here (such as installing the
/// downloaded archive) is serialized with any later download.
#[async_trait]
pub trait DownloadDelegate: Send + Sync {
    async fn download_complete(&self, outcome: Result<PathBuf>);
}

/// Runs archive transfers, at most one at a time per instance.
pub struct DownloadCoordinator {
    client: Arc<HttpClient>,
    in_flight: Arc<AtomicBool>,
}

impl DownloadCoordinator {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a transfer is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start an asynchronous transfer of `url` into `dest`.
    ///
    /// Returns `false` without doing anything when a transfer is already in
    /// flight: duplicate requests are dropped, not queued. Otherwise the
    /// transfer runs on a spawned task; on success `dest` holds the complete
    /// payload, on failure `dest` is removed. Either way the delegate is
    /// invoked exactly once, and only after it returns does the coordinator
    /// accept new requests.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, url: String, dest: PathBuf, delegate: Arc<dyn DownloadDelegate>) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            log::debug!("Transfer already in flight, dropping request for {}", url);
            return false;
        }

        let client = Arc::clone(&self.client);
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            log::info!("Downloading {}", url);

            let outcome = match client.download(&url, &dest).await {
                Ok(()) => Ok(dest),
                Err(e) => {
                    log::warn!("Download of {} failed: {}", url, e);
                    Err(e)
                }
            };

            delegate.download_complete(outcome).await;
            in_flight.store(false, Ordering::SeqCst);
        });

        true
    }
}
