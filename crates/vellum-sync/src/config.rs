//! Engine configuration.
//!
//! `SyncConfig` carries everything that varies per deployment: the writable
//! content root, the remote endpoint URLs, the on-disk archive name, the
//! bundled seed resource name, and the freshness-check timeout. One engine
//! instance owns one config; there is no ambient global state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_ARCHIVE_NAME: &str = "latest.zip";
const DEFAULT_BUNDLE_RESOURCE: &str = "web.zip";
const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(4);

/// Deployment-specific settings for a [`crate::SyncEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Writable directory holding the canonical archive and extracted tree.
    pub content_root: PathBuf,
    /// Endpoint answering conditional freshness probes.
    pub ping_url: String,
    /// Endpoint serving the content archive.
    pub archive_url: String,
    /// File name of the canonical archive under `content_root`.
    pub archive_name: String,
    /// Name of the bundled seed archive resource.
    pub bundle_resource: String,
    /// Upper bound on the freshness probe; past this the engine assumes offline.
    pub check_timeout: Duration,
}

impl SyncConfig {
    pub fn new(
        content_root: impl Into<PathBuf>,
        ping_url: impl Into<String>,
        archive_url: impl Into<String>,
    ) -> Self {
        Self {
            content_root: content_root.into(),
            ping_url: ping_url.into(),
            archive_url: archive_url.into(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            bundle_resource: DEFAULT_BUNDLE_RESOURCE.to_string(),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    pub fn with_archive_name(mut self, archive_name: impl Into<String>) -> Self {
        self.archive_name = archive_name.into();
        self
    }

    pub fn with_bundle_resource(mut self, bundle_resource: impl Into<String>) -> Self {
        self.bundle_resource = bundle_resource.into();
        self
    }

    pub fn with_check_timeout(mut self, check_timeout: Duration) -> Self {
        self.check_timeout = check_timeout;
        self
    }
}
