//! The synchronization engine.
//!
//! One `SyncEngine` instance owns all mutable sync state: the single-flight
//! download guard and the install gate. Hosts construct one engine per
//! content store and drive it on their own schedule, typically
//! `ensure_present` at startup followed by periodic `sync` calls.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::bundle::BundleProvider;
use crate::config::SyncConfig;
use crate::downloader::{DownloadCoordinator, DownloadDelegate};
use crate::freshness::FreshnessChecker;
use crate::http::HttpClient;
use crate::installer::ContentInstaller;
use crate::notify::ChangeNotifier;
use crate::store::ContentStore;
use crate::{Result, SyncError};

/// Outcome of a [`SyncEngine::sync`] cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The remote endpoint reported no newer content (or was unreachable).
    UpToDate,
    /// A download of newer content has been started.
    DownloadStarted,
    /// Newer content exists but a transfer was already running.
    AlreadyDownloading,
}

pub struct SyncEngine {
    config: SyncConfig,
    store: ContentStore,
    freshness: FreshnessChecker,
    coordinator: DownloadCoordinator,
    bundle: Arc<dyn BundleProvider>,
    notifier: Arc<dyn ChangeNotifier>,
    install_gate: Arc<Mutex<()>>,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        bundle: Arc<dyn BundleProvider>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Result<Self> {
        let client = Arc::new(HttpClient::new()?);
        let store = ContentStore::new(&config.content_root, &config.archive_name);
        let freshness = FreshnessChecker::new(
            Arc::clone(&client),
            config.ping_url.clone(),
            config.check_timeout,
        );
        let coordinator = DownloadCoordinator::new(client);

        Ok(Self {
            config,
            store,
            freshness,
            coordinator,
            bundle,
            notifier,
            install_gate: Arc::new(Mutex::new(())),
        })
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Seed the store from the bundled archive if nothing is installed yet.
    ///
    /// The seed goes through the same validate-extract-promote path as a
    /// downloaded archive. Returns whether a seed install actually ran.
    pub async fn ensure_present(&self) -> Result<bool> {
        if self.store.has_canonical() {
            return Ok(false);
        }

        let _gate = self.install_gate.lock().await;

        // An install may have completed while we waited on the gate
        if self.store.has_canonical() {
            return Ok(false);
        }

        log::info!(
            "No canonical archive present, seeding from bundled resource {}",
            self.config.bundle_resource
        );

        let bundle = Arc::clone(&self.bundle);
        let resource = self.config.bundle_resource.clone();
        let store = self.store.clone();

        tokio::task::spawn_blocking(move || seed_from_bundle(&*bundle, &resource, &store))
            .await
            .map_err(|e| SyncError::Io(std::io::Error::other(e)))??;

        self.notifier.content_updated();

        Ok(true)
    }

    /// Ask the remote endpoint whether newer content exists.
    pub async fn check_for_update(&self, last_updated: DateTime<Utc>) -> bool {
        self.freshness.check_for_update(last_updated).await
    }

    /// Start an asynchronous download-and-install of the remote archive.
    ///
    /// Returns `false` when a transfer is already in flight (the request is
    /// dropped). Completion is signaled solely through the change notifier;
    /// a failed cycle is logged and abandoned until the host triggers the
    /// next one.
    pub fn request_download(&self) -> bool {
        let delegate = Arc::new(InstallOnComplete {
            store: self.store.clone(),
            notifier: Arc::clone(&self.notifier),
            install_gate: Arc::clone(&self.install_gate),
        });

        self.coordinator.request(
            self.config.archive_url.clone(),
            self.store.download_path(),
            delegate,
        )
    }

    /// Run one full sync cycle: seed if needed, probe freshness, and kick
    /// off a download when the remote content is newer than `last_updated`.
    pub async fn sync(&self, last_updated: DateTime<Utc>) -> Result<SyncStatus> {
        self.ensure_present().await?;

        if !self.check_for_update(last_updated).await {
            return Ok(SyncStatus::UpToDate);
        }

        if self.request_download() {
            Ok(SyncStatus::DownloadStarted)
        } else {
            Ok(SyncStatus::AlreadyDownloading)
        }
    }
}

fn seed_from_bundle(bundle: &dyn BundleProvider, resource: &str, store: &ContentStore) -> Result<()> {
    let mut stream = bundle
        .open(resource)
        .map_err(|e| SyncError::BundleMissing {
            name: resource.to_string(),
            reason: e.to_string(),
        })?;

    store.ensure_root()?;
    let seed_path = store.download_path();

    let result = (|| -> Result<()> {
        let mut file = std::fs::File::create(&seed_path)?;
        std::io::copy(&mut stream, &mut file)?;
        file.sync_all()?;
        drop(file);

        ContentInstaller::new(store.clone()).install(&seed_path)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&seed_path);
    }

    result
}

/// Installs a downloaded archive and fires the change notification.
struct InstallOnComplete {
    store: ContentStore,
    notifier: Arc<dyn ChangeNotifier>,
    install_gate: Arc<Mutex<()>>,
}

#[async_trait]
impl DownloadDelegate for InstallOnComplete {
    async fn download_complete(&self, outcome: Result<PathBuf>) {
        let archive_path = match outcome {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Content download abandoned: {}", e);
                return;
            }
        };

        let _gate = self.install_gate.lock().await;

        let store = self.store.clone();
        let result =
            tokio::task::spawn_blocking(move || ContentInstaller::new(store).install(&archive_path))
                .await;

        match result {
            Ok(Ok(())) => self.notifier.content_updated(),
            Ok(Err(e)) => {
                log::error!("Install of downloaded archive failed: {}", e);
                let _ = std::fs::remove_file(self.store.download_path());
            }
            Err(e) => log::error!("Install task failed to run: {}", e),
        }
    }
}
