//! Synchronization engine keeping a local tree of rendered content in step
//! with a remote archive, so an offline-capable viewer always has a usable,
//! internally consistent copy on disk.

pub mod bundle;
pub mod config;
pub mod downloader;
pub mod engine;
pub mod error;
pub mod freshness;
pub mod http;
pub mod installer;
pub mod notify;
pub mod store;

pub use bundle::{BundleProvider, DirBundleProvider};
pub use config::SyncConfig;
pub use downloader::{ArchiveExtractor, DownloadCoordinator, DownloadDelegate};
pub use engine::{SyncEngine, SyncStatus};
pub use error::{Result, SyncError};
pub use freshness::FreshnessChecker;
pub use http::{HttpClient, HttpClientConfig};
pub use installer::ContentInstaller;
pub use notify::{ChangeNotifier, NoopNotifier};
pub use store::ContentStore;
