use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    // Network errors (timeout, DNS failure, connection refused)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Unexpected but well-formed server responses
    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    // Malformed or truncated archives
    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    // Bundled seed resource could not be opened
    #[error("Bundled resource {name} unavailable: {reason}")]
    BundleMissing { name: String, reason: String },

    // IO errors (permission denied, disk full)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
