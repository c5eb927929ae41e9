//! Bundled seed archive access.
//!
//! On first run there is no canonical archive and possibly no network; the
//! host ships a read-only seed archive with its build. How that resource is
//! looked up is platform territory, so the engine only sees this trait.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

/// Read-only access to build-time bundled resources, keyed by name.
pub trait BundleProvider: Send + Sync {
    /// Open the named resource as a byte stream.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Bundle provider resolving resources inside a directory.
///
/// Suits hosts that ship resources as plain files next to the executable;
/// tests use it with a temp directory.
pub struct DirBundleProvider {
    dir: PathBuf,
}

impl DirBundleProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BundleProvider for DirBundleProvider {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(self.dir.join(name))?;
        Ok(Box::new(file))
    }
}
