//! On-disk content store layout and queries.
//!
//! The store root holds the canonical archive file plus the extracted tree:
//!
//! ```text
//! <root>/latest.zip        canonical archive (last fully installed version)
//! <root>/latest.zip.part   transient download destination
//! <root>/web/...           extracted tree, mirrors archive entry paths
//! ```
//!
//! The store itself is read-only bookkeeping; all mutation of the tree and
//! the canonical archive goes through [`crate::ContentInstaller`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the root holding the extracted content tree.
const CONTENT_DIR: &str = "web";

/// Suffix appended to the archive name for in-progress downloads.
const PART_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    archive_name: String,
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>, archive_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            archive_name: archive_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the canonical archive file.
    pub fn canonical_archive(&self) -> PathBuf {
        self.root.join(&self.archive_name)
    }

    /// Temporary destination for an in-flight archive transfer.
    pub fn download_path(&self) -> PathBuf {
        self.root.join(format!("{}{}", self.archive_name, PART_SUFFIX))
    }

    /// Root of the extracted content tree.
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    /// Whether a canonical archive has ever been installed.
    pub fn has_canonical(&self) -> bool {
        self.canonical_archive().is_file()
    }

    /// Whether an extracted content tree is present.
    pub fn has_content(&self) -> bool {
        self.content_dir().is_dir()
    }

    /// Create the store root if it does not exist yet.
    pub fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Resolve a rendered page inside the content tree.
    ///
    /// Returns the path only when the file actually exists.
    pub fn page_path(&self, section: &str, slug: &str) -> Option<PathBuf> {
        let path = self
            .content_dir()
            .join(section)
            .join(format!("{}.html", slug));

        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Read a rendered page for display.
    pub fn read_page(&self, section: &str, slug: &str) -> io::Result<String> {
        match self.page_path(section, slug) {
            Some(path) => fs::read_to_string(path),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no page for {}/{}", section, slug),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_paths() {
        let store = ContentStore::new("/data/content", "latest.zip");

        assert_eq!(store.root(), Path::new("/data/content"));
        assert_eq!(
            store.canonical_archive(),
            PathBuf::from("/data/content/latest.zip")
        );
        assert_eq!(
            store.download_path(),
            PathBuf::from("/data/content/latest.zip.part")
        );
        assert_eq!(store.content_dir(), PathBuf::from("/data/content/web"));
    }

    #[test]
    fn test_store_probes() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path(), "latest.zip");

        assert!(!store.has_canonical());
        assert!(!store.has_content());

        fs::write(store.canonical_archive(), b"zip").unwrap();
        fs::create_dir_all(store.content_dir()).unwrap();

        assert!(store.has_canonical());
        assert!(store.has_content());
    }

    #[test]
    fn test_page_lookup() {
        let temp = TempDir::new().unwrap();
        let store = ContentStore::new(temp.path(), "latest.zip");

        let section = store.content_dir().join("news");
        fs::create_dir_all(&section).unwrap();
        fs::write(section.join("launch.html"), "<h1>hello</h1>").unwrap();

        assert!(store.page_path("news", "launch").is_some());
        assert!(store.page_path("news", "missing").is_none());
        assert_eq!(store.read_page("news", "launch").unwrap(), "<h1>hello</h1>");
        assert!(store.read_page("news", "missing").is_err());
    }
}
