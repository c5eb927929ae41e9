//! Archive validation and installation.
//!
//! An install never extracts into the live tree. The candidate archive is
//! extracted into a staging directory first; only once every entry has been
//! written does the staged tree replace the live one, and only after that
//! does the candidate become the canonical archive. A consumer of the store
//! therefore always sees exactly one complete content version.

use std::fs::{self, File};
use std::path::Path;

use crate::downloader::ArchiveExtractor;
use crate::store::ContentStore;
use crate::{Result, SyncError};

/// Prefix for the directory holding the outgoing tree during a swap.
const OLD_TREE_NAME: &str = ".old-web";

pub struct ContentInstaller {
    store: ContentStore,
}

impl ContentInstaller {
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }

    /// Install the archive at `archive_path` as the new content version.
    ///
    /// Blocking; run it off any latency-sensitive context. On failure the
    /// previously installed tree and canonical archive are still in place,
    /// and the candidate has not been promoted. Re-installing the canonical
    /// archive itself is permitted and reproduces the same tree.
    pub fn install(&self, archive_path: &Path) -> Result<()> {
        log::info!("Installing content archive {}", archive_path.display());

        let archive = File::open(archive_path)?;

        self.store.ensure_root()?;

        // Extraction failure drops the staging dir and nothing else changed
        let staging = tempfile::Builder::new()
            .prefix(".stage-")
            .tempdir_in(self.store.root())?;
        ArchiveExtractor::extract(archive, staging.path())?;

        let staged = staging.keep();
        if let Err(e) = self.swap_content(&staged) {
            let _ = fs::remove_dir_all(&staged);
            return Err(e);
        }

        self.promote(archive_path)?;

        log::info!("Content archive installed");

        Ok(())
    }

    /// Replace the live tree with `staged`, restoring the old tree if the
    /// forward rename fails.
    fn swap_content(&self, staged: &Path) -> Result<()> {
        let live = self.store.content_dir();
        let old = self.store.root().join(OLD_TREE_NAME);

        // Leftover from an interrupted earlier swap
        if old.exists() {
            fs::remove_dir_all(&old)?;
        }

        let had_live_tree = live.exists();
        if had_live_tree {
            fs::rename(&live, &old)?;
        }

        if let Err(e) = fs::rename(staged, &live) {
            if had_live_tree {
                let _ = fs::rename(&old, &live);
            }
            return Err(SyncError::Io(e));
        }

        if had_live_tree {
            if let Err(e) = fs::remove_dir_all(&old) {
                log::warn!("Failed to remove outgoing content tree: {}", e);
            }
        }

        Ok(())
    }

    /// Make `candidate` the canonical archive, unless it already is.
    fn promote(&self, candidate: &Path) -> Result<()> {
        let canonical = self.store.canonical_archive();

        let already_canonical = match (fs::canonicalize(candidate), fs::canonicalize(&canonical)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if already_canonical {
            return Ok(());
        }

        if canonical.exists() {
            fs::remove_file(&canonical)?;
        }

        // Rename when possible, fall back to copy across filesystems
        if fs::rename(candidate, &canonical).is_err() {
            fs::copy(candidate, &canonical)?;
            let _ = fs::remove_file(candidate);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for (path, data) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    fn store_in(temp: &TempDir) -> ContentStore {
        ContentStore::new(temp.path(), "latest.zip")
    }

    #[test]
    fn test_install_first_archive() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let installer = ContentInstaller::new(store.clone());

        let candidate = store.download_path();
        fs::write(&candidate, build_archive(&[("news/launch.html", "v1")])).unwrap();

        installer.install(&candidate).unwrap();

        assert!(store.has_canonical());
        assert!(!candidate.exists());
        assert_eq!(
            fs::read_to_string(store.content_dir().join("news/launch.html")).unwrap(),
            "v1"
        );
    }

    #[test]
    fn test_install_replaces_previous_tree_wholesale() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let installer = ContentInstaller::new(store.clone());

        fs::write(
            store.download_path(),
            build_archive(&[("index.html", "v1"), ("stale.html", "going away")]),
        )
        .unwrap();
        installer.install(&store.download_path()).unwrap();

        fs::write(store.download_path(), build_archive(&[("index.html", "v2")])).unwrap();
        installer.install(&store.download_path()).unwrap();

        assert_eq!(
            fs::read_to_string(store.content_dir().join("index.html")).unwrap(),
            "v2"
        );
        assert!(!store.content_dir().join("stale.html").exists());
    }

    #[test]
    fn test_install_corrupt_candidate_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let installer = ContentInstaller::new(store.clone());

        fs::write(store.download_path(), build_archive(&[("index.html", "v1")])).unwrap();
        installer.install(&store.download_path()).unwrap();

        let canonical_before = fs::read(store.canonical_archive()).unwrap();

        // Chop the tail off a valid archive to lose its directory
        let mut bytes = build_archive(&[("index.html", "v2")]);
        bytes.truncate(bytes.len() - 20);
        fs::write(store.download_path(), &bytes).unwrap();

        let result = installer.install(&store.download_path());

        assert!(matches!(result, Err(SyncError::CorruptArchive(_))));
        assert_eq!(fs::read(store.canonical_archive()).unwrap(), canonical_before);
        assert_eq!(
            fs::read_to_string(store.content_dir().join("index.html")).unwrap(),
            "v1"
        );
    }

    #[test]
    fn test_reinstalling_canonical_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let installer = ContentInstaller::new(store.clone());

        fs::write(
            store.download_path(),
            build_archive(&[("index.html", "v1"), ("pages/a.html", "a")]),
        )
        .unwrap();
        installer.install(&store.download_path()).unwrap();

        installer.install(&store.canonical_archive()).unwrap();

        assert!(store.has_canonical());
        assert_eq!(
            fs::read_to_string(store.content_dir().join("index.html")).unwrap(),
            "v1"
        );
        assert_eq!(
            fs::read_to_string(store.content_dir().join("pages/a.html")).unwrap(),
            "a"
        );
    }

    #[test]
    fn test_install_missing_archive() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let installer = ContentInstaller::new(store);

        let result = installer.install(&temp.path().join("nothing.zip"));

        assert!(matches!(result, Err(SyncError::Io(_))));
    }

    #[test]
    fn test_no_stage_or_old_dirs_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        let installer = ContentInstaller::new(store.clone());

        fs::write(store.download_path(), build_archive(&[("index.html", "v1")])).unwrap();
        installer.install(&store.download_path()).unwrap();
        fs::write(store.download_path(), build_archive(&[("index.html", "v2")])).unwrap();
        installer.install(&store.download_path()).unwrap();

        let leftovers: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".stage-") || name.starts_with(".old-"))
            .collect();

        assert!(leftovers.is_empty(), "leftover dirs: {:?}", leftovers);
    }
}
