//! Archive extraction onto a destination directory tree.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::{Result, SyncError};

/// Streams archive entries onto a destination tree.
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Extract every entry of the archive under `dest_dir`.
    ///
    /// Entries are processed in archive order. Directory markers become
    /// directories; file entries get their ancestor directories created on
    /// demand, since archives are not guaranteed to list a directory before
    /// the files inside it. A malformed or truncated entry aborts the pass
    /// with [`SyncError::CorruptArchive`]; files already written in that
    /// pass are left for the caller to discard along with the destination.
    pub fn extract<R: Read + Seek>(reader: R, dest_dir: &Path) -> Result<()> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| SyncError::CorruptArchive(format!("failed to open archive: {}", e)))?;

        std::fs::create_dir_all(dest_dir)?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| SyncError::CorruptArchive(format!("failed to read entry {}: {}", i, e)))?;

            let name = entry.name().to_string();

            if name.is_empty() {
                continue;
            }

            // Reject paths that could escape the destination
            if name.starts_with('/') || name.split('/').any(|c| c == "..") {
                return Err(SyncError::CorruptArchive(format!(
                    "entry path escapes destination: {}",
                    name
                )));
            }

            let outpath = dest_dir.join(&name);

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath)?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| match e.kind() {
                // A short or undecodable read here means the archive ended
                // mid-entry; anything else is a real filesystem failure
                std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                    SyncError::CorruptArchive(format!("archive truncated in entry {}", name))
                }
                _ => SyncError::Io(e),
            })?;
        }

        Ok(())
    }
}
