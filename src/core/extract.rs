use crate::core::cancel::CancelToken;
use crate::core::progress::{ExtractionProgress, ExtractionUnit};
use crate::core::resolve::ArchiveFormat;
use crate::error::{InstallerError, Result};
use std::fs::File;
use std::path::Path;
use unrar::Archive;
use zip::ZipArchive;

/// Listing-pass totals for a rar archive. Extraction is skipped only when
/// there are no file entries at all; zero-byte files still get written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RarSummary {
    files: u64,
    unpacked_bytes: u64,
}

impl RarSummary {
    fn add_file(&mut self, unpacked_size: u64) {
        self.files += 1;
        self.unpacked_bytes += unpacked_size;
    }

    fn has_files(&self) -> bool {
        self.files > 0
    }
}

pub struct ArchiveExtractor;

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self
    }
}

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Unpacks `archive_path` into `destination`, dispatching on the
    /// resolved format. `on_progress` fires once per processed entry.
    /// Existing files are overwritten unconditionally; parent directories
    /// are created as entries need them.
    pub fn extract<F>(
        &self,
        archive_path: &Path,
        format: ArchiveFormat,
        destination: &Path,
        cancel: &CancelToken,
        on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(&ExtractionProgress),
    {
        std::fs::create_dir_all(destination)
            .map_err(|e| InstallerError::extraction_failed(archive_path, e.to_string()))?;

        match format {
            ArchiveFormat::Zip => {
                self.extract_zip(archive_path, destination, cancel, on_progress)
            }
            ArchiveFormat::Rar => {
                self.extract_rar(archive_path, destination, cancel, on_progress)
            }
        }
    }

    /// Zip progress counts entries: directory markers and files alike, so
    /// the denominator is the entry count and the final snapshot is 100%.
    fn extract_zip<F>(
        &self,
        archive_path: &Path,
        destination: &Path,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(&ExtractionProgress),
    {
        let file = File::open(archive_path)
            .map_err(|e| InstallerError::extraction_failed(archive_path, e.to_string()))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| InstallerError::extraction_failed(archive_path, e.to_string()))?;

        let total_entries = archive.len() as u64;
        let fail = |e: &dyn std::fmt::Display| {
            InstallerError::extraction_failed(archive_path, e.to_string())
        };

        if total_entries == 0 {
            on_progress(&ExtractionProgress {
                units_done: 0,
                units_total: 0,
                unit: ExtractionUnit::Entries,
            });
            return Ok(());
        }

        for i in 0..archive.len() {
            if cancel.is_cancelled() {
                return Err(InstallerError::Cancelled);
            }

            let mut entry = archive.by_index(i).map_err(|e| fail(&e))?;
            let outpath = match entry.enclosed_name() {
                Some(path) => destination.join(path),
                // Entries escaping the destination are not written but
                // still count toward progress.
                None => {
                    on_progress(&ExtractionProgress {
                        units_done: i as u64 + 1,
                        units_total: total_entries,
                        unit: ExtractionUnit::Entries,
                    });
                    continue;
                }
            };

            if entry.name().ends_with('/') {
                std::fs::create_dir_all(&outpath).map_err(|e| fail(&e))?;
            } else {
                if let Some(parent) = outpath.parent() {
                    if !parent.exists() {
                        std::fs::create_dir_all(parent).map_err(|e| fail(&e))?;
                    }
                }
                let mut outfile = File::create(&outpath).map_err(|e| fail(&e))?;
                std::io::copy(&mut entry, &mut outfile).map_err(|e| fail(&e))?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                        .map_err(|e| fail(&e))?;
                }
            }

            on_progress(&ExtractionProgress {
                units_done: i as u64 + 1,
                units_total: total_entries,
                unit: ExtractionUnit::Entries,
            });
        }

        Ok(())
    }

    /// Rar progress counts cumulative unpacked bytes against the archive
    /// total, gathered by a listing pass up front since the rar reader is
    /// forward-only.
    fn extract_rar<F>(
        &self,
        archive_path: &Path,
        destination: &Path,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(&ExtractionProgress),
    {
        let fail = |e: &dyn std::fmt::Display| {
            InstallerError::extraction_failed(archive_path, e.to_string())
        };

        let mut summary = RarSummary::default();
        let listing = Archive::new(archive_path)
            .open_for_listing()
            .map_err(|e| fail(&e))?;
        for entry in listing {
            let header = entry.map_err(|e| fail(&e))?;
            if header.is_file() {
                summary.add_file(header.unpacked_size as u64);
            }
        }
        let total_unpacked = summary.unpacked_bytes;

        if !summary.has_files() {
            on_progress(&ExtractionProgress {
                units_done: 0,
                units_total: 0,
                unit: ExtractionUnit::Bytes,
            });
            return Ok(());
        }

        let mut archive = Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| fail(&e))?;
        let mut unpacked: u64 = 0;

        while let Some(header) = archive.read_header().map_err(|e| fail(&e))? {
            if cancel.is_cancelled() {
                return Err(InstallerError::Cancelled);
            }

            let entry_size = header.entry().unpacked_size as u64;
            let is_file = header.entry().is_file();

            archive = if is_file {
                header.extract_with_base(destination).map_err(|e| fail(&e))?
            } else {
                header.skip().map_err(|e| fail(&e))?
            };

            if is_file {
                unpacked += entry_size;
                on_progress(&ExtractionProgress {
                    units_done: unpacked,
                    units_total: total_unpacked,
                    unit: ExtractionUnit::Bytes,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, Option<&str>)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, contents) in entries {
            match contents {
                Some(data) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(data.as_bytes()).unwrap();
                }
                None => {
                    writer.add_directory(name.trim_end_matches('/'), options).unwrap();
                }
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_zip_extracts_files_and_directory_markers() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("build.zip");
        write_zip(
            &archive_path,
            &[
                ("docs/", None),
                ("docs/readme.txt", Some("hello")),
                ("bin/app", Some("binary")),
            ],
        );

        let dest = dir.path().join("out");
        let mut snapshots = Vec::new();
        ArchiveExtractor::new()
            .extract(
                &archive_path,
                ArchiveFormat::Zip,
                &dest,
                &CancelToken::new(),
                |p| snapshots.push(*p),
            )
            .unwrap();

        assert!(dest.join("docs").is_dir());
        assert_eq!(
            std::fs::read_to_string(dest.join("docs/readme.txt")).unwrap(),
            "hello"
        );
        assert_eq!(std::fs::read_to_string(dest.join("bin/app")).unwrap(), "binary");

        // One snapshot per entry, counting markers, ending at 100%.
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots.last().unwrap().percentage(), 100.0);
        assert!(snapshots.iter().all(|s| s.unit == ExtractionUnit::Entries));
    }

    #[test]
    fn test_zip_creates_nested_parents_without_markers() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("deep.zip");
        write_zip(&archive_path, &[("a/b/c/d.txt", Some("deep"))]);

        let dest = dir.path().join("out");
        ArchiveExtractor::new()
            .extract(
                &archive_path,
                ArchiveFormat::Zip,
                &dest,
                &CancelToken::new(),
                |_| {},
            )
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("a/b/c/d.txt")).unwrap(),
            "deep"
        );
    }

    #[test]
    fn test_zip_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("build.zip");
        write_zip(&archive_path, &[("config.ini", Some("new"))]);

        let dest = dir.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("config.ini"), "old").unwrap();

        ArchiveExtractor::new()
            .extract(
                &archive_path,
                ArchiveFormat::Zip,
                &dest,
                &CancelToken::new(),
                |_| {},
            )
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("config.ini")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_zip_zero_entries_reports_complete() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("empty.zip");
        write_zip(&archive_path, &[]);

        let dest = dir.path().join("out");
        let mut snapshots = Vec::new();
        ArchiveExtractor::new()
            .extract(
                &archive_path,
                ArchiveFormat::Zip,
                &dest,
                &CancelToken::new(),
                |p| snapshots.push(*p),
            )
            .unwrap();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].percentage(), 100.0);
    }

    #[test]
    fn test_zip_progress_is_monotonic() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("many.zip");
        let entries: Vec<(String, String)> = (0..10)
            .map(|i| (format!("file{i}.txt"), format!("contents {i}")))
            .collect();
        let borrowed: Vec<(&str, Option<&str>)> = entries
            .iter()
            .map(|(n, c)| (n.as_str(), Some(c.as_str())))
            .collect();
        write_zip(&archive_path, &borrowed);

        let dest = dir.path().join("out");
        let mut last = 0.0;
        ArchiveExtractor::new()
            .extract(
                &archive_path,
                ArchiveFormat::Zip,
                &dest,
                &CancelToken::new(),
                |p| {
                    assert!(p.percentage() >= last);
                    last = p.percentage();
                },
            )
            .unwrap();
        assert_eq!(last, 100.0);
    }

    #[test]
    fn test_zip_cancellation_stops_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("build.zip");
        write_zip(
            &archive_path,
            &[("a.txt", Some("a")), ("b.txt", Some("b"))],
        );

        let dest = dir.path().join("out");
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = ArchiveExtractor::new()
            .extract(&archive_path, ArchiveFormat::Zip, &dest, &cancel, |_| {})
            .unwrap_err();
        assert!(matches!(err, InstallerError::Cancelled));
    }

    #[test]
    fn test_unreadable_archive_is_extraction_failed() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("corrupt.zip");
        std::fs::write(&archive_path, b"this is not a zip").unwrap();

        let err = ArchiveExtractor::new()
            .extract(
                &archive_path,
                ArchiveFormat::Zip,
                &dir.path().join("out"),
                &CancelToken::new(),
                |_| {},
            )
            .unwrap_err();
        assert!(matches!(err, InstallerError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_rar_summary_zero_byte_files_still_count() {
        let mut summary = RarSummary::default();
        summary.add_file(0);
        summary.add_file(0);
        assert!(summary.has_files());
        assert_eq!(summary.unpacked_bytes, 0);
    }

    #[test]
    fn test_rar_summary_no_entries_has_no_files() {
        let summary = RarSummary::default();
        assert!(!summary.has_files());
    }

    #[test]
    fn test_rar_summary_accumulates_bytes() {
        let mut summary = RarSummary::default();
        summary.add_file(100);
        summary.add_file(0);
        summary.add_file(28);
        assert_eq!(summary.files, 3);
        assert_eq!(summary.unpacked_bytes, 128);
    }

    #[test]
    fn test_missing_rar_is_extraction_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveExtractor::new()
            .extract(
                &dir.path().join("absent.rar"),
                ArchiveFormat::Rar,
                &dir.path().join("out"),
                &CancelToken::new(),
                |_| {},
            )
            .unwrap_err();
        assert!(matches!(err, InstallerError::ExtractionFailed { .. }));
    }
}
