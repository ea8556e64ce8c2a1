use crate::core::cancel::CancelToken;
use crate::core::progress::DownloadProgress;
use crate::error::{InstallerError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;

/// Matches the read granularity of the transfer loop: small enough for
/// responsive progress, large enough to keep syscall overhead down.
const CHUNK_SIZE: usize = 8 * 1024;

pub struct StreamingDownloader {
    client: reqwest::blocking::Client,
}

impl StreamingDownloader {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Streams `url` to `destination`, invoking `on_progress` after every
    /// chunk written. The destination is truncated if it exists. Memory use
    /// is bounded by the chunk buffer, not the file size. On failure a
    /// partially written file is left on disk.
    pub fn download<F>(
        &self,
        url: &str,
        destination: &Path,
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> Result<()>
    where
        F: FnMut(&DownloadProgress),
    {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| InstallerError::download_failed(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(InstallerError::download_failed(
                url,
                format!("server returned {}", response.status()),
            ));
        }

        // Content-Length is read off the headers before any body byte;
        // absent means the total stays unknown for the whole transfer.
        let total_bytes = response
            .content_length()
            .map(|n| n as i64)
            .unwrap_or(-1);

        let mut file = File::create(destination)?;
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut bytes_read: u64 = 0;
        let started = Instant::now();

        loop {
            if cancel.is_cancelled() {
                return Err(InstallerError::Cancelled);
            }

            let n = response
                .read(&mut buffer)
                .map_err(|e| InstallerError::download_failed(url, e.to_string()))?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n])?;
            bytes_read += n as u64;

            on_progress(&DownloadProgress {
                bytes_read,
                total_bytes,
                elapsed: started.elapsed(),
            });
        }

        // An empty body produces no chunks; still report once so the
        // caller sees a terminal snapshot.
        if bytes_read == 0 {
            on_progress(&DownloadProgress {
                bytes_read,
                total_bytes,
                elapsed: started.elapsed(),
            });
        }

        file.flush()?;
        Ok(())
    }
}
