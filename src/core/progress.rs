use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Point-in-time measurement of one download. Snapshots are observational
/// only; nothing in the pipeline branches on them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    /// Bytes written to disk so far. Non-decreasing within one download.
    pub bytes_read: u64,
    /// Total size from the Content-Length header, or -1 when the server
    /// did not send one. Fixed for the lifetime of the download.
    pub total_bytes: i64,
    /// Wall-clock time since the transfer started.
    pub elapsed: Duration,
}

impl DownloadProgress {
    /// Fraction complete in [0, 100], or `None` when the total is unknown.
    pub fn percentage(&self) -> Option<f64> {
        if self.total_bytes > 0 {
            Some(self.bytes_read as f64 / self.total_bytes as f64 * 100.0)
        } else {
            None
        }
    }

    /// Rolling average transfer rate in bytes per second since the start,
    /// or `None` when the total is unknown or no time has elapsed.
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if self.total_bytes > 0 && secs > 0.0 {
            Some(self.bytes_read as f64 / secs)
        } else {
            None
        }
    }

    /// Console line for this snapshot. Degrades to a plain byte count when
    /// the total size is unknown.
    pub fn render(&self) -> String {
        match (self.percentage(), self.throughput()) {
            (Some(pct), Some(rate)) => format!(
                "Downloaded: {:.0}% | {:.2}MB of {:.2}MB | Speed: {:.2}MB/s",
                pct,
                self.bytes_read as f64 / BYTES_PER_MB,
                self.total_bytes as f64 / BYTES_PER_MB,
                rate / BYTES_PER_MB
            ),
            (Some(pct), None) => format!(
                "Downloaded: {:.0}% | {:.2}MB of {:.2}MB",
                pct,
                self.bytes_read as f64 / BYTES_PER_MB,
                self.total_bytes as f64 / BYTES_PER_MB
            ),
            _ => format!(
                "Downloaded: {:.2}MB",
                self.bytes_read as f64 / BYTES_PER_MB
            ),
        }
    }
}

/// What an extraction progress denominator counts. Zip archives report
/// entries processed; rar archives report cumulative unpacked bytes,
/// because that is what each container exposes cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionUnit {
    Entries,
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionProgress {
    pub units_done: u64,
    pub units_total: u64,
    pub unit: ExtractionUnit,
}

impl ExtractionProgress {
    /// Percentage complete. An empty archive is complete by definition.
    pub fn percentage(&self) -> f64 {
        if self.units_total == 0 {
            100.0
        } else {
            self.units_done as f64 / self.units_total as f64 * 100.0
        }
    }

    pub fn render(&self) -> String {
        format!("Decompressing... {:.2}%", self.percentage())
    }
}
