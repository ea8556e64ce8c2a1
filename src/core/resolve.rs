use crate::error::{InstallerError, Result};

/// Container format of a build archive, resolved before any body byte is
/// fetched. Zip is the preferred format and always wins when both exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Rar,
}

impl ArchiveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::Rar => ".rar",
        }
    }
}

/// A download URL with its resolved format. Consumed once by the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    pub format: ArchiveFormat,
}

/// Picks the format from the two probe outcomes. Kept separate from the
/// network calls so the preference order is testable on its own.
pub fn select_format(zip_found: bool, rar_found: bool) -> Option<ArchiveFormat> {
    if zip_found {
        Some(ArchiveFormat::Zip)
    } else if rar_found {
        Some(ArchiveFormat::Rar)
    } else {
        None
    }
}

pub struct FormatResolver {
    client: reqwest::blocking::Client,
}

impl FormatResolver {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Determines which archive extension exists upstream for `base_url`
    /// by issuing header-only probes. A `.zip` hit short-circuits the
    /// `.rar` probe. A transport error counts the same as a non-success
    /// status: the probe did not succeed. Neither succeeding is a terminal
    /// failure for the session.
    pub fn resolve(&self, base_url: &str) -> Result<ResolvedTarget> {
        let zip_url = format!("{base_url}.zip");
        let rar_url = format!("{base_url}.rar");

        // A zip hit short-circuits the rar probe.
        let zip_found = self.probe(&zip_url);
        let rar_found = !zip_found && self.probe(&rar_url);

        match select_format(zip_found, rar_found) {
            Some(format @ ArchiveFormat::Zip) => Ok(ResolvedTarget { url: zip_url, format }),
            Some(format @ ArchiveFormat::Rar) => Ok(ResolvedTarget { url: rar_url, format }),
            None => Err(InstallerError::FormatUnavailable {
                base_url: base_url.to_string(),
            }),
        }
    }

    fn probe(&self, url: &str) -> bool {
        self.client
            .head(url)
            .send()
            .map(|response| response.status().is_success())
            .unwrap_or(false)
    }
}
