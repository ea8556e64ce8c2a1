use crate::core::cancel::CancelToken;
use crate::core::download::StreamingDownloader;
use crate::core::extract::ArchiveExtractor;
use crate::core::resolve::FormatResolver;
use crate::error::Result;
use crate::utils::fs::ensure_dir_exists;
use std::io::Write;
use std::path::{Path, PathBuf};

const USER_AGENT: &str = concat!("ezinstall/", env!("CARGO_PKG_VERSION"));

/// One install session: probe, download, extract, strictly in sequence.
/// Every stage error is fatal; nothing is retried or rolled back.
pub struct InstallSession {
    client: reqwest::blocking::Client,
    cancel: CancelToken,
}

impl InstallSession {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::InstallerError::Io(std::io::Error::other(e.to_string())))?;
        Ok(Self {
            client,
            cancel: CancelToken::new(),
        })
    }

    pub fn client(&self) -> reqwest::blocking::Client {
        self.client.clone()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Installs `version` from `<archive_base>/<version>` into `destination`.
    /// Returns the path the archive was written to.
    pub fn install(
        &self,
        archive_base: &str,
        version: &str,
        destination: &Path,
    ) -> Result<PathBuf> {
        ensure_dir_exists(destination)?;

        let base_url = format!("{}/{}", archive_base.trim_end_matches('/'), version);
        let resolver = FormatResolver::new(self.client.clone());
        let target = resolver.resolve(&base_url)?;
        println!("Found {} archive for version {version}", target.format.extension());

        let archive_path = destination.join(format!("{version}{}", target.format.extension()));
        let downloader = StreamingDownloader::new(self.client.clone());
        downloader.download(&target.url, &archive_path, &self.cancel, |progress| {
            print!("\r{}", progress.render());
            let _ = std::io::stdout().flush();
        })?;
        println!();

        let extractor = ArchiveExtractor::new();
        extractor.extract(
            &archive_path,
            target.format,
            destination,
            &self.cancel,
            |progress| {
                print!("\r{}", progress.render());
                let _ = std::io::stdout().flush();
            },
        )?;
        println!();

        Ok(archive_path)
    }
}
