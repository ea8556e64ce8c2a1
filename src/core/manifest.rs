use crate::error::{InstallerError, Result};

/// Ordered list of installable build identifiers, fetched once per run.
/// The display order is the selection order; indices stay stable for the
/// lifetime of the process.
#[derive(Debug, Clone)]
pub struct BuildManifest {
    entries: Vec<String>,
}

impl BuildManifest {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Canonical build version for the entry at `index`: identifiers are
    /// formatted `<label>-<version>`, and everything after the first `-`
    /// is what the download stages use.
    pub fn version_at(&self, index: usize) -> Option<&str> {
        self.get(index)
            .and_then(|entry| entry.split_once('-').map(|(_, version)| version))
    }
}

pub struct ManifestClient {
    client: reqwest::blocking::Client,
}

impl ManifestClient {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    /// Fetches and decodes the manifest. Fatal on any failure: the caller
    /// is expected to abort the session rather than retry.
    pub fn fetch(&self, endpoint_url: &str) -> Result<BuildManifest> {
        let response = self
            .client
            .get(endpoint_url)
            .send()
            .map_err(|e| InstallerError::manifest_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(InstallerError::manifest_unavailable(format!(
                "server returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| InstallerError::manifest_unavailable(e.to_string()))?;

        parse_manifest(&body)
    }
}

/// Decodes a manifest body: a JSON array of build-identifier strings.
pub fn parse_manifest(body: &str) -> Result<BuildManifest> {
    if body.trim().is_empty() {
        return Err(InstallerError::manifest_unavailable("empty response body"));
    }

    let entries: Vec<String> = serde_json::from_str(body)
        .map_err(|e| InstallerError::manifest_malformed(e.to_string()))?;

    Ok(BuildManifest::new(entries))
}
