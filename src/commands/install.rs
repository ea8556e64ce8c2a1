use crate::core::manifest::{BuildManifest, ManifestClient};
use crate::core::session::InstallSession;
use crate::error::{InstallerError, Result};
use dialoguer::Input;
use std::path::PathBuf;

/// Runs one install: fetch the manifest once, pick a build, pick a
/// destination, then hand off to the session. `select` and `dest` skip the
/// interactive prompts when provided; interactively, invalid input
/// re-prompts against the cached manifest instead of refetching it.
pub fn run(
    manifest_url: &str,
    archive_base: &str,
    select: Option<usize>,
    dest: Option<PathBuf>,
) -> Result<()> {
    let session = InstallSession::new()?;

    println!("Fetching available builds...");
    let manifest = ManifestClient::new(session.client()).fetch(manifest_url)?;

    println!();
    println!("Available manifests:");
    for (i, entry) in manifest.entries().iter().enumerate() {
        println!(" * [{i}] {entry}");
    }
    println!();
    println!("Total: {}", manifest.len());

    let index = match select {
        Some(index) => {
            if manifest.get(index).is_none() {
                return Err(InstallerError::InvalidSelection {
                    input: index.to_string(),
                });
            }
            index
        }
        None => prompt_for_index(&manifest)?,
    };

    // Identifiers are `<label>-<version>`; an entry without the separator
    // is used whole.
    let version = manifest
        .version_at(index)
        .or_else(|| manifest.get(index))
        .ok_or_else(|| InstallerError::InvalidSelection {
            input: index.to_string(),
        })?
        .to_string();

    let destination = match dest {
        Some(path) => path,
        None => prompt_for_destination()?,
    };

    println!();
    session.install(archive_base, &version, &destination)?;

    println!();
    println!("Finished downloading.");
    println!("Installed build {version} to {}", destination.display());
    Ok(())
}

fn prompt_for_index(manifest: &BuildManifest) -> Result<usize> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Please enter the number before the build version to select it")
            .interact_text()
            .map_err(prompt_error)?;

        match raw.trim().parse::<usize>() {
            Ok(index) if manifest.get(index).is_some() => return Ok(index),
            Ok(index) => println!("No build at index {index}, try again."),
            Err(_) => println!("Not a number, try again."),
        }
    }
}

fn prompt_for_destination() -> Result<PathBuf> {
    loop {
        let raw: String = Input::new()
            .with_prompt("Please enter an install folder location")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            println!("Install folder cannot be empty, try again.");
            continue;
        }
        return Ok(PathBuf::from(trimmed));
    }
}

fn prompt_error(e: dialoguer::Error) -> InstallerError {
    InstallerError::Io(std::io::Error::other(e.to_string()))
}
