use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ezinstall::core::manifest::ManifestClient;
use ezinstall::core::session::InstallSession;
use ezinstall::{commands, error::Result};

const DEFAULT_MANIFEST_URL: &str = "https://pastebin.com/raw/gH3mkWid";
const DEFAULT_ARCHIVE_BASE: &str = "https://cdn.fnbuilds.services";

#[derive(Parser)]
#[clap(name = "ezinstall")]
#[clap(about = "Interactive build installer")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and extract a build
    Install {
        /// Manifest endpoint listing available builds
        #[clap(long, default_value = DEFAULT_MANIFEST_URL)]
        manifest_url: String,
        /// Base URL the build archives are served from
        #[clap(long, default_value = DEFAULT_ARCHIVE_BASE)]
        archive_base: String,
        /// Build index to install, skipping the interactive prompt
        #[clap(long)]
        select: Option<usize>,
        /// Install folder, skipping the interactive prompt
        #[clap(long)]
        dest: Option<PathBuf>,
    },
    /// List the builds available in the manifest
    List {
        /// Manifest endpoint listing available builds
        #[clap(long, default_value = DEFAULT_MANIFEST_URL)]
        manifest_url: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install {
            manifest_url,
            archive_base,
            select,
            dest,
        } => commands::install::run(&manifest_url, &archive_base, select, dest),
        Commands::List { manifest_url } => list_builds(&manifest_url),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn list_builds(manifest_url: &str) -> Result<()> {
    let session = InstallSession::new()?;
    let manifest = ManifestClient::new(session.client()).fetch(manifest_url)?;

    println!("Available manifests:");
    for (i, entry) in manifest.entries().iter().enumerate() {
        println!(" * [{i}] {entry}");
    }
    println!();
    println!("Total: {}", manifest.len());
    Ok(())
}
