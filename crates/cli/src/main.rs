use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modsync_core::{
    LocalIndex, PackageManifest, SyncConfig, collect_existing_keys, compute_plan,
    fetch_remote_manifests, find_package, scan_local_state, sync_package,
};
use owo_colors::OwoColorize;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

/// modsync - keep game package installations in line with their server manifest
#[derive(Parser)]
#[command(name = "modsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package server base URL
    #[arg(long, env = "MODSYNC_SERVER", global = true)]
    server: Option<String>,

    /// Override the per-user data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available packages (remote, falling back to the local index)
    List,

    /// Show what a sync would download, delete, and preserve
    Plan {
        /// Package name from the manifest list
        package: String,

        /// Plan as if user-editable files were reset too
        #[arg(short, long)]
        force: bool,
    },

    /// Synchronize a package with the server manifest
    Sync {
        /// Package name from the manifest list
        package: String,

        /// Overwrite user-editable files as well
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let cli = Cli::parse();
    let server = cli
        .server
        .context("no package server configured; pass --server or set MODSYNC_SERVER")?;
    let data_dir = cli.data_dir.unwrap_or_else(SyncConfig::default_data_dir);
    let config = SyncConfig::new(&server, data_dir)?;

    match cli.command {
        Commands::List => cmd_list(&config).await,
        Commands::Plan { package, force } => cmd_plan(&config, &package, force).await,
        Commands::Sync { package, force } => cmd_sync(&config, &package, force).await,
    }
}

async fn cmd_list(config: &SyncConfig) -> Result<()> {
    let client = Client::new();
    let manifests = match fetch_remote_manifests(&client, &config.server_base).await {
        Ok(manifests) => manifests,
        Err(e) if e.is_manifest_unavailable() => {
            eprintln!(
                "{} server unreachable, listing the local index",
                "::".yellow().bold()
            );
            LocalIndex::new(config.index_path()).load()
        }
        Err(e) => return Err(e.into()),
    };

    if manifests.is_empty() {
        println!("{} no packages known", "::".cyan().bold());
        return Ok(());
    }

    for manifest in &manifests {
        println!(
            "  {} {} {}",
            manifest.package_name.bold(),
            manifest.package_version,
            format!("(game {})", manifest.game_version).dimmed()
        );
    }
    Ok(())
}

async fn cmd_plan(config: &SyncConfig, package: &str, force: bool) -> Result<()> {
    let client = Client::new();
    let manifest = resolve_manifest(&client, config, package).await?;

    let package_dir = config.package_dir(&manifest.package_name);
    let assets_dir = config.assets_dir();

    let mut include = manifest.include.clone();
    if force {
        include.extend(manifest.include_no_overwrite.iter().cloned());
    }
    let local = scan_local_state(&package_dir, &assets_dir, &include)?;
    let exempt = if force {
        Default::default()
    } else {
        collect_existing_keys(&package_dir, &manifest.include_no_overwrite)?
    };
    let plan = compute_plan(&local, &manifest.objects, exempt);

    if plan.is_empty() {
        println!("{} up to date", "::".cyan().bold());
        return Ok(());
    }

    for key in &plan.to_download {
        println!("  {} {}", "+".green().bold(), key);
    }
    for key in &plan.to_delete {
        println!("  {} {}", "-".red().bold(), key);
    }
    for key in &plan.no_overwrite_exempt {
        println!("  {} {} {}", "=".dimmed(), key, "(preserved)".dimmed());
    }
    println!(
        "{} would download {}, delete {}, preserve {}",
        "::".cyan().bold(),
        plan.to_download.len(),
        plan.to_delete.len(),
        plan.no_overwrite_exempt.len()
    );
    Ok(())
}

async fn cmd_sync(config: &SyncConfig, package: &str, force: bool) -> Result<()> {
    let client = Client::new();
    let manifest = resolve_manifest(&client, config, package).await?;

    println!(
        "{} syncing {} {}",
        "::".cyan().bold(),
        manifest.package_name.bold(),
        manifest.package_version
    );

    let summary = sync_package(&client, config, &manifest, force).await?;

    println!(
        "{} downloaded {}, deleted {}, preserved {}",
        "::".green().bold(),
        summary.downloaded,
        summary.deleted,
        summary.preserved
    );
    Ok(())
}

/// Resolve the manifest for a package: remote first, local index when the
/// remote list cannot be obtained. A sync that fails partway never falls
/// back; only manifest acquisition does.
async fn resolve_manifest(
    client: &Client,
    config: &SyncConfig,
    package: &str,
) -> Result<PackageManifest> {
    let remote = fetch_remote_manifests(client, &config.server_base)
        .await
        .and_then(|manifests| find_package(manifests, package));

    match remote {
        Ok(manifest) => Ok(manifest),
        Err(e) if e.is_manifest_unavailable() => {
            eprintln!(
                "{} remote manifest unavailable ({e}), trying the local index",
                "::".yellow().bold()
            );
            LocalIndex::new(config.index_path())
                .get(package)
                .with_context(|| format!("package '{package}' is not in the local index either"))
        }
        Err(e) => Err(e.into()),
    }
}
