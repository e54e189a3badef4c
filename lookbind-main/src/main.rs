//! Generates materials for every scene document of an asset library and binds them to the
//! geometry, using the textures found next to the assets (or in a library-specific folder).
//!
//! Usage:
//!   lookbind --asset-lib-path <DIR> [--lib-name Kitbash|Megascans | --textures-folder-path <DIR>]
use anyhow::{Context, Result};
use clap::Parser;
use lookbind::{
    bind::{assign_materials, AmbiguityPolicy, AssignReport},
    config::{BindConfig, LibraryProfile},
    library::{collect_assets, TextureSource},
    model::DocumentFile,
};
use serde::Serialize;
use std::{fs, path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lookbind")]
#[command(about = "Resolve textures and bind materials to the assets of a library")]
struct Cli {
    /// Root folder of the asset library
    #[arg(long, value_name = "DIR")]
    asset_lib_path: PathBuf,
    /// Library layout: Kitbash or Megascans (cannot be combined with --textures-folder-path)
    #[arg(long, value_name = "NAME")]
    lib_name: Option<String>,
    /// Folder holding the textures of every asset (default: the folder of each asset)
    #[arg(long, value_name = "DIR")]
    textures_folder_path: Option<PathBuf>,
    /// JSON binding configuration, overrides the library defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Fail when several textures match the same slot
    #[arg(long)]
    strict: bool,
    /// Also generate a preview surface network
    #[arg(long)]
    preview: bool,
    /// Write a JSON report of the run
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Log matching details
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Serialize)]
struct DocumentReport {
    document: PathBuf,
    textures: PathBuf,
    #[serde(flatten)]
    report: AssignReport,
}

/// Processes every asset. Returns whether every material found textures and every piece of
/// geometry got a material.
fn run(cli: &Cli) -> Result<bool> {
    let profile = cli
        .lib_name
        .as_deref()
        .map(str::parse::<LibraryProfile>)
        .transpose()?;
    let source = TextureSource::from_options(profile, cli.textures_folder_path.clone())?;

    let mut config = match (&cli.config, profile) {
        (Some(path), _) => BindConfig::load(path)?,
        (None, Some(profile)) => profile.default_config(),
        (None, None) => BindConfig::default(),
    };
    if cli.strict {
        config.resolver.ambiguity = AmbiguityPolicy::Strict;
    }
    if cli.preview {
        config.graph.preview_surface = true;
    }

    let assets = collect_assets(&cli.asset_lib_path, &source, &config.document_extension)?;
    if assets.is_empty() {
        warn!(
            "no `.{}` document found under `{}`",
            config.document_extension,
            cli.asset_lib_path.display()
        );
    }

    let mut reports = Vec::new();
    let mut unmatched = 0;
    for asset in assets {
        info!("processing `{}`", asset.document.display());
        let mut stage = DocumentFile::open_path(&asset.document)
            .map_err(lookbind::Error::from)
            .with_context(|| format!("asset `{}`", asset.document.display()))?;
        let report = assign_materials(&mut stage, &asset.textures, &config)
            .with_context(|| format!("asset `{}`", asset.document.display()))?;
        for material in report.unmatched() {
            warn!(
                "no texture matched material `{}` of `{}` in `{}`",
                material.material,
                asset.document.display(),
                asset.textures.display()
            );
            unmatched += 1;
        }
        unmatched += report.unbound.len();
        reports.push(DocumentReport {
            document: asset.document,
            textures: asset.textures,
            report,
        });
    }

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(path, json).with_context(|| format!("could not write report `{}`", path.display()))?;
    }

    info!("{} documents processed, {} unmatched or unbound", reports.len(), unmatched);
    Ok(unmatched == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let kind = err
                .downcast_ref::<lookbind::Error>()
                .map_or("error", |err| err.kind());
            error!("{}: {:#}", kind, err);
            ExitCode::FAILURE
        }
    }
}
