use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod settings;

use cli::Cli;
use commands::AppState;
use settings::Settings;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("com", "mathocr", "MathOCR")
        .context("Failed to get app directory")?;
    Ok(project_dirs.data_dir().to_path_buf())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let settings = Settings::load(&data_dir)?;
    let book = mathocr_storage::ProblemBook::open(settings.storage.clone())
        .await
        .context("Failed to open problem storage")?;
    tracing::debug!(
        data_dir = %data_dir.display(),
        backend = %settings.storage.backend,
        source = %settings.image_source,
        "settings loaded"
    );

    let mut state = AppState {
        data_dir,
        settings,
        book,
    };
    commands::run(cli.command, &mut state).await
}
