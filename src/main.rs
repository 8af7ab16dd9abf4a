use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};

use reel_composer::{
    composition::EditEngine,
    config::Config,
    effects::{Filter, Transition},
    media::{ExportFormat, FfmpegBackend, MediaBackend},
    session::{Session, Upload, Workspace},
};

#[derive(Parser)]
#[command(
    name = "reel-composer",
    version,
    about = "Merge video clips into one video with filters, transitions and music",
    long_about = "Reel-Composer resizes and filters each clip, joins them with the chosen transition, loops or trims an optional soundtrack to fit, and renders a single file with FFmpeg."
)]
struct Cli {
    /// Video clips to join, in order (MP4)
    videos: Vec<PathBuf>,

    /// Soundtrack to lay over the result (MP3)
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Output width in pixels (320-3840)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (240-2160)
    #[arg(long)]
    height: Option<u32>,

    /// Visual filter (none, grayscale, sepia, color-boost, invert, brightness-boost)
    #[arg(short, long)]
    filter: Option<String>,

    /// Transition between clips (none, fade, slide)
    #[arg(short, long)]
    transition: Option<String>,

    /// Export container (mp4, avi, mov)
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Where to write the rendered file (defaults to the generated name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Reel-Composer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    apply_overrides(&cli, &mut config);
    config.validate().map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        info!("Configuration written to {:?}", path);
        return Ok(());
    }

    let backend = Arc::new(FfmpegBackend::new(
        config.encode.ffmpeg_path.clone(),
        config.encode.ffprobe_path.clone(),
    ));
    if !backend.is_available() {
        bail!("FFmpeg not found. Please install FFmpeg (ffmpeg and ffprobe) and make sure it is on your PATH.");
    }
    info!("Using {} backend", backend.name());

    let workspace = match &config.encode.scratch_dir {
        Some(dir) => Workspace::new_in(dir)?,
        None => Workspace::new()?,
    };
    let mut session = Session::with_workspace(config.output.clone(), workspace);

    for path in &cli.videos {
        let upload = Upload::from_path(path)
            .await
            .with_context(|| format!("Could not read video {:?}", path))?;
        session
            .add_video(upload)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }
    if let Some(path) = &cli.audio {
        let upload = Upload::from_path(path)
            .await
            .with_context(|| format!("Could not read audio {:?}", path))?;
        session
            .set_audio(upload)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    let engine = EditEngine::new(config.encode.clone(), backend);

    info!("Starting processing...");
    if let Err(e) = session.process(&engine).await {
        bail!(e.user_message());
    }

    let download = session
        .download()
        .await?
        .context("Processing finished without an output file")?;
    let destination = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&download.file_name));
    tokio::fs::write(&destination, &download.bytes)
        .await
        .with_context(|| format!("Could not write {:?}", destination))?;

    info!(
        "Done! {} ({}, {:.1} MB) saved to: {:?}",
        download.file_name,
        download.mime_type,
        download.bytes.len() as f64 / 1024.0 / 1024.0,
        destination
    );
    Ok(())
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(cli: &Cli, config: &mut Config) {
    let output = &mut config.output;

    if let Some(width) = cli.width {
        output.width = width;
    }
    if let Some(height) = cli.height {
        output.height = height;
    }
    if let Some(name) = &cli.filter {
        output.filter = Filter::from_name(name);
    }
    if let Some(name) = &cli.transition {
        output.transition = Transition::from_name(name);
    }
    if let Some(format) = cli.format {
        output.format = format;
    }

    if cli.videos.is_empty() && cli.save_config.is_none() {
        warn!("No videos given on the command line");
    }
}
