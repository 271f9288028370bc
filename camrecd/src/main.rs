use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use ffmpeg_capture::{ffmpeg_available, ffmpeg_version, CaptureConfig, CaptureSession};
use recorder_config::{check_save_dir, default_config_path, fast_mode, format_bytes, RecordsConfig};

/// Camrec daemon - continuous RTSP camera recorder
///
/// - Records each configured camera into hour-long segments
/// - Keeps every camera directory under its storage budget by deleting
///   the oldest segments
/// - Runs until terminated; a dropped camera feed is retried forever
#[derive(Parser)]
#[command(name = "camrecd")]
#[command(about = "Continuous RTSP recorder with bounded storage")]
struct Cli {
    /// Record a single camera from this RTSP URL (requires --save-dir)
    #[arg(short, long, requires = "save_dir")]
    url: Option<String>,

    /// Save directory for --url mode
    #[arg(short, long)]
    save_dir: Option<PathBuf>,

    /// Config file path (default: ~/.config/camrec/recorder.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Resolve config and check preconditions before starting anything
    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = check_save_dir(&config.save_dir) {
        eprintln!("[ERROR] {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[ERROR] Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERROR] {e}");
            ExitCode::FAILURE
        }
    }
}

/// Build the deployment config from CLI flags or the config file
fn resolve_config(cli: &Cli) -> Result<RecordsConfig> {
    if let (Some(url), Some(save_dir)) = (&cli.url, &cli.save_dir) {
        return Ok(RecordsConfig::new(url.clone(), save_dir.clone()));
    }

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    Ok(RecordsConfig::load(&path)?)
}

async fn run(config: RecordsConfig) -> Result<()> {
    let fast = fast_mode();
    let budget = config.storage_bytes();

    println!("==========================================");
    println!("CAMREC RECORDER");
    println!("==========================================");
    println!("Cameras:        {}", config.sources.len());
    println!("Save directory: {}", config.save_dir.display());
    println!("Storage budget: {} per camera", format_bytes(budget));
    println!(
        "Segment length: {}",
        if fast { "1 minute (fast mode)" } else { "1 hour" }
    );
    println!();

    if !ffmpeg_available() {
        anyhow::bail!("ffmpeg not found - is it installed?");
    }
    if let Some(version) = ffmpeg_version() {
        tracing::info!(%version, "ffmpeg found");
    }

    // One cancellation token for the whole process; ctrl-c cancels every
    // session and its retention task
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            println!("Shutting down...");
            ctrl_c_cancel.cancel();
        }
    });

    let mut sessions = JoinSet::new();
    for source in &config.sources {
        let mut capture = CaptureConfig::new(source.clone(), config.save_dir.clone())
            .with_max_storage_bytes(budget)
            .with_fast_rotation(fast);
        capture.transport = config.transport.clone();
        capture.connect_timeout_secs = config.connect_timeout_secs;
        capture.poll_interval_secs = config.poll_interval_secs;
        capture.retry_delay_secs = config.retry_delay_secs;

        let session = CaptureSession::new(capture, cancel.child_token());
        println!(
            "Starting camera {} -> {}",
            session.identity(),
            session.output_dir().display()
        );
        sessions.spawn(session.run());
    }

    // Sessions run forever; failures are isolated per camera, so one
    // camera dying never stops the others
    while let Some(result) = sessions.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "capture session terminated"),
            Err(e) => tracing::error!(error = %e, "capture session panicked"),
        }
    }

    Ok(())
}
