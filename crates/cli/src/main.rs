mod render;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use moodsnap_core::capture::domain::frame_capturer::FrameCapturer;
use moodsnap_core::capture::infrastructure::ffmpeg_camera_capturer::FfmpegCameraCapturer;
use moodsnap_core::capture::infrastructure::image_file_capturer::ImageFileCapturer;
use moodsnap_core::expression::domain::expression_scorer::ExpressionScorer;
use moodsnap_core::expression::infrastructure::onnx_expression_scorer::OnnxExpressionScorer;
use moodsnap_core::readiness::domain::model_loader::{ModelArtifact, ModelLoadError};
use moodsnap_core::readiness::domain::readiness_gate::ReadinessGate;
use moodsnap_core::readiness::infrastructure::onnx_model_loader::{ModelSource, OnnxModelLoader};
use moodsnap_core::session::capture_session::CaptureSession;
use moodsnap_core::session::session_state::SessionView;
use moodsnap_core::shared::config::AppConfig;
use moodsnap_core::shared::constants::IMAGE_EXTENSIONS;

use render::render;

/// Snap a photo and show the dominant facial expression as an emoji.
#[derive(Parser)]
#[command(name = "moodsnap")]
struct Cli {
    /// Use an image file as the camera instead of a capture device.
    #[arg(long, conflicts_with = "device")]
    image: Option<PathBuf>,

    /// Camera device (e.g. /dev/video0, 0, "video=Integrated Camera").
    #[arg(long)]
    device: Option<String>,

    /// Base URL or local directory holding the model files. Defaults to
    /// cached or bundled models.
    #[arg(long)]
    model_source: Option<String>,

    /// Face detector input resolution (must match the model, 128).
    #[arg(long)]
    input_size: Option<u32>,

    /// Minimum face confidence (0.0-1.0).
    #[arg(long)]
    score_threshold: Option<f32>,

    /// Read commands from stdin: c(apture), r(eset), q(uit).
    #[arg(long)]
    interactive: bool,

    /// Persist the effective settings as the user config before running.
    #[arg(long)]
    save_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Capture,
    Reset,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "c" | "capture" => Some(Command::Capture),
            "r" | "reset" => Some(Command::Reset),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = apply_overrides(&cli, AppConfig::load());
    validate(&cli, &config)?;
    if cli.save_config {
        config.save()?;
        if let Some(path) = AppConfig::config_path() {
            log::info!("Saved settings to {}", path.display());
        }
    }

    let capturer = open_capturer(&cli, &config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut session = CaptureSession::new(capturer, config.detector);
    let outcome = runtime.block_on(open_gate(&config.model_source));
    eprintln!();
    session.settle_readiness(outcome);

    if let SessionView::InitFailed(err) = session.view() {
        return Err(match err.detail() {
            Some(detail) => format!("{err}\n  {detail}"),
            None => err.to_string(),
        }
        .into());
    }

    if cli.interactive {
        run_interactive(&runtime, &mut session)
    } else {
        run_once(&runtime, &mut session)
    }
}

fn run_once(
    runtime: &tokio::runtime::Runtime,
    session: &mut CaptureSession,
) -> Result<(), Box<dyn std::error::Error>> {
    runtime.block_on(session.capture());
    match session.view() {
        SessionView::Failed(err) => Err(err.to_string().into()),
        view => {
            println!("{}", render(&view));
            Ok(())
        }
    }
}

fn run_interactive(
    runtime: &tokio::runtime::Runtime,
    session: &mut CaptureSession,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render(&session.view()));
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Some(Command::Capture) => {
                runtime.block_on(session.capture());
            }
            Some(Command::Reset) => session.reset(),
            Some(Command::Quit) => break,
            None => {
                eprintln!("Unknown command '{}'. Use c, r or q.", line.trim());
                continue;
            }
        }
        println!("{}", render(&session.view()));
    }
    Ok(())
}

async fn open_gate(model_source: &str) -> Result<Box<dyn ExpressionScorer>, ModelLoadError> {
    let loader = OnnxModelLoader::new(ModelSource::parse(model_source))
        .with_progress(Arc::new(download_progress));
    let models = ReadinessGate::new(loader).open().await?;
    Ok(Box::new(OnnxExpressionScorer::from_models(models)))
}

fn open_capturer(
    cli: &Cli,
    config: &AppConfig,
) -> Result<Box<dyn FrameCapturer>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.image {
        log::info!("Using {} as the camera", path.display());
        return Ok(Box::new(ImageFileCapturer::new(path)));
    }
    Ok(Box::new(FfmpegCameraCapturer::open(
        config.camera_device.as_deref(),
    )?))
}

fn apply_overrides(cli: &Cli, mut config: AppConfig) -> AppConfig {
    if let Some(source) = &cli.model_source {
        config.model_source = source.clone();
    }
    if let Some(size) = cli.input_size {
        config.detector.input_size = size;
    }
    if let Some(threshold) = cli.score_threshold {
        config.detector.score_threshold = threshold;
    }
    if let Some(device) = &cli.device {
        config.camera_device = Some(device.clone());
    }
    config
}

fn validate(cli: &Cli, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.image {
        if !path.is_file() {
            return Err(format!("Image file not found: {}", path.display()).into());
        }
        if !is_image(path) {
            log::warn!("{} does not look like an image file", path.display());
        }
    }
    config.detector.validate()?;
    Ok(())
}

fn is_image(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(artifact: ModelArtifact, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {artifact} model... {pct}%");
    } else {
        eprint!("\rDownloading {artifact} model... {downloaded} bytes");
    }
}
