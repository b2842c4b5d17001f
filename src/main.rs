//! Command line video processor extracting body language metrics.

use anyhow::{bail, Result};
use body_language_extraction::{
    config::Config, detection::LandmarkerSet, pipeline::VideoProcessor, provision::ModelStore,
};
use clap::Parser;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Extracts per-frame body language metrics from a video file", long_about = None)]
struct Args {
    /// Path to the video file to analyze
    video_path: PathBuf,

    /// Output sample rate in frames per second
    sample_rate: Option<f64>,

    /// Directory where model artifacts are cached
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Body Language Extraction");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if let Some(model_dir) = args.model_dir {
        config.models.model_dir = model_dir;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.sampling.sample_rate = sample_rate;
    }
    config.validate()?;

    // Reject a missing video before any model loading or download
    if !args.video_path.is_file() {
        bail!("Video file not found: {}", args.video_path.display());
    }

    let store = ModelStore::new(&config.models.model_dir)?;
    let landmarkers = LandmarkerSet::new(&store, &config)?;

    let mut processor = VideoProcessor::new(landmarkers);
    let report = processor.process(&args.video_path, config.sampling.sample_rate)?;

    // The JSON document is the only thing written to stdout
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
