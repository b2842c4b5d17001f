//! Body language extraction library for per-frame posture and gesture metrics.
//!
//! This library samples frames from a video file, runs three pretrained
//! landmark-detection models on each sampled frame, and derives simple
//! geometric body-language metrics from the returned coordinates:
//! - `ONNX` Runtime for landmark model inference
//! - `OpenCV` for video decoding and image operations
//! - Lazily fetched model artifacts cached on the local filesystem
//!
//! The pipeline consists of:
//! 1. Model provisioning (download once, reuse across runs)
//! 2. Landmark detection per sampled frame (pose, hand, face)
//! 3. Geometric analysis of the detected landmarks
//! 4. An ordered per-frame report serialized as JSON
//!
//! # Examples
//!
//! ## Processing a video
//!
//! ```no_run
//! use body_language_extraction::{
//!     config::Config, detection::LandmarkerSet, pipeline::VideoProcessor, provision::ModelStore,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let store = ModelStore::new(&config.models.model_dir)?;
//! let landmarkers = LandmarkerSet::new(&store, &config)?;
//!
//! let mut processor = VideoProcessor::new(landmarkers);
//! let report = processor.process("interview.mp4", 1.0)?;
//!
//! for frame in &report.results {
//!     if let Some(pose) = &frame.pose {
//!         println!("frame {}: arms crossed = {}", frame.frame_number, pose.arms_crossed);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Analyzing detection results directly
//!
//! ```
//! use body_language_extraction::analysis::analyze_hands;
//! use body_language_extraction::detection::{DetectionResult, LandmarkerKind};
//!
//! let empty = DetectionResult::empty(LandmarkerKind::Hand);
//! let metrics = analyze_hands(&empty);
//! assert!(!metrics.gesturing);
//! ```

/// Frame analyzers deriving semantic metrics from detection results
pub mod analysis;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Landmark detector adapter over ONNX Runtime sessions
pub mod detection;

/// Error types and result handling
pub mod error;

/// Pure geometry helpers for landmark coordinates
pub mod geometry;

/// Video sampler and pipeline driver
pub mod pipeline;

/// Local artifact store for pretrained model files
pub mod provision;

/// Safe numeric casting utilities
pub mod utils;

pub use error::{Error, Result};
