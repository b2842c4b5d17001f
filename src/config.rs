//! Configuration management for the body language extraction pipeline

use crate::constants::{
    DEFAULT_DETECTION_CONFIDENCE, DEFAULT_MODEL_DIR, DEFAULT_SAMPLE_RATE, DEFAULT_TRACKING_CONFIDENCE,
    FACE_MODEL_URL, HAND_MODEL_URL, MAX_HANDS, POSE_MODEL_URL,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model artifact configuration
    pub models: ModelConfig,

    /// Landmark detection configuration
    pub detection: DetectionConfig,

    /// Frame sampling configuration
    pub sampling: SamplingConfig,
}

/// Model artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory where fetched model artifacts are cached
    pub model_dir: PathBuf,

    /// Download URL for the pose landmarker model
    pub pose_url: String,

    /// Download URL for the hand landmarker model
    pub hand_url: String,

    /// Download URL for the face landmarker model
    pub face_url: String,
}

/// Landmark detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum subject detection confidence (0.0-1.0)
    pub min_detection_confidence: f32,

    /// Minimum subject tracking confidence (0.0-1.0)
    pub min_tracking_confidence: f32,

    /// Maximum number of hands to detect per frame
    pub max_hands: usize,
}

/// Frame sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Output sample rate in frames per second
    pub sample_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            detection: DetectionConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            pose_url: POSE_MODEL_URL.to_string(),
            hand_url: HAND_MODEL_URL.to_string(),
            face_url: FACE_MODEL_URL.to_string(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            min_tracking_confidence: DEFAULT_TRACKING_CONFIDENCE,
            max_hands: MAX_HANDS,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.detection.min_detection_confidence) {
            return Err(Error::ConfigError(
                "Detection confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.min_tracking_confidence) {
            return Err(Error::ConfigError(
                "Tracking confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detection.max_hands == 0 {
            return Err(Error::ConfigError("Maximum hand count must be at least 1".to_string()));
        }

        if !self.sampling.sample_rate.is_finite() || self.sampling.sample_rate <= 0.0 {
            return Err(Error::ConfigError("Sample rate must be greater than 0".to_string()));
        }

        if self.models.pose_url.is_empty() || self.models.hand_url.is_empty() || self.models.face_url.is_empty() {
            return Err(Error::ConfigError("Model URLs must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Body Language Extraction Configuration

# Model artifact cache
models:
  model_dir: "models"
  pose_url: "https://github.com/body-language-extraction/models/releases/download/v1.0/pose_landmarker.onnx"
  hand_url: "https://github.com/body-language-extraction/models/releases/download/v1.0/hand_landmarker.onnx"
  face_url: "https://github.com/body-language-extraction/models/releases/download/v1.0/face_landmarker.onnx"

# Landmark detection parameters
detection:
  min_detection_confidence: 0.5
  min_tracking_confidence: 0.5
  max_hands: 2

# Frame sampling
sampling:
  sample_rate: 1.0
"#;
