//! Landmark detector adapter over ONNX Runtime sessions.
//!
//! Three independent landmarker instances (pose, hand, face) share one
//! calling convention: a BGR frame plus a strictly increasing timestamp in,
//! a [`DetectionResult`] out. A frame with no subject above the confidence
//! threshold yields an empty result, not an error.

use crate::config::Config;
use crate::constants::{
    DEFAULT_DETECTION_CONFIDENCE, DEFAULT_FACE_INPUT_SIZE, DEFAULT_HAND_INPUT_SIZE,
    DEFAULT_POSE_INPUT_SIZE, DEFAULT_TRACKING_CONFIDENCE, FACE_MODEL_NAME, HAND_MODEL_NAME,
    MAX_HANDS, NUM_FACE_LANDMARKS, NUM_HAND_LANDMARKS, NUM_POSE_LANDMARKS, POSE_MODEL_NAME,
};
use crate::provision::ModelStore;
use crate::utils::usize_to_i32;
use crate::Result;
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// A single detected landmark in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// Horizontal position, nominally in `[0, 1]`
    pub x: f32,
    /// Vertical position, nominally in `[0, 1]`
    pub y: f32,
    /// Depth relative to the subject, model-defined scale
    pub z: f32,
}

impl Landmark {
    /// Create a new landmark
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Detector kind, one per model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkerKind {
    /// Whole-body pose landmarker (33 landmarks per subject)
    Pose,
    /// Hand landmarker (21 landmarks per subject, up to two subjects)
    Hand,
    /// Face landmarker (478 landmarks per subject)
    Face,
}

impl LandmarkerKind {
    /// Number of landmarks the model emits per detected subject
    #[must_use]
    pub fn landmarks_per_subject(self) -> usize {
        match self {
            Self::Pose => NUM_POSE_LANDMARKS,
            Self::Hand => NUM_HAND_LANDMARKS,
            Self::Face => NUM_FACE_LANDMARKS,
        }
    }

    /// Maximum number of subjects reported per frame
    #[must_use]
    pub fn max_subjects(self) -> usize {
        match self {
            Self::Hand => MAX_HANDS,
            Self::Pose | Self::Face => 1,
        }
    }

    fn default_input_size(self) -> i32 {
        match self {
            Self::Pose => DEFAULT_POSE_INPUT_SIZE,
            Self::Hand => DEFAULT_HAND_INPUT_SIZE,
            Self::Face => DEFAULT_FACE_INPUT_SIZE,
        }
    }

    fn session_name(self) -> &'static str {
        match self {
            Self::Pose => "pose_landmarker",
            Self::Hand => "hand_landmarker",
            Self::Face => "face_landmarker",
        }
    }
}

/// Landmark sets returned by one detector for one timestamp.
///
/// Each inner vector is one detected subject: 33 landmarks for a pose
/// subject, 21 for a hand, 478 for a face. Subjects are ordered as the
/// model reported them.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    kind: LandmarkerKind,
    subjects: Vec<Vec<Landmark>>,
}

impl DetectionResult {
    /// Build a result from already-decoded subject landmark sets
    #[must_use]
    pub fn new(kind: LandmarkerKind, subjects: Vec<Vec<Landmark>>) -> Self {
        Self { kind, subjects }
    }

    /// An empty result for a frame with no detection
    #[must_use]
    pub fn empty(kind: LandmarkerKind) -> Self {
        Self {
            kind,
            subjects: Vec::new(),
        }
    }

    /// Detector kind that produced this result
    #[must_use]
    pub fn kind(&self) -> LandmarkerKind {
        self.kind
    }

    /// Detected subject landmark sets, in model order
    #[must_use]
    pub fn subjects(&self) -> &[Vec<Landmark>] {
        &self.subjects
    }

    /// True if no subject was detected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Per-detector confidence configuration
#[derive(Debug, Clone, Copy)]
pub struct LandmarkerOptions {
    /// Minimum score for a subject to be reported at all
    pub min_detection_confidence: f32,
    /// Minimum score for a subject to be tracked across frames
    pub min_tracking_confidence: f32,
    /// Cap on reported subjects per frame
    pub max_subjects: usize,
}

impl Default for LandmarkerOptions {
    fn default() -> Self {
        Self {
            min_detection_confidence: DEFAULT_DETECTION_CONFIDENCE,
            min_tracking_confidence: DEFAULT_TRACKING_CONFIDENCE,
            max_subjects: 1,
        }
    }
}

/// Landmark detector backed by an ONNX Runtime session.
///
/// The session runs in video mode: timestamps passed to [`Landmarker::detect`]
/// must strictly increase across the life of the instance.
pub struct Landmarker {
    session: Session,
    kind: LandmarkerKind,
    #[allow(dead_code)] // Reserved for future named tensor support
    input_name: String,
    input_size: i32,
    options: LandmarkerOptions,
    last_timestamp_ms: Option<i64>,
}

impl Landmarker {
    /// Create a new landmarker from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has no inputs
    /// - The ONNX runtime environment cannot be created
    pub fn new<P: AsRef<Path>>(kind: LandmarkerKind, model_path: P, options: LandmarkerOptions) -> Result<Self> {
        log::info!(
            "Initializing {} with model: {}",
            kind.session_name(),
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name(kind.session_name())
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| crate::error::Error::ModelInputError("Model has no inputs".to_string()))?;

        let input_name = input_meta.name.clone();
        let input_shape = &input_meta.dimensions;

        // Extract input size from shape [batch, channels, height, width],
        // falling back to the known landmarker input size
        let input_size = if input_shape.len() >= 4 {
            input_shape[2]
                .map_or(kind.default_input_size(), |h| i32::try_from(h).unwrap_or(kind.default_input_size()))
        } else {
            kind.default_input_size()
        };

        Ok(Self {
            session,
            kind,
            input_name,
            input_size,
            options,
            last_timestamp_ms: None,
        })
    }

    /// Detector kind of this instance
    #[must_use]
    pub fn kind(&self) -> LandmarkerKind {
        self.kind
    }

    /// Detect landmark subjects in a BGR frame at the given timestamp.
    ///
    /// Timestamps are milliseconds from the start of the stream and must
    /// strictly increase across calls on the same instance; the model's
    /// temporal tracking assumes monotonic time.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The timestamp does not exceed the previous one
    /// - Frame preprocessing fails
    /// - The ONNX model inference fails
    /// - The output tensor has an unexpected shape
    pub fn detect(&mut self, frame: &Mat, timestamp_ms: i64) -> Result<DetectionResult> {
        if let Some(last) = self.last_timestamp_ms {
            if timestamp_ms <= last {
                return Err(crate::error::Error::InvalidInput(format!(
                    "{} timestamps must strictly increase: got {timestamp_ms}ms after {last}ms",
                    self.kind.session_name()
                )));
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        let input = self.preprocess(frame)?;
        let (landmarks, scores) = self.forward(input)?;

        Ok(self.postprocess(&landmarks, &scores))
    }

    /// Preprocess a BGR frame into a normalized NCHW tensor
    #[allow(clippy::cast_sign_loss)] // OpenCV dimensions are positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let channels = 3;

        // Resize to the model input square
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        // Convert BGR to RGB
        let mut rgb_image = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb_image, imgproc::COLOR_BGR2RGB, 0)?;

        // Convert to f32 and normalize to [0, 1]
        let mut float_image = Mat::default();
        rgb_image.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = vec![0.0f32; size * size * channels];
        for row in 0..size {
            for col in 0..size {
                let pixel = float_image.at_2d::<opencv::core::Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
                for ch in 0..channels {
                    data[(row * size + col) * channels + ch] = pixel[ch];
                }
            }
        }

        // Create NHWC array and transpose to NCHW
        let array = Array4::from_shape_vec((1, size, size, channels), data)
            .map_err(|e| crate::error::Error::ModelDataFormatError(format!("Failed to create array: {e}")))?;

        Ok(array.permuted_axes([0, 3, 1, 2]))
    }

    /// Run forward pass through the model, returning flattened landmark
    /// coordinates and per-subject presence scores
    fn forward(&self, inputs: Array4<f32>) -> Result<(Vec<f32>, Vec<f32>)> {
        let cow_array = CowArray::from(inputs.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mut iter = outputs.into_iter();
        let landmarks_output = iter
            .next()
            .ok_or_else(|| crate::error::Error::ModelOutputError("No output from model".to_string()))?;

        let landmarks_tensor = landmarks_output.try_extract::<f32>()?;
        let landmarks_view = landmarks_tensor.view();
        let landmarks = landmarks_view
            .as_slice()
            .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to get landmark data".to_string()))?
            .to_vec();

        // The second output carries one presence score per subject slot.
        // Single-output exports report the subject unconditionally.
        let scores = match iter.next() {
            Some(scores_output) => {
                let scores_tensor = scores_output.try_extract::<f32>()?;
                let scores_view = scores_tensor.view();
                scores_view
                    .as_slice()
                    .ok_or_else(|| crate::error::Error::ModelOutputError("Failed to get score data".to_string()))?
                    .to_vec()
            }
            None => vec![1.0; self.kind.max_subjects()],
        };

        Ok((landmarks, scores))
    }

    /// Decode flattened model output into confidence-gated subject sets
    fn postprocess(&self, landmarks: &[f32], scores: &[f32]) -> DetectionResult {
        let per_subject = self.kind.landmarks_per_subject();
        let values_per_subject = per_subject * 3;
        let max_subjects = self.kind.max_subjects().min(self.options.max_subjects.max(1));

        let mut subjects = Vec::new();

        for (slot, chunk) in landmarks.chunks_exact(values_per_subject).enumerate() {
            if subjects.len() >= max_subjects {
                break;
            }

            let score = scores.get(slot).copied().unwrap_or(0.0);
            if score < self.options.min_detection_confidence {
                continue;
            }

            let subject: Vec<Landmark> = chunk
                .chunks_exact(3)
                .map(|xyz| Landmark::new(xyz[0], xyz[1], xyz[2]))
                .collect();
            subjects.push(subject);
        }

        DetectionResult::new(self.kind, subjects)
    }
}

/// The three landmarker instances behind one pipeline.
pub struct LandmarkerSet {
    /// Whole-body pose landmarker
    pub pose: Landmarker,
    /// Hand landmarker, capped at two subjects
    pub hand: Landmarker,
    /// Face landmarker
    pub face: Landmarker,
}

impl LandmarkerSet {
    /// Build all three landmarkers, fetching model artifacts through the
    /// store on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if any artifact cannot be fetched or any session
    /// fails to load.
    pub fn new(store: &ModelStore, config: &Config) -> Result<Self> {
        let pose_path = store.ensure(POSE_MODEL_NAME, &config.models.pose_url)?;
        let hand_path = store.ensure(HAND_MODEL_NAME, &config.models.hand_url)?;
        let face_path = store.ensure(FACE_MODEL_NAME, &config.models.face_url)?;

        let detection = &config.detection;

        let pose = Landmarker::new(
            LandmarkerKind::Pose,
            pose_path,
            LandmarkerOptions {
                min_detection_confidence: detection.min_detection_confidence,
                min_tracking_confidence: detection.min_tracking_confidence,
                max_subjects: 1,
            },
        )?;

        let hand = Landmarker::new(
            LandmarkerKind::Hand,
            hand_path,
            LandmarkerOptions {
                min_detection_confidence: detection.min_detection_confidence,
                min_tracking_confidence: detection.min_tracking_confidence,
                max_subjects: detection.max_hands,
            },
        )?;

        let face = Landmarker::new(
            LandmarkerKind::Face,
            face_path,
            LandmarkerOptions {
                min_detection_confidence: detection.min_detection_confidence,
                min_tracking_confidence: detection.min_tracking_confidence,
                max_subjects: 1,
            },
        )?;

        Ok(Self { pose, hand, face })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmarks_per_subject() {
        assert_eq!(LandmarkerKind::Pose.landmarks_per_subject(), 33);
        assert_eq!(LandmarkerKind::Hand.landmarks_per_subject(), 21);
        assert_eq!(LandmarkerKind::Face.landmarks_per_subject(), 478);
    }

    #[test]
    fn test_subject_caps() {
        assert_eq!(LandmarkerKind::Pose.max_subjects(), 1);
        assert_eq!(LandmarkerKind::Hand.max_subjects(), 2);
        assert_eq!(LandmarkerKind::Face.max_subjects(), 1);
    }

    #[test]
    fn test_empty_result() {
        let result = DetectionResult::empty(LandmarkerKind::Pose);
        assert!(result.is_empty());
        assert_eq!(result.subjects().len(), 0);
        assert_eq!(result.kind(), LandmarkerKind::Pose);
    }

    #[test]
    fn test_default_options() {
        let options = LandmarkerOptions::default();
        assert!((options.min_detection_confidence - 0.5).abs() < f32::EPSILON);
        assert!((options.min_tracking_confidence - 0.5).abs() < f32::EPSILON);
        assert_eq!(options.max_subjects, 1);
    }
}
