//! Constants used throughout the application

/// Number of landmarks per detected pose subject
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Number of landmarks per detected hand subject
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Number of landmarks per detected face subject
pub const NUM_FACE_LANDMARKS: usize = 478;

/// Pose landmark indices used by the pose analyzer
pub const POSE_NOSE: usize = 0;
pub const POSE_LEFT_SHOULDER: usize = 11;
pub const POSE_RIGHT_SHOULDER: usize = 12;
pub const POSE_LEFT_ELBOW: usize = 13;
pub const POSE_RIGHT_ELBOW: usize = 14;
pub const POSE_LEFT_WRIST: usize = 15;
pub const POSE_RIGHT_WRIST: usize = 16;
pub const POSE_LEFT_HIP: usize = 23;
pub const POSE_RIGHT_HIP: usize = 24;

/// Approximate nose-tip index in the face landmark set
pub const FACE_NOSE_TIP: usize = 1;

/// Maximum number of hands reported per frame
pub const MAX_HANDS: usize = 2;

/// Default confidence thresholds for the landmarkers
pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.5;

/// Shoulder width above which the posture counts as open (normalized image units)
pub const OPEN_POSTURE_THRESHOLD: f64 = 0.15;

/// Vertical nose-tip movement above which the head counts as nodding
/// (normalized image units between two consecutive sampled frames)
pub const NODDING_THRESHOLD: f64 = 0.01;

/// Default output sample rate in frames per second
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

/// How often to log processing progress, in frames
pub const PROGRESS_LOG_INTERVAL: u64 = 30;

/// Default directory for cached model artifacts
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Model artifact file names
pub const POSE_MODEL_NAME: &str = "pose_landmarker.onnx";
pub const HAND_MODEL_NAME: &str = "hand_landmarker.onnx";
pub const FACE_MODEL_NAME: &str = "face_landmarker.onnx";

/// Model artifact download URLs
pub const POSE_MODEL_URL: &str =
    "https://github.com/body-language-extraction/models/releases/download/v1.0/pose_landmarker.onnx";
pub const HAND_MODEL_URL: &str =
    "https://github.com/body-language-extraction/models/releases/download/v1.0/hand_landmarker.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/body-language-extraction/models/releases/download/v1.0/face_landmarker.onnx";

/// Fallback model input sizes when the session metadata omits them
pub const DEFAULT_POSE_INPUT_SIZE: i32 = 256;
pub const DEFAULT_HAND_INPUT_SIZE: i32 = 224;
pub const DEFAULT_FACE_INPUT_SIZE: i32 = 192;
