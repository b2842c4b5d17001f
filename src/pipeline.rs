//! Video sampler and pipeline driver.
//!
//! One linear pass over the video: frames are decoded in order, analyzed at
//! the requested sample rate, and folded into an ordered report. The only
//! state carried between frames is the previous face detection, used for
//! nod detection.

use crate::analysis::{analyze_hands, analyze_head_movement, analyze_pose, HandMetrics, HeadMetrics, PoseMetrics};
use crate::constants::PROGRESS_LOG_INTERVAL;
use crate::detection::{DetectionResult, LandmarkerSet};
use crate::utils::{f64_to_i64, f64_to_u64};
use crate::{Error, Result};
use log::{debug, info};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metrics for one sampled frame.
///
/// `frame_number` is the zero-based index within the original, unsampled
/// stream; it strictly increases across the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Frame time in seconds from the start of the video
    pub timestamp: f64,
    /// Zero-based index within the unsampled stream
    pub frame_number: u64,
    /// Posture metrics, absent when no pose subject was detected
    pub pose: Option<PoseMetrics>,
    /// Head movement metrics, absent without face detections in both this
    /// and the previous sampled frame
    pub head: Option<HeadMetrics>,
    /// Hand visibility metrics
    pub hands: Option<HandMetrics>,
    /// The pose detector returned at least one subject
    pub has_person_detected: bool,
}

/// Full pipeline output for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoReport {
    /// The run completed without a fatal error
    pub success: bool,
    /// Path of the analyzed video
    pub video_path: String,
    /// Requested output sample rate in frames per second
    pub sample_rate: f64,
    /// Number of frames analyzed
    pub frames_processed: usize,
    /// Per-frame metrics in frame order
    pub results: Vec<FrameResult>,
}

/// Number of source frames per analyzed frame.
///
/// Clamped to at least 1, so a sample rate above the video frame rate
/// analyzes every frame.
///
/// # Errors
///
/// Returns an error if `fps` or `sample_rate` is non-positive or not finite
pub fn sample_interval(fps: f64, sample_rate: f64) -> Result<u64> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Video reports an unusable frame rate: {fps}"
        )));
    }
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Sample rate must be greater than 0, got {sample_rate}"
        )));
    }

    Ok(f64_to_u64((fps / sample_rate).floor())?.max(1))
}

/// Timestamp of a frame in milliseconds, rounded to the nearest integer
///
/// # Errors
///
/// Returns an error if the computed value does not fit an i64
pub fn frame_timestamp_ms(frame_number: u64, fps: f64) -> Result<i64> {
    #[allow(clippy::cast_precision_loss)] // Frame counts stay far below 2^52
    let seconds = frame_number as f64 / fps;
    f64_to_i64((seconds * 1000.0).round())
}

/// Sequential driver feeding sampled frames through the three landmarkers
/// and analyzers
pub struct VideoProcessor {
    landmarkers: LandmarkerSet,
}

impl VideoProcessor {
    /// Create a processor over an initialized landmarker set
    #[must_use]
    pub fn new(landmarkers: LandmarkerSet) -> Self {
        Self { landmarkers }
    }

    /// Process a video file, analyzing frames at `sample_rate` frames per
    /// second of output.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The video cannot be opened or reports no usable frame rate
    /// - The sample rate is non-positive
    /// - A frame fails to decode mid-stream
    /// - A detector invocation fails
    pub fn process<P: AsRef<Path>>(&mut self, video_path: P, sample_rate: f64) -> Result<VideoReport> {
        let video_path = video_path.as_ref();
        let path_str = video_path.to_string_lossy().into_owned();

        // The capture handle is released on every exit path when it drops
        let mut capture = VideoCapture::from_file(&path_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::InvalidInput(format!(
                "Cannot open video file: {path_str}"
            )));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let frame_interval = sample_interval(fps, sample_rate)?;

        info!("Processing video at {sample_rate} fps (every {frame_interval} frames)...");

        let mut results = Vec::new();
        let mut frame_number: u64 = 0;
        let mut prev_face_result: Option<DetectionResult> = None;
        let mut frame = Mat::default();

        loop {
            // Ok(false) or an empty Mat is end of stream; a read error is a
            // decode failure and aborts the run
            let read = capture
                .read(&mut frame)
                .map_err(|e| Error::Decode(format!("Frame {frame_number} failed to decode: {e}")))?;
            if !read || frame.empty() {
                break;
            }

            if frame_number % frame_interval != 0 {
                frame_number += 1;
                continue;
            }

            let timestamp_ms = frame_timestamp_ms(frame_number, fps)?;
            debug!("Analyzing frame {frame_number} at {timestamp_ms}ms");

            let pose_result = self.landmarkers.pose.detect(&frame, timestamp_ms)?;
            let hand_result = self.landmarkers.hand.detect(&frame, timestamp_ms)?;
            let face_result = self.landmarkers.face.detect(&frame, timestamp_ms)?;

            let pose = analyze_pose(&pose_result);
            let head = analyze_head_movement(&face_result, prev_face_result.as_ref());
            let hands = analyze_hands(&hand_result);

            #[allow(clippy::cast_precision_loss)] // Frame counts stay far below 2^52
            results.push(FrameResult {
                timestamp: frame_number as f64 / fps,
                frame_number,
                pose,
                head,
                hands: Some(hands),
                has_person_detected: !pose_result.is_empty(),
            });

            // Overwritten every sampled frame, even when empty: a detection
            // gap resets nod continuity
            prev_face_result = Some(face_result);

            frame_number += 1;

            if frame_number % PROGRESS_LOG_INTERVAL == 0 {
                #[allow(clippy::cast_precision_loss)]
                let elapsed = frame_number as f64 / fps;
                info!("Processed frame {frame_number} ({elapsed:.1}s)");
            }
        }

        info!("Completed processing {} frames", results.len());

        Ok(VideoReport {
            success: true,
            video_path: path_str,
            sample_rate,
            frames_processed: results.len(),
            results,
        })
    }
}
