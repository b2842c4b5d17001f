//! Frame analyzers converting raw detection results into semantic metrics.
//!
//! Each analyzer is a pure function of one or two [`DetectionResult`]s.
//! Missing subjects or landmarks propagate as `None` for the affected
//! metric; they are never an error.

use crate::constants::{
    FACE_NOSE_TIP, NODDING_THRESHOLD, OPEN_POSTURE_THRESHOLD, POSE_LEFT_HIP, POSE_LEFT_SHOULDER,
    POSE_LEFT_WRIST, POSE_RIGHT_HIP, POSE_RIGHT_SHOULDER, POSE_RIGHT_WRIST,
};
use crate::detection::DetectionResult;
use crate::geometry::{coords, distance, midpoint};
use serde::{Deserialize, Serialize};

/// Posture metrics derived from one pose subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseMetrics {
    /// Torso tilt from vertical in degrees. Sign-independent: forward and
    /// backward lean are not distinguished.
    pub forward_lean_angle: Option<f64>,
    /// Both wrists crossed past the shoulder midpoint
    pub arms_crossed: bool,
    /// Euclidean distance between the shoulders, normalized image units
    pub shoulder_width: Option<f64>,
    /// Angle of the left-to-right shoulder vector against the image x-axis,
    /// in degrees
    pub body_orientation: Option<f64>,
    /// Shoulder width above the open-posture threshold
    pub open_posture: Option<bool>,
}

/// Head movement metrics between two consecutive sampled frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadMetrics {
    /// Nose-tip vertical delta since the previous sampled frame, normalized
    /// image units. No sign correction for camera orientation.
    pub vertical_movement: f64,
    /// Absolute vertical movement above the nodding threshold
    pub is_nodding: bool,
}

/// Hand visibility metrics for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandMetrics {
    /// A first hand subject was detected. Ordinal position, not true
    /// handedness.
    pub left_hand_visible: bool,
    /// A second hand subject was detected
    pub right_hand_visible: bool,
    /// Any visible hand counts as gesturing
    pub gesturing: bool,
}

/// Analyze body pose and posture from one pose detection result.
///
/// Returns `None` when no pose subject was detected. Individual metrics are
/// `None` whenever a landmark they need is missing.
#[must_use]
pub fn analyze_pose(pose_result: &DetectionResult) -> Option<PoseMetrics> {
    let landmarks = pose_result.subjects().first()?;

    let left_shoulder = coords(landmarks.get(POSE_LEFT_SHOULDER));
    let right_shoulder = coords(landmarks.get(POSE_RIGHT_SHOULDER));
    let left_wrist = coords(landmarks.get(POSE_LEFT_WRIST));
    let right_wrist = coords(landmarks.get(POSE_RIGHT_WRIST));
    let left_hip = coords(landmarks.get(POSE_LEFT_HIP));
    let right_hip = coords(landmarks.get(POSE_RIGHT_HIP));

    // Forward lean: angle of the hip-to-shoulder midline from vertical
    let forward_lean_angle = match (left_shoulder, right_shoulder, left_hip, right_hip) {
        (Some(ls), Some(rs), Some(lh), Some(rh)) => {
            let shoulder_mid = midpoint(ls, rs);
            let hip_mid = midpoint(lh, rh);
            Some(
                (shoulder_mid[0] - hip_mid[0])
                    .atan2(hip_mid[1] - shoulder_mid[1])
                    .to_degrees()
                    .abs(),
            )
        }
        _ => None,
    };

    // Arms crossed: wrists on opposite sides of the shoulder midpoint.
    // "Left"/"right" follow the landmark source's convention, not the
    // viewer's.
    let arms_crossed = match (left_wrist, right_wrist, left_shoulder, right_shoulder) {
        (Some(lw), Some(rw), Some(ls), Some(rs)) => {
            let torso_center = (ls[0] + rs[0]) / 2.0;
            lw[0] > torso_center && rw[0] < torso_center
        }
        _ => false,
    };

    let shoulder_width = match (left_shoulder, right_shoulder) {
        (Some(ls), Some(rs)) => Some(distance(ls, rs)),
        _ => None,
    };

    let body_orientation = match (left_shoulder, right_shoulder) {
        (Some(ls), Some(rs)) => Some((rs[1] - ls[1]).atan2(rs[0] - ls[0]).to_degrees()),
        _ => None,
    };

    let open_posture = shoulder_width.map(|width| width > OPEN_POSTURE_THRESHOLD);

    Some(PoseMetrics {
        forward_lean_angle,
        arms_crossed,
        shoulder_width,
        body_orientation,
        open_posture,
    })
}

/// Detect vertical head movement between two consecutive sampled frames.
///
/// Requires a detected face in both the current and the previous result;
/// returns `None` otherwise, so a detection gap resets nod continuity.
#[must_use]
pub fn analyze_head_movement(
    face_result: &DetectionResult,
    prev_face_result: Option<&DetectionResult>,
) -> Option<HeadMetrics> {
    let current = face_result.subjects().first()?;
    let previous = prev_face_result?.subjects().first()?;

    let current_nose = current.get(FACE_NOSE_TIP)?;
    let prev_nose = previous.get(FACE_NOSE_TIP)?;

    let vertical_movement = f64::from(current_nose.y) - f64::from(prev_nose.y);

    Some(HeadMetrics {
        vertical_movement,
        is_nodding: vertical_movement.abs() > NODDING_THRESHOLD,
    })
}

/// Analyze hand visibility from one hand detection result.
///
/// The first detected hand is reported as left and the second as right
/// regardless of actual handedness.
#[must_use]
pub fn analyze_hands(hand_result: &DetectionResult) -> HandMetrics {
    let num_hands = hand_result.subjects().len();

    HandMetrics {
        left_hand_visible: num_hands > 0,
        right_hand_visible: num_hands > 1,
        gesturing: num_hands > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_POSE_LANDMARKS;
    use crate::detection::{DetectionResult, Landmark, LandmarkerKind};

    /// A full pose subject with every landmark at the origin except the
    /// ones set explicitly
    fn pose_subject(points: &[(usize, f32, f32)]) -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.0, 0.0, 0.0); NUM_POSE_LANDMARKS];
        for &(index, x, y) in points {
            landmarks[index] = Landmark::new(x, y, 0.0);
        }
        landmarks
    }

    fn face_with_nose_y(y: f32) -> DetectionResult {
        let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); 2];
        landmarks[FACE_NOSE_TIP] = Landmark::new(0.5, y, 0.0);
        DetectionResult::new(LandmarkerKind::Face, vec![landmarks])
    }

    fn hands_with_count(count: usize) -> DetectionResult {
        let subjects = (0..count)
            .map(|_| vec![Landmark::new(0.5, 0.5, 0.0); 21])
            .collect();
        DetectionResult::new(LandmarkerKind::Hand, subjects)
    }

    #[test]
    fn test_no_pose_subject_yields_none() {
        let result = DetectionResult::empty(LandmarkerKind::Pose);
        assert!(analyze_pose(&result).is_none());
    }

    #[test]
    fn test_shoulder_width_and_open_posture() {
        let subject = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.3, 0.5),
            (POSE_RIGHT_SHOULDER, 0.5, 0.5),
        ]);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![subject]);

        let metrics = analyze_pose(&result).unwrap();
        let width = metrics.shoulder_width.unwrap();
        assert!((width - 0.2).abs() < 1e-9);
        assert_eq!(metrics.open_posture, Some(true));
    }

    #[test]
    fn test_narrow_shoulders_closed_posture() {
        let subject = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.45, 0.5),
            (POSE_RIGHT_SHOULDER, 0.5, 0.5),
        ]);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![subject]);

        let metrics = analyze_pose(&result).unwrap();
        assert_eq!(metrics.open_posture, Some(false));
    }

    #[test]
    fn test_arms_crossed() {
        // Shoulder midpoint at x=0.4; left wrist past it to the right,
        // right wrist past it to the left
        let subject = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.3, 0.4),
            (POSE_RIGHT_SHOULDER, 0.5, 0.4),
            (POSE_LEFT_WRIST, 0.6, 0.6),
            (POSE_RIGHT_WRIST, 0.3, 0.6),
        ]);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![subject]);

        let metrics = analyze_pose(&result).unwrap();
        assert!(metrics.arms_crossed);
    }

    #[test]
    fn test_arms_not_crossed() {
        let subject = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.3, 0.4),
            (POSE_RIGHT_SHOULDER, 0.5, 0.4),
            (POSE_LEFT_WRIST, 0.3, 0.6),
            (POSE_RIGHT_WRIST, 0.5, 0.6),
        ]);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![subject]);

        let metrics = analyze_pose(&result).unwrap();
        assert!(!metrics.arms_crossed);
    }

    #[test]
    fn test_upright_torso_zero_lean() {
        let subject = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.4, 0.3),
            (POSE_RIGHT_SHOULDER, 0.6, 0.3),
            (POSE_LEFT_HIP, 0.4, 0.7),
            (POSE_RIGHT_HIP, 0.6, 0.7),
        ]);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![subject]);

        let metrics = analyze_pose(&result).unwrap();
        assert!(metrics.forward_lean_angle.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_lean_angle_is_sign_independent() {
        // Shoulders shifted right of the hips and left of the hips by the
        // same amount report the same lean
        let leaning_right = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.5, 0.3),
            (POSE_RIGHT_SHOULDER, 0.7, 0.3),
            (POSE_LEFT_HIP, 0.4, 0.7),
            (POSE_RIGHT_HIP, 0.6, 0.7),
        ]);
        let leaning_left = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.3, 0.3),
            (POSE_RIGHT_SHOULDER, 0.5, 0.3),
            (POSE_LEFT_HIP, 0.4, 0.7),
            (POSE_RIGHT_HIP, 0.6, 0.7),
        ]);

        let right = analyze_pose(&DetectionResult::new(LandmarkerKind::Pose, vec![leaning_right]))
            .unwrap()
            .forward_lean_angle
            .unwrap();
        let left = analyze_pose(&DetectionResult::new(LandmarkerKind::Pose, vec![leaning_left]))
            .unwrap()
            .forward_lean_angle
            .unwrap();

        assert!((right - left).abs() < 1e-9);
        assert!(right > 0.0);
    }

    #[test]
    fn test_level_shoulders_zero_orientation() {
        let subject = pose_subject(&[
            (POSE_LEFT_SHOULDER, 0.3, 0.5),
            (POSE_RIGHT_SHOULDER, 0.5, 0.5),
        ]);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![subject]);

        let metrics = analyze_pose(&result).unwrap();
        assert!(metrics.body_orientation.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_truncated_subject_propagates_none() {
        // A subject with only the first 13 landmarks: shoulders present,
        // wrists and hips missing
        let mut landmarks = vec![Landmark::new(0.0, 0.0, 0.0); 13];
        landmarks[POSE_LEFT_SHOULDER] = Landmark::new(0.3, 0.5, 0.0);
        landmarks[POSE_RIGHT_SHOULDER] = Landmark::new(0.5, 0.5, 0.0);
        let result = DetectionResult::new(LandmarkerKind::Pose, vec![landmarks]);

        let metrics = analyze_pose(&result).unwrap();
        assert!(metrics.forward_lean_angle.is_none());
        assert!(!metrics.arms_crossed);
        assert!(metrics.shoulder_width.is_some());
    }

    #[test]
    fn test_nodding_detected() {
        let current = face_with_nose_y(0.52);
        let previous = face_with_nose_y(0.50);

        let metrics = analyze_head_movement(&current, Some(&previous)).unwrap();
        assert!((metrics.vertical_movement - 0.02).abs() < 1e-6);
        assert!(metrics.is_nodding);
    }

    #[test]
    fn test_small_movement_is_not_nodding() {
        let current = face_with_nose_y(0.505);
        let previous = face_with_nose_y(0.50);

        let metrics = analyze_head_movement(&current, Some(&previous)).unwrap();
        assert!(!metrics.is_nodding);
    }

    #[test]
    fn test_head_movement_requires_both_frames() {
        let current = face_with_nose_y(0.5);
        let empty = DetectionResult::empty(LandmarkerKind::Face);

        assert!(analyze_head_movement(&current, None).is_none());
        assert!(analyze_head_movement(&current, Some(&empty)).is_none());
        assert!(analyze_head_movement(&empty, Some(&current)).is_none());
    }

    #[test]
    fn test_no_hands() {
        let metrics = analyze_hands(&hands_with_count(0));
        assert!(!metrics.left_hand_visible);
        assert!(!metrics.right_hand_visible);
        assert!(!metrics.gesturing);
    }

    #[test]
    fn test_single_hand_reported_as_left() {
        // Ordinal position, not true handedness: the first detected hand is
        // always reported as left
        let metrics = analyze_hands(&hands_with_count(1));
        assert!(metrics.left_hand_visible);
        assert!(!metrics.right_hand_visible);
        assert!(metrics.gesturing);
    }

    #[test]
    fn test_two_hands() {
        let metrics = analyze_hands(&hands_with_count(2));
        assert!(metrics.left_hand_visible);
        assert!(metrics.right_hand_visible);
        assert!(metrics.gesturing);
    }
}
