//! Pure geometry helpers for landmark coordinates.
//!
//! Every function in this module propagates missing input as `None`. A
//! landmark that was not detected never produces a default coordinate or a
//! panic, so analyzers can chain these helpers without per-call checks.

use crate::detection::Landmark;

/// Extract normalized `[x, y]` coordinates from an optional landmark
#[must_use]
pub fn coords(landmark: Option<&Landmark>) -> Option<[f64; 2]> {
    landmark.map(|lm| [f64::from(lm.x), f64::from(lm.y)])
}

/// Angle at vertex `b` formed by the rays `b -> a` and `b -> c`, in degrees.
///
/// The result is always in `[0, 180]` and symmetric in `a` and `c`. Returns
/// `None` if any input point is missing.
#[must_use]
pub fn angle(a: Option<[f64; 2]>, b: Option<[f64; 2]>, c: Option<[f64; 2]>) -> Option<f64> {
    let [ax, ay] = a?;
    let [bx, by] = b?;
    let [cx, cy] = c?;

    let radians = (cy - by).atan2(cx - bx) - (ay - by).atan2(ax - bx);
    let mut degrees = radians.to_degrees().abs();

    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }

    Some(degrees)
}

/// Midpoint of two points
#[must_use]
pub fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

/// Euclidean distance between two points
#[must_use]
pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx.hypot(dy)
}
