//! Directional statistics
//!
//! Wind bearings are circular: 350° and 10° are 20° apart, not 340°. Means
//! are computed by averaging unit vectors and reconstructing the angle with
//! `atan2`, which stays correct across the 0°/360° wrap.

use serde::{Deserialize, Serialize};

/// Width of one compass sector in degrees
const SECTOR_DEGREES: f64 = 22.5;

/// Below this resultant length the samples cancel out and carry no direction
const MIN_RESULTANT: f64 = 1e-9;

/// One of the 16 points of the compass rose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassPoint {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl CompassPoint {
    /// Compass points clockwise from north
    pub const ROSE: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::Nne,
        CompassPoint::Ne,
        CompassPoint::Ene,
        CompassPoint::E,
        CompassPoint::Ese,
        CompassPoint::Se,
        CompassPoint::Sse,
        CompassPoint::S,
        CompassPoint::Ssw,
        CompassPoint::Sw,
        CompassPoint::Wsw,
        CompassPoint::W,
        CompassPoint::Wnw,
        CompassPoint::Nw,
        CompassPoint::Nnw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::Nne => "NNE",
            CompassPoint::Ne => "NE",
            CompassPoint::Ene => "ENE",
            CompassPoint::E => "E",
            CompassPoint::Ese => "ESE",
            CompassPoint::Se => "SE",
            CompassPoint::Sse => "SSE",
            CompassPoint::S => "S",
            CompassPoint::Ssw => "SSW",
            CompassPoint::Sw => "SW",
            CompassPoint::Wsw => "WSW",
            CompassPoint::W => "W",
            CompassPoint::Wnw => "WNW",
            CompassPoint::Nw => "NW",
            CompassPoint::Nnw => "NNW",
        }
    }

    /// Centre bearing of this sector in degrees
    pub fn bearing(&self) -> f64 {
        let idx = Self::ROSE.iter().position(|p| p == self).unwrap_or(0);
        idx as f64 * SECTOR_DEGREES
    }
}

/// Circular mean and compass label of a set of bearings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalSummary {
    pub mean_degrees: f64,
    pub compass: CompassPoint,
    pub sample_count: usize,
}

impl DirectionalSummary {
    /// Summarize bearings, `None` when no direction can be derived
    pub fn from_degrees(degrees: &[f64]) -> Option<Self> {
        let mean_degrees = circular_mean(degrees)?;
        Some(Self {
            mean_degrees,
            compass: degree_to_compass(mean_degrees),
            sample_count: degrees.iter().filter(|d| d.is_finite()).count(),
        })
    }
}

/// Circular mean of bearings in degrees, normalized to [0, 360).
///
/// Returns `None` for empty or all-invalid input, and when the unit vectors
/// cancel out (e.g. exactly opposite bearings).
pub fn circular_mean(degrees: &[f64]) -> Option<f64> {
    let mut sin_sum = 0.0;
    let mut cos_sum = 0.0;
    let mut count = 0usize;

    for deg in degrees.iter().filter(|d| d.is_finite()) {
        let rad = deg.to_radians();
        sin_sum += rad.sin();
        cos_sum += rad.cos();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let sin_avg = sin_sum / count as f64;
    let cos_avg = cos_sum / count as f64;
    if sin_avg.hypot(cos_avg) < MIN_RESULTANT {
        return None;
    }

    Some(normalize_degrees(sin_avg.atan2(cos_avg).to_degrees()))
}

/// Map a bearing onto the nearest of 16 compass sectors (0° → N)
pub fn degree_to_compass(angle: f64) -> CompassPoint {
    let normalized = normalize_degrees(angle);
    let idx = (normalized / SECTOR_DEGREES).round() as usize % CompassPoint::ROSE.len();
    CompassPoint::ROSE[idx]
}

/// Wrap any finite angle into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_mean_across_wrap() {
        let mean = circular_mean(&[350.0, 10.0]).unwrap();
        assert!(angular_distance(mean, 0.0) < 1e-9, "got {mean}");
    }

    #[test]
    fn test_mean_simple() {
        let mean = circular_mean(&[80.0, 90.0, 100.0]).unwrap();
        assert!((mean - 90.0).abs() < 1e-9);

        let mean = circular_mean(&[270.0]).unwrap();
        assert!((mean - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_empty_and_invalid() {
        assert_eq!(circular_mean(&[]), None);
        assert_eq!(circular_mean(&[f64::NAN, f64::INFINITY]), None);
    }

    #[test]
    fn test_mean_of_opposites_is_undefined() {
        assert_eq!(circular_mean(&[0.0, 180.0]), None);
    }

    #[test]
    fn test_mean_is_order_independent() {
        let a = circular_mean(&[340.0, 20.0, 5.0, 355.0]).unwrap();
        let b = circular_mean(&[5.0, 355.0, 20.0, 340.0]).unwrap();
        assert!(angular_distance(a, b) < 1e-9);
    }

    #[test]
    fn test_compass_boundaries() {
        assert_eq!(degree_to_compass(0.0), CompassPoint::N);
        assert_eq!(degree_to_compass(359.0), CompassPoint::N);
        assert_eq!(degree_to_compass(360.0), CompassPoint::N);
        assert_eq!(degree_to_compass(11.0), CompassPoint::N);
        assert_eq!(degree_to_compass(12.0), CompassPoint::Nne);
        assert_eq!(degree_to_compass(90.0), CompassPoint::E);
        assert_eq!(degree_to_compass(180.0), CompassPoint::S);
        assert_eq!(degree_to_compass(225.0), CompassPoint::Sw);
        assert_eq!(degree_to_compass(337.5), CompassPoint::Nnw);
        assert_eq!(degree_to_compass(-90.0), CompassPoint::W);
    }

    #[test]
    fn test_directional_summary() {
        let summary = DirectionalSummary::from_degrees(&[350.0, 10.0, f64::NAN]).unwrap();
        assert_eq!(summary.compass, CompassPoint::N);
        assert_eq!(summary.sample_count, 2);
        assert_eq!(CompassPoint::Sw.as_str(), "SW");
        assert_eq!(CompassPoint::E.bearing(), 90.0);
    }
}
