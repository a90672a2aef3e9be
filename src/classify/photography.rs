//! Photography shooting-window ratings

use crate::windows::DayWindows;
use serde::{Deserialize, Serialize};

/// Quality of a shooting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShootingRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

/// Atmospheric transparency derived from aerosol optical depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transparency {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

/// Ratings for one day's windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotographyVerdict {
    pub golden_morning: ShootingRating,
    pub golden_evening: ShootingRating,
    pub night: ShootingRating,
    pub transparency: Transparency,
    /// Geomagnetic activity, passed through for aurora planning
    pub kp_index: Option<f64>,
    pub reason: String,
}

/// Golden hours favour broken cloud; a clear sky is good, overcast is poor.
pub fn golden_hour_rating(cloud_cover: Option<f64>) -> ShootingRating {
    match cloud_cover {
        None => ShootingRating::Unknown,
        Some(c) if (20.0..=60.0).contains(&c) => ShootingRating::Excellent,
        Some(c) if c < 20.0 => ShootingRating::Good,
        Some(c) if c <= 80.0 => ShootingRating::Fair,
        Some(_) => ShootingRating::Poor,
    }
}

pub fn transparency(aod: Option<f64>) -> Transparency {
    match aod {
        None => Transparency::Unknown,
        Some(a) if a < 0.1 => Transparency::Excellent,
        Some(a) if a < 0.2 => Transparency::Good,
        Some(a) if a < 0.4 => Transparency::Fair,
        Some(_) => Transparency::Poor,
    }
}

/// Night-sky rating from cloud, transparency and moonlight
pub fn night_rating(
    cloud_cover: Option<f64>,
    transparency: Transparency,
    moon_illumination: f64,
) -> ShootingRating {
    let Some(cloud) = cloud_cover else {
        return ShootingRating::Unknown;
    };
    if cloud < 20.0 && transparency != Transparency::Poor && moon_illumination < 0.5 {
        ShootingRating::Excellent
    } else if cloud < 40.0 {
        ShootingRating::Good
    } else if cloud < 70.0 {
        ShootingRating::Fair
    } else {
        ShootingRating::Poor
    }
}

pub struct PhotographyClassifier;

impl PhotographyClassifier {
    pub fn classify(windows: &DayWindows, kp_index: Option<f64>) -> PhotographyVerdict {
        let clarity = transparency(windows.night_stats.aerosol_optical_depth);
        let night = night_rating(
            windows.night_stats.cloud_cover,
            clarity,
            windows.moon.illumination,
        );

        let reason = match windows.night_stats.cloud_cover {
            Some(cloud) => format!(
                "night cloud {cloud:.0}%, moon {:.0}% lit",
                windows.moon.illumination * 100.0
            ),
            None => "no cloud data for the night window".to_string(),
        };

        PhotographyVerdict {
            golden_morning: golden_hour_rating(windows.morning_stats.cloud_cover),
            golden_evening: golden_hour_rating(windows.evening_stats.cloud_cover),
            night,
            transparency: clarity,
            kp_index: kp_index.filter(|kp| kp.is_finite()),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketer::DayBuckets;
    use crate::types::{DaySummary, Location};
    use crate::windows::{extract_windows, WindowStats};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_golden_hour_rating() {
        assert_eq!(golden_hour_rating(None), ShootingRating::Unknown);
        assert_eq!(golden_hour_rating(Some(10.0)), ShootingRating::Good);
        assert_eq!(golden_hour_rating(Some(20.0)), ShootingRating::Excellent);
        assert_eq!(golden_hour_rating(Some(60.0)), ShootingRating::Excellent);
        assert_eq!(golden_hour_rating(Some(75.0)), ShootingRating::Fair);
        assert_eq!(golden_hour_rating(Some(95.0)), ShootingRating::Poor);
    }

    #[test]
    fn test_transparency() {
        assert_eq!(transparency(Some(0.05)), Transparency::Excellent);
        assert_eq!(transparency(Some(0.15)), Transparency::Good);
        assert_eq!(transparency(Some(0.3)), Transparency::Fair);
        assert_eq!(transparency(Some(0.6)), Transparency::Poor);
        assert_eq!(transparency(None), Transparency::Unknown);
    }

    #[test]
    fn test_night_rating() {
        assert_eq!(
            night_rating(Some(5.0), Transparency::Good, 0.1),
            ShootingRating::Excellent
        );
        // A bright moon or hazy air knocks a clear night down a grade
        assert_eq!(night_rating(Some(5.0), Transparency::Good, 0.9), ShootingRating::Good);
        assert_eq!(night_rating(Some(5.0), Transparency::Poor, 0.1), ShootingRating::Good);
        assert_eq!(night_rating(Some(50.0), Transparency::Unknown, 0.1), ShootingRating::Fair);
        assert_eq!(night_rating(Some(90.0), Transparency::Excellent, 0.0), ShootingRating::Poor);
        assert_eq!(night_rating(None, Transparency::Excellent, 0.0), ShootingRating::Unknown);
    }

    #[test]
    fn test_no_weather_is_unknown() {
        let summary = DaySummary::empty(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let windows = extract_windows(&DayBuckets::default(), &summary, &Location::default());
        let verdict = PhotographyClassifier::classify(&windows, Some(3.0));

        assert_eq!(windows.night_stats, WindowStats::default());
        assert_eq!(verdict.golden_morning, ShootingRating::Unknown);
        assert_eq!(verdict.golden_evening, ShootingRating::Unknown);
        assert_eq!(verdict.night, ShootingRating::Unknown);
        assert_eq!(verdict.transparency, Transparency::Unknown);
        assert_eq!(verdict.kp_index, Some(3.0));
    }
}
