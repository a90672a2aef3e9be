//! Astronomical fallback
//!
//! Sunrise, sunset and moon phase derived from date and coordinates alone, so
//! shooting windows stay populated when no weather source answered.
//!
//! Sun times use the NOAA general solar position approximation (fractional
//! year, equation of time, declination) with the standard -0.833° horizon
//! for refraction and the solar disc. Moon phase uses the mean synodic month
//! from a reference new moon; it is accurate to within about half a day.

use crate::types::{Location, MINUTES_PER_DAY};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Zenith angle of the sun's centre at apparent sunrise/sunset
const SUNRISE_ZENITH_DEG: f64 = 90.833;

/// Mean length of a lunar cycle in days
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Sun never sets or never rises on this day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarCondition {
    MidnightSun,
    PolarNight,
}

/// Local sunrise and sunset for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise_minute: Option<u16>,
    pub sunset_minute: Option<u16>,
    pub polar: Option<PolarCondition>,
}

/// Named lunar phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

/// Moon age and illumination on one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    /// Days since the last new moon
    pub age_days: f64,
    /// Position in the cycle, 0 = new, 0.5 = full
    pub fraction: f64,
    /// Illuminated fraction of the disc (0-1)
    pub illumination: f64,
    pub name: MoonPhaseName,
}

/// Compute local sunrise/sunset for a date and location
pub fn sun_times(date: NaiveDate, location: &Location) -> SunTimes {
    let lat_rad = location.latitude.to_radians();
    let gamma = 2.0 * PI / days_in_year(date.year()) * (date.ordinal() as f64 - 1.0);

    let eq_time = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());

    let declination = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let cos_ha = SUNRISE_ZENITH_DEG.to_radians().cos() / (lat_rad.cos() * declination.cos())
        - lat_rad.tan() * declination.tan();

    if !cos_ha.is_finite() || cos_ha > 1.0 {
        return SunTimes {
            sunrise_minute: None,
            sunset_minute: None,
            polar: Some(PolarCondition::PolarNight),
        };
    }
    if cos_ha < -1.0 {
        return SunTimes {
            sunrise_minute: None,
            sunset_minute: None,
            polar: Some(PolarCondition::MidnightSun),
        };
    }

    let ha_deg = cos_ha.acos().to_degrees();
    let offset = location.utc_offset_minutes as f64;
    let sunrise_utc = 720.0 - 4.0 * (location.longitude + ha_deg) - eq_time;
    let sunset_utc = 720.0 - 4.0 * (location.longitude - ha_deg) - eq_time;

    SunTimes {
        sunrise_minute: Some(wrap_minute(sunrise_utc + offset)),
        sunset_minute: Some(wrap_minute(sunset_utc + offset)),
        polar: None,
    }
}

/// Compute the moon phase at local noon of a date
pub fn moon_phase(date: NaiveDate) -> MoonPhase {
    // 2000-01-06 18:14 UTC, a well-documented new moon
    let reference = NaiveDate::from_ymd_opt(2000, 1, 6)
        .and_then(|d| d.and_hms_opt(18, 14, 0))
        .unwrap_or_default();
    let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();

    let elapsed_days = (noon - reference).num_seconds() as f64 / 86_400.0;
    let age_days = elapsed_days.rem_euclid(SYNODIC_MONTH_DAYS);
    let fraction = age_days / SYNODIC_MONTH_DAYS;
    let illumination = (1.0 - (2.0 * PI * fraction).cos()) / 2.0;

    MoonPhase {
        age_days,
        fraction,
        illumination,
        name: phase_name(fraction),
    }
}

fn phase_name(fraction: f64) -> MoonPhaseName {
    // Eight equal arcs centred on the principal phases
    match ((fraction * 8.0).round() as usize) % 8 {
        0 => MoonPhaseName::NewMoon,
        1 => MoonPhaseName::WaxingCrescent,
        2 => MoonPhaseName::FirstQuarter,
        3 => MoonPhaseName::WaxingGibbous,
        4 => MoonPhaseName::FullMoon,
        5 => MoonPhaseName::WaningGibbous,
        6 => MoonPhaseName::LastQuarter,
        _ => MoonPhaseName::WaningCrescent,
    }
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

fn wrap_minute(minutes: f64) -> u16 {
    let day = MINUTES_PER_DAY as f64;
    (minutes.round().rem_euclid(day) as u16).min(MINUTES_PER_DAY - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(latitude: f64, longitude: f64, utc_offset_minutes: i32) -> Location {
        Location {
            latitude,
            longitude,
            timezone: "test".to_string(),
            utc_offset_minutes,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_equator_equinox_is_about_twelve_hours() {
        let times = sun_times(date(2024, 3, 20), &location(0.0, 0.0, 0));
        let sunrise = times.sunrise_minute.unwrap();
        let sunset = times.sunset_minute.unwrap();
        assert!((350..=375).contains(&sunrise), "sunrise {sunrise}");
        assert!((1075..=1100).contains(&sunset), "sunset {sunset}");
        assert_eq!(times.polar, None);
    }

    #[test]
    fn test_london_midsummer() {
        // Roughly 04:43 and 21:21 BST
        let times = sun_times(date(2024, 6, 21), &location(51.5074, -0.1278, 60));
        let sunrise = times.sunrise_minute.unwrap() as i32;
        let sunset = times.sunset_minute.unwrap() as i32;
        assert!((sunrise - 283).abs() <= 10, "sunrise {sunrise}");
        assert!((sunset - 1281).abs() <= 10, "sunset {sunset}");
    }

    #[test]
    fn test_polar_conditions() {
        let tromso = location(69.65, 18.96, 60);
        let summer = sun_times(date(2024, 6, 21), &tromso);
        assert_eq!(summer.polar, Some(PolarCondition::MidnightSun));
        assert_eq!(summer.sunrise_minute, None);

        let winter = sun_times(date(2024, 12, 21), &tromso);
        assert_eq!(winter.polar, Some(PolarCondition::PolarNight));
        assert_eq!(winter.sunset_minute, None);
    }

    #[test]
    fn test_moon_phase_new_and_full() {
        // New moon of the 2024-04-08 total solar eclipse
        let new = moon_phase(date(2024, 4, 8));
        assert!(new.illumination < 0.05, "illumination {}", new.illumination);
        assert_eq!(new.name, MoonPhaseName::NewMoon);

        // Full moon on 2024-04-23
        let full = moon_phase(date(2024, 4, 23));
        assert!(full.illumination > 0.95, "illumination {}", full.illumination);
        assert_eq!(full.name, MoonPhaseName::FullMoon);
    }

    #[test]
    fn test_moon_phase_before_reference() {
        let phase = moon_phase(date(1990, 1, 1));
        assert!((0.0..SYNODIC_MONTH_DAYS).contains(&phase.age_days));
        assert!((0.0..=1.0).contains(&phase.illumination));
    }
}
