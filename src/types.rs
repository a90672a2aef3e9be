//! Core types for the Daycast pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw samples, per-day summaries, time windows and the feature
//! outputs handed to the (external) writing step.

use crate::bucketer::parse_minute;
use crate::direction::CompassPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minutes in one calendar day
pub const MINUTES_PER_DAY: u16 = 1440;

/// Measured environmental variable tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    AirTemperature,
    ApparentTemperature,
    RelativeHumidity,
    Pressure,
    CloudCover,
    Visibility,
    AerosolOpticalDepth,
    WindDirection,
    WindSpeed,
    Precipitation,
    PrecipitationProbability,
    SoilTemperature,
    SoilMoisture,
    UvIndex,
}

impl Variable {
    /// Number of tracked variables
    pub const COUNT: usize = 14;

    /// All variables in accumulator order
    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::AirTemperature,
        Variable::ApparentTemperature,
        Variable::RelativeHumidity,
        Variable::Pressure,
        Variable::CloudCover,
        Variable::Visibility,
        Variable::AerosolOpticalDepth,
        Variable::WindDirection,
        Variable::WindSpeed,
        Variable::Precipitation,
        Variable::PrecipitationProbability,
        Variable::SoilTemperature,
        Variable::SoilMoisture,
        Variable::UvIndex,
    ];

    /// Slot of this variable in fixed-shape accumulators
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::AirTemperature => "air_temperature",
            Variable::ApparentTemperature => "apparent_temperature",
            Variable::RelativeHumidity => "relative_humidity",
            Variable::Pressure => "pressure",
            Variable::CloudCover => "cloud_cover",
            Variable::Visibility => "visibility",
            Variable::AerosolOpticalDepth => "aerosol_optical_depth",
            Variable::WindDirection => "wind_direction",
            Variable::WindSpeed => "wind_speed",
            Variable::Precipitation => "precipitation",
            Variable::PrecipitationProbability => "precipitation_probability",
            Variable::SoilTemperature => "soil_temperature",
            Variable::SoilMoisture => "soil_moisture",
            Variable::UvIndex => "uv_index",
        }
    }
}

/// One raw observation from a source series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// ISO-8601 timestamp as delivered by the source
    pub timestamp: String,
    /// Variable this value measures
    pub variable: Variable,
    /// Observed value, if the source had one
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: impl Into<String>, variable: Variable, value: Option<f64>) -> Self {
        Self {
            timestamp: timestamp.into(),
            variable,
            value,
        }
    }
}

/// Authoritative pre-aggregated values for one day from a daily series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: Option<NaiveDate>,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub apparent_temp_max: Option<f64>,
    pub apparent_temp_min: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub wind_direction_dominant: Option<f64>,
    /// Raw sunrise timestamp or `HH:MM` time
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl DailyRecord {
    /// Sunrise as local minute-of-day at `utc_offset_minutes`
    pub fn sunrise_minute(&self, utc_offset_minutes: i32) -> Option<u16> {
        self.sunrise
            .as_deref()
            .and_then(|raw| parse_minute(raw, utc_offset_minutes))
    }

    /// Sunset as local minute-of-day at `utc_offset_minutes`
    pub fn sunset_minute(&self, utc_offset_minutes: i32) -> Option<u16> {
        self.sunset
            .as_deref()
            .and_then(|raw| parse_minute(raw, utc_offset_minutes))
    }
}

/// Aggregated statistics for one calendar day across tracked variables.
///
/// Every statistic is either a finite number or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub temp_avg: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub apparent_temp_avg: Option<f64>,
    pub apparent_temp_min: Option<f64>,
    pub apparent_temp_max: Option<f64>,
    pub humidity_avg: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub pressure_avg: Option<f64>,
    pub pressure_min: Option<f64>,
    pub pressure_max: Option<f64>,
    /// Change of average pressure against the previous day (hPa)
    pub pressure_trend: Option<f64>,
    pub cloud_cover_avg: Option<f64>,
    pub visibility_avg: Option<f64>,
    pub aod_avg: Option<f64>,
    pub wind_speed_avg: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub wind_direction_avg: Option<f64>,
    pub wind_compass: Option<CompassPoint>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub soil_temp_avg: Option<f64>,
    pub soil_temp_min: Option<f64>,
    pub soil_temp_max: Option<f64>,
    pub soil_moisture_avg: Option<f64>,
    pub soil_moisture_min: Option<f64>,
    pub soil_moisture_max: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub sunrise_minute: Option<u16>,
    pub sunset_minute: Option<u16>,
}

impl DaySummary {
    /// Summary with every statistic unavailable
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            temp_avg: None,
            temp_min: None,
            temp_max: None,
            apparent_temp_avg: None,
            apparent_temp_min: None,
            apparent_temp_max: None,
            humidity_avg: None,
            humidity_min: None,
            humidity_max: None,
            pressure_avg: None,
            pressure_min: None,
            pressure_max: None,
            pressure_trend: None,
            cloud_cover_avg: None,
            visibility_avg: None,
            aod_avg: None,
            wind_speed_avg: None,
            wind_speed_max: None,
            wind_direction_avg: None,
            wind_compass: None,
            precipitation_sum: None,
            precipitation_probability_max: None,
            soil_temp_avg: None,
            soil_temp_min: None,
            soil_temp_max: None,
            soil_moisture_avg: None,
            soil_moisture_min: None,
            soil_moisture_max: None,
            uv_index_max: None,
            sunrise_minute: None,
            sunset_minute: None,
        }
    }

    /// `YYYY-MM-DD` key of this summary
    pub fn day_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Best available apparent temperature for the day.
    ///
    /// Falls back from the hourly average to the midpoint of the daily
    /// apparent extremes, then to the air temperature average.
    pub fn apparent_temperature(&self) -> Option<f64> {
        self.apparent_temp_avg
            .or(match (self.apparent_temp_max, self.apparent_temp_min) {
                (Some(max), Some(min)) => Some((max + min) / 2.0),
                _ => None,
            })
            .or(self.temp_avg)
    }
}

/// Minute-of-day window with optionally unknown endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<u16>,
    pub end: Option<u16>,
}

/// Which source supplied sunrise/sunset for a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunSource {
    Forecast,
    Astronomical,
    Unavailable,
}

/// Geographic location and local clock of an aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, carried for provenance
    pub timezone: String,
    /// Offset of local time from UTC in minutes
    pub utc_offset_minutes: i32,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            timezone: "UTC".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

/// Derived-indicator feature produced by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Gardening,
    Energy,
    Photography,
    Wind,
    History,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Gardening => "gardening",
            Feature::Energy => "energy",
            Feature::Photography => "photography",
            Feature::Wind => "wind",
            Feature::History => "history",
        }
    }
}

/// Format a minute-of-day as `HH:MM`
pub fn format_minute(minute: u16) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_index_matches_all_order() {
        for (i, variable) in Variable::ALL.iter().enumerate() {
            assert_eq!(variable.index(), i);
        }
    }

    #[test]
    fn test_apparent_temperature_fallbacks() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut summary = DaySummary::empty(date);
        assert_eq!(summary.apparent_temperature(), None);

        summary.temp_avg = Some(18.0);
        assert_eq!(summary.apparent_temperature(), Some(18.0));

        summary.apparent_temp_max = Some(24.0);
        summary.apparent_temp_min = Some(14.0);
        assert_eq!(summary.apparent_temperature(), Some(19.0));

        summary.apparent_temp_avg = Some(21.5);
        assert_eq!(summary.apparent_temperature(), Some(21.5));
    }

    #[test]
    fn test_format_minute() {
        assert_eq!(format_minute(0), "00:00");
        assert_eq!(format_minute(1380), "23:00");
        assert_eq!(format_minute(1439), "23:59");
    }

    #[test]
    fn test_day_key() {
        let summary = DaySummary::empty(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(summary.day_key(), "2024-01-05");
    }
}
