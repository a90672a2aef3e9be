//! Source payload adapters
//!
//! This module provides adapters that decode already-fetched source JSON and
//! map it to the engine's structured inputs. Sources deliver series as
//! parallel arrays (`time[i]` pairs with `variable[i]`) of possibly unequal
//! length; adapters zip them into per-timestamp [`Sample`]s once, here, so
//! the core never indexes parallel arrays.
//!
//! Sources also rename fields between endpoints and model versions. Each
//! variable declares a priority list of field names, resolved in one place by
//! [`RawSeries::resolve`].

mod open_meteo;

pub use open_meteo::{AirQualityAdapter, ArchiveAdapter, ForecastAdapter};

use crate::error::ComputeError;
use crate::history::HistoricalArchiveEntry;
use crate::types::{DailyRecord, Sample, Variable};
use serde_json::Value;
use std::collections::HashMap;

/// Trait for source payload adapters
pub trait SourcePayloadAdapter {
    /// Short source name used in logs
    fn name(&self) -> &'static str;

    /// Parse raw JSON into structured source data
    fn parse(&self, raw_json: &str) -> Result<SourceData, ComputeError>;
}

/// Structured data decoded from one source payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceData {
    /// Hourly observations, one sample per timestamp and variable
    pub samples: Vec<Sample>,
    /// Authoritative daily records in source order
    pub daily: Vec<DailyRecord>,
    /// Flattened historical archive entries in source order
    pub archive: Vec<HistoricalArchiveEntry>,
    /// Local UTC offset declared by the source, if any
    pub utc_offset_minutes: Option<i32>,
}

impl SourceData {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.daily.is_empty() && self.archive.is_empty()
    }

    /// Append another source's data
    pub fn merge(&mut self, other: SourceData) {
        self.samples.extend(other.samples);
        self.daily.extend(other.daily);
        self.archive.extend(other.archive);
        if self.utc_offset_minutes.is_none() {
            self.utc_offset_minutes = other.utc_offset_minutes;
        }
    }
}

/// One block of parallel arrays keyed by a `time` column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    pub time: Vec<String>,
    numeric: HashMap<String, Vec<Option<f64>>>,
    text: HashMap<String, Vec<Option<String>>>,
}

impl RawSeries {
    /// Decode a JSON object of parallel arrays.
    ///
    /// Non-numeric entries become `None` in numeric columns; keys whose value
    /// is not an array are ignored.
    pub fn from_value(block: &Value, block_name: &str) -> Result<Self, ComputeError> {
        let object = block.as_object().ok_or_else(|| {
            ComputeError::UnexpectedShape(format!("'{block_name}' is not an object"))
        })?;

        let time = object
            .get("time")
            .and_then(Value::as_array)
            .ok_or_else(|| ComputeError::MissingField(format!("{block_name}.time")))?
            .iter()
            .map(|t| t.as_str().unwrap_or_default().to_string())
            .collect();

        let mut numeric = HashMap::new();
        let mut text = HashMap::new();
        for (key, value) in object {
            if key == "time" {
                continue;
            }
            let Some(items) = value.as_array() else {
                continue;
            };
            numeric.insert(key.clone(), items.iter().map(Value::as_f64).collect());
            if items.iter().any(Value::is_string) {
                text.insert(
                    key.clone(),
                    items.iter().map(|v| v.as_str().map(str::to_string)).collect(),
                );
            }
        }

        Ok(Self {
            time,
            numeric,
            text,
        })
    }

    /// First numeric column present from a priority list of field names
    pub fn resolve(&self, priorities: &[&str]) -> Option<&[Option<f64>]> {
        priorities
            .iter()
            .find_map(|name| self.numeric.get(*name))
            .map(Vec::as_slice)
    }

    /// First text column present from a priority list of field names
    pub fn resolve_text(&self, priorities: &[&str]) -> Option<&[Option<String>]> {
        priorities
            .iter()
            .find_map(|name| self.text.get(*name))
            .map(Vec::as_slice)
    }

    /// Value at a row of a resolved column; missing positions are `None`
    pub fn value_at(&self, priorities: &[&str], row: usize) -> Option<f64> {
        self.resolve(priorities)
            .and_then(|col| col.get(row).copied().flatten())
            .filter(|v| v.is_finite())
    }

    pub fn text_at(&self, priorities: &[&str], row: usize) -> Option<&str> {
        self.resolve_text(priorities)
            .and_then(|col| col.get(row))
            .and_then(|v| v.as_deref())
    }

    /// Zip `time` with a variable's column into samples.
    ///
    /// Rows past the end of a shorter value column yield `None` samples; value
    /// entries past the end of `time` have no timestamp and are dropped.
    pub fn samples(&self, variable: Variable, priorities: &[&str]) -> Vec<Sample> {
        let Some(column) = self.resolve(priorities) else {
            return Vec::new();
        };
        self.time
            .iter()
            .enumerate()
            .map(|(i, t)| Sample::new(t.clone(), variable, column.get(i).copied().flatten()))
            .collect()
    }

    /// Zip every variable with a declared priority list
    pub fn all_samples(&self, fields: &[(Variable, &[&str])]) -> Vec<Sample> {
        fields
            .iter()
            .flat_map(|(variable, priorities)| self.samples(*variable, priorities))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_raw_series_zip_unequal_lengths() {
        let block = serde_json::json!({
            "time": ["2024-06-15T00:00", "2024-06-15T01:00", "2024-06-15T02:00"],
            "cloud_cover": [10, null],
            "visibility": [20000, 18000, 16000, 14000]
        });
        let series = RawSeries::from_value(&block, "hourly").unwrap();

        let clouds = series.samples(Variable::CloudCover, &["cloud_cover"]);
        assert_eq!(clouds.len(), 3);
        assert_eq!(clouds[0].value, Some(10.0));
        assert_eq!(clouds[1].value, None);
        assert_eq!(clouds[2].value, None);

        let vis = series.samples(Variable::Visibility, &["visibility"]);
        assert_eq!(vis.len(), 3);
        assert_eq!(vis[2].value, Some(16000.0));
    }

    #[test]
    fn test_resolve_uses_priority_order() {
        let block = serde_json::json!({
            "time": ["2024-06-15T00:00"],
            "soil_moisture_0_to_1cm": [0.30],
            "soil_moisture_3_to_9cm": [0.25]
        });
        let series = RawSeries::from_value(&block, "hourly").unwrap();
        let value = series.value_at(&["soil_moisture_3_to_9cm", "soil_moisture_0_to_1cm"], 0);
        assert_eq!(value, Some(0.25));

        let value = series.value_at(&["missing_field", "soil_moisture_0_to_1cm"], 0);
        assert_eq!(value, Some(0.30));
        assert_eq!(series.value_at(&["missing_field"], 0), None);
    }

    #[test]
    fn test_text_columns() {
        let block = serde_json::json!({
            "time": ["2024-06-15"],
            "sunrise": ["2024-06-15T05:12"]
        });
        let series = RawSeries::from_value(&block, "daily").unwrap();
        assert_eq!(series.text_at(&["sunrise"], 0), Some("2024-06-15T05:12"));
        assert_eq!(series.text_at(&["sunrise"], 1), None);
    }

    #[test]
    fn test_missing_time_is_error() {
        let block = serde_json::json!({ "cloud_cover": [1, 2] });
        assert!(matches!(
            RawSeries::from_value(&block, "hourly"),
            Err(ComputeError::MissingField(_))
        ));
        assert!(matches!(
            RawSeries::from_value(&serde_json::json!([1, 2]), "hourly"),
            Err(ComputeError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_source_data_merge() {
        let mut a = SourceData {
            samples: vec![Sample::new("2024-06-15T00:00", Variable::Pressure, Some(1010.0))],
            ..Default::default()
        };
        let b = SourceData {
            samples: vec![Sample::new("2024-06-15T00:00", Variable::AerosolOpticalDepth, Some(0.1))],
            utc_offset_minutes: Some(60),
            ..Default::default()
        };
        a.merge(b);
        assert_eq!(a.samples.len(), 2);
        assert_eq!(a.utc_offset_minutes, Some(60));
        assert!(!a.is_empty());
    }
}
