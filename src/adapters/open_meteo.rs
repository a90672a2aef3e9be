//! Open-Meteo style payload adapters
//!
//! Forecast, air-quality and historical-archive payloads all share one shape:
//! an object with optional `hourly` and `daily` blocks of parallel arrays and
//! an optional `utc_offset_seconds`.

use crate::bucketer::parse_timestamp;
use crate::error::ComputeError;
use crate::history::HistoricalArchiveEntry;
use crate::types::{DailyRecord, Variable};
use serde_json::Value;

use super::{RawSeries, SourceData, SourcePayloadAdapter};

/// Hourly field names per variable, most preferred first
const FORECAST_HOURLY_FIELDS: &[(Variable, &[&str])] = &[
    (Variable::AirTemperature, &["temperature_2m", "temperature"]),
    (Variable::ApparentTemperature, &["apparent_temperature"]),
    (
        Variable::RelativeHumidity,
        &["relative_humidity_2m", "relativehumidity_2m", "relative_humidity"],
    ),
    (Variable::Pressure, &["surface_pressure", "pressure_msl"]),
    (Variable::CloudCover, &["cloud_cover", "cloudcover"]),
    (Variable::Visibility, &["visibility"]),
    (Variable::WindDirection, &["wind_direction_10m", "winddirection_10m"]),
    (Variable::WindSpeed, &["wind_speed_10m", "windspeed_10m"]),
    (Variable::Precipitation, &["precipitation", "rain"]),
    (Variable::PrecipitationProbability, &["precipitation_probability"]),
    (
        Variable::SoilTemperature,
        &["soil_temperature_6cm", "soil_temperature_0cm", "soil_temperature_0_to_7cm"],
    ),
    (
        Variable::SoilMoisture,
        &[
            "soil_moisture_3_to_9cm",
            "soil_moisture_1_to_3cm",
            "soil_moisture_0_to_1cm",
            "soil_moisture_0_to_7cm",
        ],
    ),
    (Variable::UvIndex, &["uv_index"]),
];

const AIR_QUALITY_HOURLY_FIELDS: &[(Variable, &[&str])] = &[
    (Variable::AerosolOpticalDepth, &["aerosol_optical_depth", "aod"]),
    (Variable::UvIndex, &["uv_index"]),
];

const DAILY_TEMP_MAX: &[&str] = &["temperature_2m_max", "temperature_max"];
const DAILY_TEMP_MIN: &[&str] = &["temperature_2m_min", "temperature_min"];
const DAILY_APPARENT_MAX: &[&str] = &["apparent_temperature_max"];
const DAILY_APPARENT_MIN: &[&str] = &["apparent_temperature_min"];
const DAILY_PRECIP_SUM: &[&str] = &["precipitation_sum", "rain_sum"];
const DAILY_PRECIP_PROB: &[&str] = &["precipitation_probability_max"];
const DAILY_UV_MAX: &[&str] = &["uv_index_max"];
const DAILY_WIND_DIR: &[&str] = &["wind_direction_10m_dominant", "winddirection_10m_dominant"];
const DAILY_SUNRISE: &[&str] = &["sunrise"];
const DAILY_SUNSET: &[&str] = &["sunset"];

/// Forecast payload adapter (hourly + daily weather and soil series)
pub struct ForecastAdapter;

impl SourcePayloadAdapter for ForecastAdapter {
    fn name(&self) -> &'static str {
        "forecast"
    }

    fn parse(&self, raw_json: &str) -> Result<SourceData, ComputeError> {
        let payload = parse_payload(raw_json)?;
        let hourly = optional_block(&payload, "hourly")?;
        let daily = optional_block(&payload, "daily")?;
        if hourly.is_none() && daily.is_none() {
            return Err(ComputeError::UnexpectedShape(
                "forecast payload has neither 'hourly' nor 'daily'".to_string(),
            ));
        }

        Ok(SourceData {
            samples: hourly
                .map(|h| h.all_samples(FORECAST_HOURLY_FIELDS))
                .unwrap_or_default(),
            daily: daily.map(|d| daily_records(&d)).unwrap_or_default(),
            archive: Vec::new(),
            utc_offset_minutes: utc_offset_minutes(&payload),
        })
    }
}

/// Air-quality payload adapter (aerosol optical depth on the hourly grid)
pub struct AirQualityAdapter;

impl SourcePayloadAdapter for AirQualityAdapter {
    fn name(&self) -> &'static str {
        "air_quality"
    }

    fn parse(&self, raw_json: &str) -> Result<SourceData, ComputeError> {
        let payload = parse_payload(raw_json)?;
        let hourly = optional_block(&payload, "hourly")?.ok_or_else(|| {
            ComputeError::MissingField("hourly".to_string())
        })?;

        Ok(SourceData {
            samples: hourly.all_samples(AIR_QUALITY_HOURLY_FIELDS),
            utc_offset_minutes: utc_offset_minutes(&payload),
            ..Default::default()
        })
    }
}

/// Historical archive adapter (decades of daily max/min temperature)
pub struct ArchiveAdapter;

impl SourcePayloadAdapter for ArchiveAdapter {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn parse(&self, raw_json: &str) -> Result<SourceData, ComputeError> {
        let payload = parse_payload(raw_json)?;
        let daily = optional_block(&payload, "daily")?
            .ok_or_else(|| ComputeError::MissingField("daily".to_string()))?;

        let archive = daily
            .time
            .iter()
            .enumerate()
            .filter_map(|(row, time)| {
                let stamp = parse_timestamp(time, 0)?;
                Some(HistoricalArchiveEntry::new(
                    stamp.date,
                    daily.value_at(DAILY_TEMP_MAX, row),
                    daily.value_at(DAILY_TEMP_MIN, row),
                ))
            })
            .collect();

        Ok(SourceData {
            archive,
            utc_offset_minutes: utc_offset_minutes(&payload),
            ..Default::default()
        })
    }
}

fn parse_payload(raw_json: &str) -> Result<Value, ComputeError> {
    let payload: Value = serde_json::from_str(raw_json)?;
    if !payload.is_object() {
        return Err(ComputeError::UnexpectedShape(
            "payload is not a JSON object".to_string(),
        ));
    }
    Ok(payload)
}

fn optional_block(payload: &Value, name: &str) -> Result<Option<RawSeries>, ComputeError> {
    match payload.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(block) => RawSeries::from_value(block, name).map(Some),
    }
}

fn utc_offset_minutes(payload: &Value) -> Option<i32> {
    payload
        .get("utc_offset_seconds")
        .and_then(Value::as_i64)
        .map(|secs| (secs / 60) as i32)
}

fn daily_records(daily: &RawSeries) -> Vec<DailyRecord> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(row, time)| DailyRecord {
            date: parse_timestamp(time, 0).map(|s| s.date),
            temp_max: daily.value_at(DAILY_TEMP_MAX, row),
            temp_min: daily.value_at(DAILY_TEMP_MIN, row),
            apparent_temp_max: daily.value_at(DAILY_APPARENT_MAX, row),
            apparent_temp_min: daily.value_at(DAILY_APPARENT_MIN, row),
            precipitation_sum: daily.value_at(DAILY_PRECIP_SUM, row),
            precipitation_probability_max: daily.value_at(DAILY_PRECIP_PROB, row),
            uv_index_max: daily.value_at(DAILY_UV_MAX, row),
            wind_direction_dominant: daily.value_at(DAILY_WIND_DIR, row),
            sunrise: daily.text_at(DAILY_SUNRISE, row).map(str::to_string),
            sunset: daily.text_at(DAILY_SUNSET, row).map(str::to_string),
        })
        .collect()
}
