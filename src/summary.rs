//! Day summaries
//!
//! Reduces each day's bucket into a [`DaySummary`] and overlays the source's
//! own daily series. Where both exist, the daily series is authoritative and
//! bucket-derived statistics are the fallback.

use crate::bucketer::{DayBucket, DayBuckets};
use crate::direction::{circular_mean, degree_to_compass, normalize_degrees};
use crate::stats::{average, max, min, sum};
use crate::types::{DailyRecord, DaySummary, Variable};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Build one summary per day of the horizon starting at `start`.
///
/// Days without any data still get a summary with every field `None`, so
/// the output always has the requested shape. Daily sun times are resolved
/// at `utc_offset_minutes`, the same offset the buckets were built with.
pub fn summarize_days(
    buckets: &DayBuckets,
    daily: &[DailyRecord],
    start: NaiveDate,
    days: usize,
    utc_offset_minutes: i32,
) -> Vec<DaySummary> {
    let by_date: HashMap<NaiveDate, &DailyRecord> = daily
        .iter()
        .filter_map(|record| record.date.map(|date| (date, record)))
        .collect();

    let mut summaries = Vec::with_capacity(days);
    let mut previous_pressure: Option<f64> = None;

    for offset in 0..days {
        let date = start + Duration::days(offset as i64);
        let mut summary = summarize_day(
            date,
            buckets.get(date),
            by_date.get(&date).copied(),
            utc_offset_minutes,
        );
        summary.pressure_trend = if offset == 0 {
            None
        } else {
            pressure_trend(previous_pressure, summary.pressure_avg)
        };
        previous_pressure = summary.pressure_avg;
        summaries.push(summary);
    }

    summaries
}

/// Summarize one day from its bucket and daily record (either may be absent)
pub fn summarize_day(
    date: NaiveDate,
    bucket: Option<&DayBucket>,
    daily: Option<&DailyRecord>,
    utc_offset_minutes: i32,
) -> DaySummary {
    let values = |variable: Variable| -> Vec<f64> {
        bucket.map(|b| b.values(variable)).unwrap_or_default()
    };
    let from_daily = |field: fn(&DailyRecord) -> Option<f64>| daily.and_then(field);

    let temps = values(Variable::AirTemperature);
    let apparent = values(Variable::ApparentTemperature);
    let humidity = values(Variable::RelativeHumidity);
    let pressure = values(Variable::Pressure);
    let wind_speed = values(Variable::WindSpeed);
    let soil_temp = values(Variable::SoilTemperature);
    let soil_moisture = values(Variable::SoilMoisture);

    let wind_direction_avg = from_daily(|d| d.wind_direction_dominant)
        .map(normalize_degrees)
        .or_else(|| circular_mean(&values(Variable::WindDirection)));

    let precipitation_sum = from_daily(|d| d.precipitation_sum).or_else(|| {
        bucket
            .filter(|b| b.has(Variable::Precipitation))
            .map(|b| sum(&b.values(Variable::Precipitation)))
    });

    DaySummary {
        date,
        temp_avg: average(&temps),
        temp_min: from_daily(|d| d.temp_min).or_else(|| min(&temps)),
        temp_max: from_daily(|d| d.temp_max).or_else(|| max(&temps)),
        apparent_temp_avg: average(&apparent),
        apparent_temp_min: from_daily(|d| d.apparent_temp_min).or_else(|| min(&apparent)),
        apparent_temp_max: from_daily(|d| d.apparent_temp_max).or_else(|| max(&apparent)),
        humidity_avg: average(&humidity),
        humidity_min: min(&humidity),
        humidity_max: max(&humidity),
        pressure_avg: average(&pressure),
        pressure_min: min(&pressure),
        pressure_max: max(&pressure),
        pressure_trend: None,
        cloud_cover_avg: average(&values(Variable::CloudCover)),
        visibility_avg: average(&values(Variable::Visibility)),
        aod_avg: average(&values(Variable::AerosolOpticalDepth)),
        wind_speed_avg: average(&wind_speed),
        wind_speed_max: max(&wind_speed),
        wind_direction_avg,
        wind_compass: wind_direction_avg.map(degree_to_compass),
        precipitation_sum,
        precipitation_probability_max: from_daily(|d| d.precipitation_probability_max)
            .or_else(|| max(&values(Variable::PrecipitationProbability))),
        soil_temp_avg: average(&soil_temp),
        soil_temp_min: min(&soil_temp),
        soil_temp_max: max(&soil_temp),
        soil_moisture_avg: average(&soil_moisture),
        soil_moisture_min: min(&soil_moisture),
        soil_moisture_max: max(&soil_moisture),
        uv_index_max: from_daily(|d| d.uv_index_max)
            .or_else(|| max(&values(Variable::UvIndex))),
        sunrise_minute: daily.and_then(|d| d.sunrise_minute(utc_offset_minutes)),
        sunset_minute: daily.and_then(|d| d.sunset_minute(utc_offset_minutes)),
    }
}

/// Day-over-day change in average pressure
pub fn pressure_trend(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(curr)) => Some(curr - prev),
        _ => None,
    }
}
