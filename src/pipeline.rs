//! Pipeline orchestration
//!
//! This module provides the public API for Daycast. Each feature runs the
//! same stages over the decoded sources:
//!
//! 1. DayBucketer - Group samples into local calendar days
//! 2. summarize_days - Reduce buckets and daily series to DaySummary records
//! 3. Feature stage - Windows and/or a classifier per day
//! 4. ReportEncoder - Wrap the day-indexed output in a JSON envelope
//!
//! Missing sources never fail a run; they surface as `None` fields and
//! `Unknown` verdicts.

use crate::acquire::{gather, requests_for, SourceFetcher, SourceInputs};
use crate::bucketer::{DayBucketer, DayBuckets};
use crate::classify::{
    EnergyClassifier, EnergyVerdict, GardeningClassifier, PhotographyClassifier,
    PhotographyVerdict, PlantingVerdict, WateringVerdict,
};
use crate::config::EngineConfig;
use crate::direction::{CompassPoint, DirectionalSummary};
use crate::encoder::{Report, ReportEncoder};
use crate::error::ComputeError;
use crate::history::{records_for_date, RecordResult};
use crate::stats::round_to;
use crate::summary::summarize_days;
use crate::types::{format_minute, DaySummary, Feature, Location, SunSource, Variable};
use crate::windows::{extract_windows, DayWindows};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Day-indexed output of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureForecast<T> {
    pub feature: Feature,
    pub location: Location,
    pub start: NaiveDate,
    pub days: Vec<T>,
}

impl<T: Serialize> Report for FeatureForecast<T> {
    fn feature(&self) -> Feature {
        self.feature
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardeningDay {
    pub date: NaiveDate,
    pub soil_temp_avg: Option<f64>,
    pub soil_temp_min: Option<f64>,
    pub soil_temp_max: Option<f64>,
    pub soil_moisture_avg: Option<f64>,
    pub precipitation_sum: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub planting: PlantingVerdict,
    pub watering: WateringVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDay {
    pub date: NaiveDate,
    pub apparent_temperature: Option<f64>,
    pub humidity_avg: Option<f64>,
    pub pressure_avg: Option<f64>,
    pub pressure_trend: Option<f64>,
    pub uv_index_max: Option<f64>,
    pub energy: EnergyVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotographyDay {
    pub date: NaiveDate,
    /// Local sunrise as `HH:MM`
    pub sunrise: Option<String>,
    /// Local sunset as `HH:MM`
    pub sunset: Option<String>,
    pub sun_source: SunSource,
    pub windows: DayWindows,
    pub ratings: PhotographyVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindDay {
    pub date: NaiveDate,
    /// Dominant direction; the daily series wins over the hourly mean
    pub direction_degrees: Option<f64>,
    pub compass: Option<CompassPoint>,
    /// Circular mean of the hourly directions alone
    pub hourly: Option<DirectionalSummary>,
    pub speed_avg: Option<f64>,
    pub speed_max: Option<f64>,
}

pub type GardeningForecast = FeatureForecast<GardeningDay>;
pub type EnergyForecast = FeatureForecast<EnergyDay>;
pub type PhotographyForecast = FeatureForecast<PhotographyDay>;
pub type WindForecast = FeatureForecast<WindDay>;

/// Record temperatures for one calendar day across the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalReport {
    pub location: Location,
    pub target: NaiveDate,
    pub years_requested: u32,
    pub records: RecordResult,
}

impl Report for HistoricalReport {
    fn feature(&self) -> Feature {
        Feature::History
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

/// Buckets and summaries shared by every forecast feature
struct Prepared {
    buckets: DayBuckets,
    summaries: Vec<DaySummary>,
}

fn prepare(inputs: &SourceInputs, config: &EngineConfig, start: NaiveDate, days: usize) -> Prepared {
    let offset = config.location.utc_offset_minutes;
    for source in [&inputs.forecast, &inputs.air_quality].into_iter().flatten() {
        if let Some(declared) = source.utc_offset_minutes.filter(|d| *d != offset) {
            warn!(
                "Source declares UTC offset {} min but configuration uses {} min",
                declared, offset
            );
        }
    }

    let samples = [&inputs.forecast, &inputs.air_quality]
        .into_iter()
        .flatten()
        .flat_map(|source| source.samples.iter());
    let buckets = DayBucketer::new(offset)
        .with_horizon(start, days)
        .bucket(samples);

    let daily = inputs
        .forecast
        .as_ref()
        .map(|f| f.daily.as_slice())
        .unwrap_or_default();
    let summaries = summarize_days(&buckets, daily, start, days, offset);

    Prepared { buckets, summaries }
}

fn rounded(value: Option<f64>, decimals: u32) -> Option<f64> {
    value.map(|v| round_to(v, decimals))
}

/// Planting and watering suitability per day.
///
/// # Arguments
/// * `inputs` - Decoded sources; only the forecast is read
/// * `config` - Location, offset and the gardening horizon
/// * `start` - First local day of the horizon
///
/// # Returns
/// One `GardeningDay` per horizon day. Days without soil data are `unknown`.
///
/// # Example
/// ```ignore
/// let inputs = SourceInputs::from_json(Some(forecast_json), None, None);
/// let config = EngineConfig::for_location(52.37, 4.89, "Europe/Amsterdam", 120);
/// let report = gardening_forecast(&inputs, &config, start);
/// assert_eq!(report.days.len(), config.horizons.gardening);
/// ```
pub fn gardening_forecast(
    inputs: &SourceInputs,
    config: &EngineConfig,
    start: NaiveDate,
) -> GardeningForecast {
    let prepared = prepare(inputs, config, start, config.horizons.gardening);

    let days: Vec<GardeningDay> = prepared
        .summaries
        .iter()
        .map(|s| {
            let verdict = GardeningClassifier::classify(s);
            GardeningDay {
                date: s.date,
                soil_temp_avg: rounded(s.soil_temp_avg, 1),
                soil_temp_min: rounded(s.soil_temp_min, 1),
                soil_temp_max: rounded(s.soil_temp_max, 1),
                soil_moisture_avg: rounded(s.soil_moisture_avg, 3),
                precipitation_sum: rounded(s.precipitation_sum, 1),
                precipitation_probability_max: s.precipitation_probability_max,
                planting: verdict.planting,
                watering: verdict.watering,
            }
        })
        .collect();

    info!("Gardening forecast computed for {} days from {}", days.len(), start);
    FeatureForecast {
        feature: Feature::Gardening,
        location: config.location.clone(),
        start,
        days,
    }
}

/// Biometeorological energy score per day.
///
/// # Arguments
/// * `inputs` - Decoded sources; only the forecast is read
/// * `config` - Location, energy weights and the energy horizon
/// * `start` - First local day of the horizon
///
/// # Returns
/// One `EnergyDay` per horizon day. The pressure trend of the first day is
/// always `None`.
///
/// # Example
/// ```ignore
/// let report = energy_forecast(&inputs, &config, start);
/// let label = report.days[0].energy.label;
/// ```
pub fn energy_forecast(
    inputs: &SourceInputs,
    config: &EngineConfig,
    start: NaiveDate,
) -> EnergyForecast {
    let prepared = prepare(inputs, config, start, config.horizons.energy);
    let classifier = EnergyClassifier::new(config.energy);

    let days: Vec<EnergyDay> = prepared
        .summaries
        .iter()
        .map(|s| {
            let mut energy = classifier.classify(s);
            energy.score = rounded(energy.score, 1);
            EnergyDay {
                date: s.date,
                apparent_temperature: rounded(s.apparent_temperature(), 1),
                humidity_avg: rounded(s.humidity_avg, 1),
                pressure_avg: rounded(s.pressure_avg, 1),
                pressure_trend: rounded(s.pressure_trend, 1),
                uv_index_max: s.uv_index_max,
                energy,
            }
        })
        .collect();

    info!("Energy forecast computed for {} days from {}", days.len(), start);
    FeatureForecast {
        feature: Feature::Energy,
        location: config.location.clone(),
        start,
        days,
    }
}

/// Golden-hour and night-sky windows with ratings per day.
///
/// # Arguments
/// * `inputs` - Decoded forecast and air-quality sources plus the Kp-index
/// * `config` - Location and the photography horizon
/// * `start` - First local day of the horizon
///
/// # Returns
/// One `PhotographyDay` per horizon day. Sun times come from the forecast,
/// then astronomy, and are `None` on polar days without forecast times.
///
/// # Example
/// ```ignore
/// let inputs = SourceInputs::from_json(Some(forecast_json), Some(air_json), None)
///     .with_kp_index(Some(5.0));
/// let report = photography_forecast(&inputs, &config, start);
/// println!("{:?}", report.days[0].ratings.night);
/// ```
pub fn photography_forecast(
    inputs: &SourceInputs,
    config: &EngineConfig,
    start: NaiveDate,
) -> PhotographyForecast {
    let prepared = prepare(inputs, config, start, config.horizons.photography);

    let days: Vec<PhotographyDay> = prepared
        .summaries
        .iter()
        .map(|s| {
            let windows = extract_windows(&prepared.buckets, s, &config.location);
            let ratings = PhotographyClassifier::classify(&windows, inputs.kp_index);
            PhotographyDay {
                date: s.date,
                sunrise: windows.sun.sunrise_minute.map(format_minute),
                sunset: windows.sun.sunset_minute.map(format_minute),
                sun_source: windows.sun.source,
                windows,
                ratings,
            }
        })
        .collect();

    info!("Photography forecast computed for {} days from {}", days.len(), start);
    FeatureForecast {
        feature: Feature::Photography,
        location: config.location.clone(),
        start,
        days,
    }
}

/// Dominant wind direction and speed per day.
///
/// # Arguments
/// * `inputs` - Decoded sources; only the forecast is read
/// * `config` - Location and the wind horizon
/// * `start` - First local day of the horizon
///
/// # Returns
/// One `WindDay` per horizon day with the circular-mean direction.
///
/// # Example
/// ```ignore
/// let report = wind_forecast(&inputs, &config, start);
/// let compass = report.days[0].compass;
/// ```
pub fn wind_forecast(inputs: &SourceInputs, config: &EngineConfig, start: NaiveDate) -> WindForecast {
    let prepared = prepare(inputs, config, start, config.horizons.wind);

    let days: Vec<WindDay> = prepared
        .summaries
        .iter()
        .map(|s| {
            let hourly = prepared
                .buckets
                .get(s.date)
                .and_then(|b| DirectionalSummary::from_degrees(&b.values(Variable::WindDirection)));
            WindDay {
                date: s.date,
                direction_degrees: rounded(s.wind_direction_avg, 0),
                compass: s.wind_compass,
                hourly,
                speed_avg: rounded(s.wind_speed_avg, 1),
                speed_max: rounded(s.wind_speed_max, 1),
            }
        })
        .collect();

    info!("Wind forecast computed for {} days from {}", days.len(), start);
    FeatureForecast {
        feature: Feature::Wind,
        location: config.location.clone(),
        start,
        days,
    }
}

/// Warmest and coldest archive years for the target's month and day.
///
/// # Arguments
/// * `inputs` - Decoded sources; only the archive is read
/// * `config` - Location and the number of archive years requested
/// * `target` - Date whose month and day are looked up; its year is ignored
///
/// # Returns
/// A `HistoricalReport` whose `records` is `NoData` when no archive year
/// has both temperatures for that day.
///
/// # Example
/// ```ignore
/// let inputs = SourceInputs::from_json(None, None, Some(archive_json));
/// let report = historical_records(&inputs, &config, target);
/// if let RecordResult::Records { warmest, .. } = report.records {
///     println!("record high {} in {}", warmest.temp_max, warmest.year);
/// }
/// ```
pub fn historical_records(
    inputs: &SourceInputs,
    config: &EngineConfig,
    target: NaiveDate,
) -> HistoricalReport {
    let archive = inputs
        .archive
        .as_ref()
        .map(|a| a.archive.as_slice())
        .unwrap_or_default();
    let records = records_for_date(archive, target);

    info!(
        "Historical records for {} computed from {} archive entries",
        target.format("%m-%d"),
        archive.len()
    );
    HistoricalReport {
        location: config.location.clone(),
        target,
        years_requested: config.history_years,
        records,
    }
}

/// Parse a `YYYY-MM-DD` start date
pub fn parse_date(raw: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ComputeError::DateParseError(format!("'{raw}': {e}")))
}

/// Configured processor producing encoded feature reports.
///
/// Use this when the same configuration and producer identity serve many
/// runs.
pub struct DaycastProcessor {
    config: EngineConfig,
    encoder: ReportEncoder,
}

impl DaycastProcessor {
    /// Create a processor after validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Load configuration from JSON
    pub fn from_config_json(json: &str) -> Result<Self, ComputeError> {
        Self::new(EngineConfig::from_json(json)?)
    }

    pub fn with_encoder(mut self, encoder: ReportEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Save configuration to JSON
    pub fn save_config(&self) -> Result<String, ComputeError> {
        self.config
            .to_json()
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Compute one feature from decoded sources and encode it
    pub fn report_json(
        &self,
        feature: Feature,
        inputs: &SourceInputs,
        start: NaiveDate,
    ) -> Result<String, ComputeError> {
        let config = &self.config;
        match feature {
            Feature::Gardening => self
                .encoder
                .encode_to_json(&gardening_forecast(inputs, config, start)),
            Feature::Energy => self
                .encoder
                .encode_to_json(&energy_forecast(inputs, config, start)),
            Feature::Photography => self
                .encoder
                .encode_to_json(&photography_forecast(inputs, config, start)),
            Feature::Wind => self
                .encoder
                .encode_to_json(&wind_forecast(inputs, config, start)),
            Feature::History => self
                .encoder
                .encode_to_json(&historical_records(inputs, config, start)),
        }
    }

    /// Compute one feature from raw, already-fetched payloads.
    ///
    /// Payloads that fail to decode are treated as unavailable sources.
    pub fn report_from_payloads(
        &self,
        feature: Feature,
        forecast: Option<&str>,
        air_quality: Option<&str>,
        archive: Option<&str>,
        start: &str,
    ) -> Result<String, ComputeError> {
        let start = parse_date(start)?;
        let inputs = SourceInputs::from_json(forecast, air_quality, archive);
        self.report_json(feature, &inputs, start)
    }

    /// Fetch the sources a feature needs concurrently, then compute and encode it
    pub async fn fetch_and_report(
        &self,
        fetcher: &dyn SourceFetcher,
        feature: Feature,
        start: NaiveDate,
        kp_index: Option<f64>,
    ) -> Result<String, ComputeError> {
        let requests = requests_for(feature, &self.config, start);
        let inputs = gather(fetcher, &requests).await.with_kp_index(kp_index);
        self.report_json(feature, &inputs, start)
    }
}
