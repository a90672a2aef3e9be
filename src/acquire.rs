//! Source acquisition boundary
//!
//! The engine never performs I/O itself. Callers inject a [`SourceFetcher`]
//! that returns raw payload text for a [`SourceRequest`]; [`gather`] runs the
//! fetch futures concurrently with `join_all`, decodes each payload with its
//! adapter and merges the results. A source that fails to fetch or decode becomes `None`
//! and the remaining sources still flow through.

use crate::adapters::{
    AirQualityAdapter, ArchiveAdapter, ForecastAdapter, SourceData, SourcePayloadAdapter,
};
use crate::config::EngineConfig;
use crate::error::ComputeError;
use crate::history::ArchiveRequest;
use crate::types::{Feature, Location};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Upstream data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Forecast,
    AirQuality,
    Archive,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        self.adapter().name()
    }

    /// Adapter that decodes this source's payloads
    pub fn adapter(&self) -> &'static dyn SourcePayloadAdapter {
        match self {
            SourceKind::Forecast => &ForecastAdapter,
            SourceKind::AirQuality => &AirQualityAdapter,
            SourceKind::Archive => &ArchiveAdapter,
        }
    }
}

/// One fetch to perform: which source, where, and which local dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRequest {
    pub kind: SourceKind,
    pub location: Location,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SourceRequest {
    /// Forecast covering `days` days plus the trailing day the night window needs
    pub fn forecast(location: &Location, start: NaiveDate, days: usize) -> Self {
        Self {
            kind: SourceKind::Forecast,
            location: location.clone(),
            start,
            end: start + Duration::days(days as i64),
        }
    }

    pub fn air_quality(location: &Location, start: NaiveDate, days: usize) -> Self {
        Self {
            kind: SourceKind::AirQuality,
            ..Self::forecast(location, start, days)
        }
    }

    /// The single bulk archive request for a target date
    pub fn archive(location: &Location, target: NaiveDate, years: u32) -> Option<Self> {
        let span = ArchiveRequest::for_date(target, years)?;
        Some(Self {
            kind: SourceKind::Archive,
            location: location.clone(),
            start: span.start,
            end: span.end,
        })
    }
}

/// Requests needed to compute one feature starting at `start`
pub fn requests_for(feature: Feature, config: &EngineConfig, start: NaiveDate) -> Vec<SourceRequest> {
    let location = &config.location;
    let horizons = &config.horizons;
    match feature {
        Feature::Gardening => vec![SourceRequest::forecast(location, start, horizons.gardening)],
        Feature::Energy => vec![SourceRequest::forecast(location, start, horizons.energy)],
        Feature::Wind => vec![SourceRequest::forecast(location, start, horizons.wind)],
        Feature::Photography => vec![
            SourceRequest::forecast(location, start, horizons.photography),
            SourceRequest::air_quality(location, start, horizons.photography),
        ],
        Feature::History => SourceRequest::archive(location, start, config.history_years)
            .into_iter()
            .collect(),
    }
}

/// Capability to retrieve raw source payloads.
///
/// Implementations own transport, timeouts and retry policy.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, request: &SourceRequest) -> Result<String, ComputeError>;
}

/// Decoded sources available to the pipeline; `None` means unavailable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInputs {
    pub forecast: Option<SourceData>,
    pub air_quality: Option<SourceData>,
    pub archive: Option<SourceData>,
    /// Current planetary Kp-index, if known
    pub kp_index: Option<f64>,
}

impl SourceInputs {
    /// Decode already-fetched payloads; undecodable ones become `None`
    pub fn from_json(
        forecast: Option<&str>,
        air_quality: Option<&str>,
        archive: Option<&str>,
    ) -> Self {
        Self {
            forecast: forecast.and_then(|raw| decode(SourceKind::Forecast, raw)),
            air_quality: air_quality.and_then(|raw| decode(SourceKind::AirQuality, raw)),
            archive: archive.and_then(|raw| decode(SourceKind::Archive, raw)),
            kp_index: None,
        }
    }

    pub fn with_kp_index(mut self, kp_index: Option<f64>) -> Self {
        self.kp_index = kp_index;
        self
    }

    pub fn get(&self, kind: SourceKind) -> Option<&SourceData> {
        match kind {
            SourceKind::Forecast => self.forecast.as_ref(),
            SourceKind::AirQuality => self.air_quality.as_ref(),
            SourceKind::Archive => self.archive.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: SourceKind) -> &mut Option<SourceData> {
        match kind {
            SourceKind::Forecast => &mut self.forecast,
            SourceKind::AirQuality => &mut self.air_quality,
            SourceKind::Archive => &mut self.archive,
        }
    }

    /// Add decoded data for a source, merging with data already present
    pub fn insert(&mut self, kind: SourceKind, data: SourceData) {
        let slot = self.slot_mut(kind);
        if let Some(existing) = slot.as_mut() {
            existing.merge(data);
        } else {
            *slot = Some(data);
        }
    }
}

/// Fetch and decode every request concurrently, tolerating failures
pub async fn gather(fetcher: &dyn SourceFetcher, requests: &[SourceRequest]) -> SourceInputs {
    let fetches = requests.iter().map(|request| async move {
        (request.kind, fetch_and_decode(fetcher, request).await)
    });

    let mut inputs = SourceInputs::default();
    for (kind, data) in join_all(fetches).await {
        if let Some(data) = data {
            inputs.insert(kind, data);
        }
    }
    inputs
}

async fn fetch_and_decode(fetcher: &dyn SourceFetcher, request: &SourceRequest) -> Option<SourceData> {
    let kind = request.kind;
    match fetcher.fetch(request).await {
        Ok(raw) => decode(kind, &raw),
        Err(e) => {
            warn!("Source '{}' unavailable: {}", kind.as_str(), e);
            None
        }
    }
}

fn decode(kind: SourceKind, raw: &str) -> Option<SourceData> {
    match kind.adapter().parse(raw) {
        Ok(data) => {
            debug!(
                "Decoded '{}': {} samples, {} daily rows, {} archive rows",
                kind.as_str(),
                data.samples.len(),
                data.daily.len(),
                data.archive.len()
            );
            Some(data)
        }
        Err(e) => {
            warn!("Dropping undecodable '{}' payload: {}", kind.as_str(), e);
            None
        }
    }
}
