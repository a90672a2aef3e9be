//! Daycast - Temporal aggregation and derived-indicator engine
//!
//! Daycast turns raw hourly/daily environmental time series into per-day
//! summaries and domain indicators through a deterministic pipeline:
//! source adaptation → day bucketing → statistical reduction → windows and
//! classification → report encoding.
//!
//! ## Features
//!
//! - **Gardening**: planting and watering suitability from soil and rain
//! - **Energy**: biometeorological comfort score
//! - **Photography**: golden-hour and night-sky windows with ratings
//! - **Wind**: dominant direction via circular statistics
//! - **History**: record temperatures for one calendar day over decades

pub mod acquire;
pub mod adapters;
pub mod astronomy;
pub mod bucketer;
pub mod classify;
pub mod config;
pub mod direction;
pub mod encoder;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod stats;
pub mod summary;
pub mod types;
pub mod windows;

pub use acquire::{SourceFetcher, SourceInputs, SourceKind, SourceRequest};
pub use config::EngineConfig;
pub use encoder::ReportEncoder;
pub use error::ComputeError;
pub use pipeline::{
    energy_forecast, gardening_forecast, historical_records, photography_forecast,
    wind_forecast, DaycastProcessor,
};
pub use types::{DaySummary, Feature, Location, Sample, Variable};

/// Daycast version embedded in all reports
pub const DAYCAST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "daycast";
