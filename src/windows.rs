//! Time-of-day windows
//!
//! Golden-hour windows hang off sunrise and sunset; the night-sky window is
//! fixed at 22:00 through 02:00 and therefore spans two calendar-day buckets.
//! Window statistics only see observations whose minute-of-day falls inside
//! the window bounds.

use crate::astronomy::{moon_phase, sun_times, MoonPhase};
use crate::bucketer::{DayBucket, DayBuckets};
use crate::stats::average;
use crate::types::{DaySummary, Location, SunSource, TimeWindow, Variable, MINUTES_PER_DAY};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Length of a golden-hour window in minutes
pub const GOLDEN_HOUR_MINUTES: u16 = 60;

/// Night-sky window start on day N (22:00)
pub const NIGHT_START_MINUTE: u16 = 22 * 60;

/// Night-sky window end on day N+1 (02:00)
pub const NIGHT_END_MINUTE: u16 = 2 * 60;

const LAST_MINUTE: u16 = MINUTES_PER_DAY - 1;

impl TimeWindow {
    /// Build a window, inferring a single missing endpoint as one golden hour
    /// away from the known one (clamped into the day).
    pub fn from_bounds(start: Option<u16>, end: Option<u16>) -> Self {
        match (start, end) {
            (Some(s), None) => Self {
                start: Some(s.min(LAST_MINUTE)),
                end: Some(s.saturating_add(GOLDEN_HOUR_MINUTES).min(LAST_MINUTE)),
            },
            (None, Some(e)) => Self {
                start: Some(e.min(LAST_MINUTE).saturating_sub(GOLDEN_HOUR_MINUTES)),
                end: Some(e.min(LAST_MINUTE)),
            },
            (start, end) => Self { start, end },
        }
    }

    /// `[sunrise, sunrise + 60]`
    pub fn morning(sunrise: Option<u16>) -> Self {
        Self::from_bounds(sunrise, None)
    }

    /// `[max(sunset - 60, 0), sunset]`
    pub fn evening(sunset: Option<u16>) -> Self {
        Self::from_bounds(None, sunset)
    }

    /// The fixed night window; `start > end` marks the midnight crossing
    pub fn night() -> Self {
        Self {
            start: Some(NIGHT_START_MINUTE),
            end: Some(NIGHT_END_MINUTE),
        }
    }

    pub fn is_known(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn crosses_midnight(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}

/// Mean sky conditions inside one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub cloud_cover: Option<f64>,
    pub visibility: Option<f64>,
    pub aerosol_optical_depth: Option<f64>,
}

/// Observations of the variables a window reports on
#[derive(Debug, Default)]
struct WindowSamples {
    cloud_cover: Vec<f64>,
    visibility: Vec<f64>,
    aerosol_optical_depth: Vec<f64>,
}

impl WindowSamples {
    fn collect(&mut self, bucket: &DayBucket, start: u16, end: u16) {
        self.cloud_cover
            .extend(bucket.values_between(Variable::CloudCover, start, end));
        self.visibility
            .extend(bucket.values_between(Variable::Visibility, start, end));
        self.aerosol_optical_depth
            .extend(bucket.values_between(Variable::AerosolOpticalDepth, start, end));
    }

    fn reduce(&self) -> WindowStats {
        WindowStats {
            cloud_cover: average(&self.cloud_cover),
            visibility: average(&self.visibility),
            aerosol_optical_depth: average(&self.aerosol_optical_depth),
        }
    }
}

/// Statistics for a same-day window; unknown windows yield all nulls
pub fn window_stats(bucket: Option<&DayBucket>, window: TimeWindow) -> WindowStats {
    let (Some(bucket), Some(start), Some(end)) = (bucket, window.start, window.end) else {
        return WindowStats::default();
    };
    let mut samples = WindowSamples::default();
    samples.collect(bucket, start, end);
    samples.reduce()
}

/// Statistics for the night of `date`: 22:00-23:59 of `date` stitched with
/// 00:00-02:00 of the following day (when that day was bucketed).
pub fn night_stats(buckets: &DayBuckets, date: NaiveDate) -> WindowStats {
    let mut samples = WindowSamples::default();
    if let Some(bucket) = buckets.get(date) {
        samples.collect(bucket, NIGHT_START_MINUTE, LAST_MINUTE);
    }
    if let Some(next) = buckets.following(date) {
        samples.collect(next, 0, NIGHT_END_MINUTE);
    }
    samples.reduce()
}

/// Sunrise and sunset for a day with their provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunEvents {
    pub sunrise_minute: Option<u16>,
    pub sunset_minute: Option<u16>,
    pub source: SunSource,
}

/// Prefer the forecast's sunrise/sunset, filling gaps from astronomy
pub fn resolve_sun(summary: &DaySummary, location: &Location) -> SunEvents {
    if let (Some(sunrise), Some(sunset)) = (summary.sunrise_minute, summary.sunset_minute) {
        return SunEvents {
            sunrise_minute: Some(sunrise),
            sunset_minute: Some(sunset),
            source: SunSource::Forecast,
        };
    }

    let computed = sun_times(summary.date, location);
    if computed.polar.is_some() {
        // Polar: keep whatever the forecast supplied
        if summary.sunrise_minute.is_some() || summary.sunset_minute.is_some() {
            return SunEvents {
                sunrise_minute: summary.sunrise_minute,
                sunset_minute: summary.sunset_minute,
                source: SunSource::Forecast,
            };
        }
        return SunEvents {
            sunrise_minute: None,
            sunset_minute: None,
            source: SunSource::Unavailable,
        };
    }

    SunEvents {
        sunrise_minute: summary.sunrise_minute.or(computed.sunrise_minute),
        sunset_minute: summary.sunset_minute.or(computed.sunset_minute),
        source: SunSource::Astronomical,
    }
}

/// Every shooting window of one day with its statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWindows {
    pub date: NaiveDate,
    pub sun: SunEvents,
    pub morning: TimeWindow,
    pub evening: TimeWindow,
    pub night: TimeWindow,
    pub morning_stats: WindowStats,
    pub evening_stats: WindowStats,
    pub night_stats: WindowStats,
    pub moon: MoonPhase,
}

/// Extract the windows for one summarized day
pub fn extract_windows(buckets: &DayBuckets, summary: &DaySummary, location: &Location) -> DayWindows {
    let date = summary.date;
    let sun = resolve_sun(summary, location);
    let morning = TimeWindow::morning(sun.sunrise_minute);
    let evening = TimeWindow::evening(sun.sunset_minute);
    let bucket = buckets.get(date);

    DayWindows {
        date,
        sun,
        morning,
        evening,
        night: TimeWindow::night(),
        morning_stats: window_stats(bucket, morning),
        evening_stats: window_stats(bucket, evening),
        night_stats: night_stats(buckets, date),
        moon: moon_phase(date),
    }
}
