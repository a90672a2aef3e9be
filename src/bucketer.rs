//! Day bucketing
//!
//! Groups timestamped samples from any number of sources into local
//! calendar-day buckets. Each bucket is a fixed-shape accumulator with one
//! slot per [`Variable`]; buckets are created lazily and never merged.
//!
//! Timestamp policy:
//! - Timestamps without an offset are taken as local wall-clock time; the
//!   date prefix is the day and `HH:MM` is the minute-of-day.
//! - Timestamps with an explicit offset (`Z`, `+02:00`) are shifted into the
//!   configured local offset first.
//! - A valid date prefix with an unparseable time keeps its day but has no
//!   minute-of-day, so it never contributes to time-of-day windows.
//! - Anything without a valid 10-character date prefix is dropped.

use crate::types::{Sample, Variable, MINUTES_PER_DAY};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use log::debug;
use std::collections::BTreeMap;

/// Naive timestamp layouts accepted as local wall-clock time
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// One finite value with its local minute-of-day, if known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub minute: Option<u16>,
    pub value: f64,
}

/// A sample timestamp resolved onto the local calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStamp {
    pub date: NaiveDate,
    pub minute: Option<u16>,
}

/// Raw values observed during one local calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    slots: Vec<Vec<Observation>>,
}

impl Default for DayBucket {
    fn default() -> Self {
        Self {
            slots: vec![Vec::new(); Variable::COUNT],
        }
    }
}

impl DayBucket {
    /// Record a value; non-finite values are ignored
    pub fn push(&mut self, variable: Variable, minute: Option<u16>, value: f64) {
        if value.is_finite() {
            self.slots[variable.index()].push(Observation { minute, value });
        }
    }

    pub fn observations(&self, variable: Variable) -> &[Observation] {
        &self.slots[variable.index()]
    }

    /// All values recorded for a variable
    pub fn values(&self, variable: Variable) -> Vec<f64> {
        self.observations(variable).iter().map(|o| o.value).collect()
    }

    /// Values whose minute-of-day lies within `[start, end]` (inclusive)
    pub fn values_between(&self, variable: Variable, start: u16, end: u16) -> Vec<f64> {
        self.observations(variable)
            .iter()
            .filter(|o| matches!(o.minute, Some(m) if m >= start && m <= end))
            .map(|o| o.value)
            .collect()
    }

    pub fn has(&self, variable: Variable) -> bool {
        !self.slots[variable.index()].is_empty()
    }

    /// Total number of stored values across variables
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered mapping from local calendar day to its bucket
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBuckets {
    days: BTreeMap<NaiveDate, DayBucket>,
}

impl DayBuckets {
    pub fn get(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.days.get(&date)
    }

    /// Bucket of the day after `date`, if one was created
    pub fn following(&self, date: NaiveDate) -> Option<&DayBucket> {
        date.succ_opt().and_then(|next| self.days.get(&next))
    }

    /// Days in natural order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayBucket)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Whether any bucket holds a value for the variable
    pub fn has_any(&self, variable: Variable) -> bool {
        self.days.values().any(|b| b.has(variable))
    }
}

/// Buckets samples into local calendar days
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBucketer {
    utc_offset_minutes: i32,
    horizon: Option<(NaiveDate, NaiveDate)>,
}

impl DayBucketer {
    /// Create a bucketer for the given local UTC offset
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self {
            utc_offset_minutes,
            horizon: None,
        }
    }

    /// Keep only `days` days starting at `start`, plus the day after them.
    ///
    /// The extra trailing day is what the night window stitches onto.
    pub fn with_horizon(mut self, start: NaiveDate, days: usize) -> Self {
        let last = start + Duration::days(days as i64);
        self.horizon = Some((start, last));
        self
    }

    /// Group samples into day buckets
    pub fn bucket<'a, I>(&self, samples: I) -> DayBuckets
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let mut buckets = DayBuckets::default();
        let mut dropped = 0usize;
        let mut skipped = 0usize;

        for sample in samples {
            let Some(stamp) = parse_timestamp(&sample.timestamp, self.utc_offset_minutes) else {
                dropped += 1;
                continue;
            };
            if let Some((first, last)) = self.horizon {
                if stamp.date < first || stamp.date > last {
                    continue;
                }
            }
            match sample.value {
                Some(value) if value.is_finite() => {
                    buckets
                        .days
                        .entry(stamp.date)
                        .or_default()
                        .push(sample.variable, stamp.minute, value);
                }
                _ => skipped += 1,
            }
        }

        debug!(
            "Bucketed samples into {} days ({} malformed timestamps dropped, {} empty values skipped)",
            buckets.len(),
            dropped,
            skipped
        );

        buckets
    }
}

/// Resolve a source timestamp onto the local calendar.
///
/// Returns `None` when the string has no valid `YYYY-MM-DD` prefix.
pub fn parse_timestamp(raw: &str, utc_offset_minutes: i32) -> Option<LocalStamp> {
    let raw = raw.trim();
    let prefix = raw.get(..10)?;
    let date_only = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;

    if let Some(zoned) = parse_zoned(raw) {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .or_else(|| FixedOffset::east_opt(0))?;
        let local = zoned.with_timezone(&offset);
        return Some(LocalStamp {
            date: local.date_naive(),
            minute: Some(minute_of_day(local.hour(), local.minute())),
        });
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(LocalStamp {
                date: naive.date(),
                minute: Some(minute_of_day(naive.hour(), naive.minute())),
            });
        }
    }

    Some(LocalStamp {
        date: date_only,
        minute: None,
    })
}

/// Parse a local `HH:MM` time-of-day or a full timestamp as minute-of-day.
///
/// Zoned timestamps are shifted to `utc_offset_minutes` first, as in
/// [`parse_timestamp`].
pub fn parse_minute(raw: &str, utc_offset_minutes: i32) -> Option<u16> {
    let raw = raw.trim();
    if let Some(stamp) = parse_timestamp(raw, utc_offset_minutes) {
        return stamp.minute;
    }
    let (hours, minutes) = raw.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.get(..2).unwrap_or(minutes).parse().ok()?;
    (hours < 24 && minutes < 60).then(|| minute_of_day(hours, minutes))
}

fn parse_zoned(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt);
    }
    // `2024-06-15T12:00Z` has no seconds, which RFC 3339 requires
    let without_z = raw.strip_suffix('Z')?;
    NaiveDateTime::parse_from_str(without_z, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

fn minute_of_day(hour: u32, minute: u32) -> u16 {
    ((hour * 60 + minute) as u16).min(MINUTES_PER_DAY - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_local_timestamp() {
        let stamp = parse_timestamp("2024-06-15T23:00", 120).unwrap();
        assert_eq!(stamp.date, date(2024, 6, 15));
        assert_eq!(stamp.minute, Some(1380));
    }

    #[test]
    fn test_parse_zoned_timestamp_shifts_day() {
        // 22:30 UTC is 00:30 the next day at UTC+2
        let stamp = parse_timestamp("2024-06-15T22:30:00Z", 120).unwrap();
        assert_eq!(stamp.date, date(2024, 6, 16));
        assert_eq!(stamp.minute, Some(30));

        let stamp = parse_timestamp("2024-06-15T22:30Z", 120).unwrap();
        assert_eq!(stamp.date, date(2024, 6, 16));

        let stamp = parse_timestamp("2024-06-15T01:00+02:00", 0).unwrap();
        assert_eq!(stamp.date, date(2024, 6, 14));
        assert_eq!(stamp.minute, Some(23 * 60));
    }

    #[test]
    fn test_parse_date_only_and_malformed() {
        let stamp = parse_timestamp("2024-06-15", 0).unwrap();
        assert_eq!(stamp.minute, None);

        let stamp = parse_timestamp("2024-06-15Tgarbage", 0).unwrap();
        assert_eq!(stamp.date, date(2024, 6, 15));
        assert_eq!(stamp.minute, None);

        assert_eq!(parse_timestamp("2024-06", 0), None);
        assert_eq!(parse_timestamp("not-a-date-at-all", 0), None);
        assert_eq!(parse_timestamp("2024-13-40T10:00", 0), None);
        assert_eq!(parse_timestamp("", 0), None);
    }

    #[test]
    fn test_parse_minute() {
        assert_eq!(parse_minute("2024-06-15T05:12", 120), Some(312));
        assert_eq!(parse_minute("21:47", 120), Some(1307));
        assert_eq!(parse_minute("25:00", 0), None);
        assert_eq!(parse_minute("nonsense", 0), None);
    }

    #[test]
    fn test_parse_minute_shifts_zoned_times() {
        assert_eq!(parse_minute("2024-06-15T05:18+02:00", 120), Some(318));
        assert_eq!(parse_minute("2024-06-15T03:18Z", 120), Some(318));
        assert_eq!(parse_minute("2024-06-15T05:18+02:00", 0), Some(198));
    }

    #[test]
    fn test_bucket_groups_by_day_and_drops_invalid() {
        let samples = vec![
            Sample::new("2024-06-15T10:00", Variable::AirTemperature, Some(20.0)),
            Sample::new("2024-06-15T11:00", Variable::AirTemperature, Some(22.0)),
            Sample::new("2024-06-16T10:00", Variable::AirTemperature, Some(18.0)),
            Sample::new("2024-06-16T11:00", Variable::AirTemperature, None),
            Sample::new("2024-06-16T12:00", Variable::AirTemperature, Some(f64::NAN)),
            Sample::new("bad", Variable::AirTemperature, Some(99.0)),
            Sample::new("2024-06-15T12:00", Variable::Pressure, Some(1012.0)),
        ];

        let buckets = DayBucketer::new(0).bucket(&samples);
        assert_eq!(buckets.len(), 2);

        let day1 = buckets.get(date(2024, 6, 15)).unwrap();
        assert_eq!(day1.values(Variable::AirTemperature), vec![20.0, 22.0]);
        assert_eq!(day1.values(Variable::Pressure), vec![1012.0]);

        let day2 = buckets.get(date(2024, 6, 16)).unwrap();
        assert_eq!(day2.values(Variable::AirTemperature), vec![18.0]);
        assert!(!day2.has(Variable::Pressure));
    }

    #[test]
    fn test_bucket_keys_are_ordered_regardless_of_input_order() {
        let samples = vec![
            Sample::new("2024-06-17T00:00", Variable::CloudCover, Some(1.0)),
            Sample::new("2024-06-15T00:00", Variable::CloudCover, Some(1.0)),
            Sample::new("2024-06-16T00:00", Variable::CloudCover, Some(1.0)),
        ];
        let buckets = DayBucketer::new(0).bucket(&samples);
        let dates: Vec<NaiveDate> = buckets.dates().collect();
        assert_eq!(
            dates,
            vec![date(2024, 6, 15), date(2024, 6, 16), date(2024, 6, 17)]
        );
    }

    #[test]
    fn test_horizon_keeps_trailing_day() {
        let samples: Vec<Sample> = (10..=20)
            .map(|d| Sample::new(format!("2024-06-{d:02}T12:00"), Variable::Pressure, Some(1010.0)))
            .collect();
        let buckets = DayBucketer::new(0)
            .with_horizon(date(2024, 6, 12), 3)
            .bucket(&samples);
        let dates: Vec<NaiveDate> = buckets.dates().collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 6, 12),
                date(2024, 6, 13),
                date(2024, 6, 14),
                date(2024, 6, 15)
            ]
        );
    }

    #[test]
    fn test_values_between_is_inclusive_and_skips_unknown_minutes() {
        let mut bucket = DayBucket::default();
        bucket.push(Variable::CloudCover, Some(1320), 10.0);
        bucket.push(Variable::CloudCover, Some(1439), 30.0);
        bucket.push(Variable::CloudCover, Some(1319), 99.0);
        bucket.push(Variable::CloudCover, None, 50.0);
        bucket.push(Variable::CloudCover, Some(1400), f64::NAN);

        assert_eq!(
            bucket.values_between(Variable::CloudCover, 1320, 1439),
            vec![10.0, 30.0]
        );
        assert_eq!(bucket.values(Variable::CloudCover).len(), 4);
        assert_eq!(bucket.len(), 4);
    }

    #[test]
    fn test_following_bucket() {
        let samples = vec![
            Sample::new("2024-06-15T23:00", Variable::CloudCover, Some(10.0)),
            Sample::new("2024-06-16T00:30", Variable::CloudCover, Some(20.0)),
        ];
        let buckets = DayBucketer::new(0).bucket(&samples);
        let next = buckets.following(date(2024, 6, 15)).unwrap();
        assert_eq!(next.values(Variable::CloudCover), vec![20.0]);
        assert!(buckets.following(date(2024, 6, 16)).is_none());
    }
}
