//! Historical records for one calendar day
//!
//! A single bulk daily archive (decades of entries, with null gaps) is
//! filtered client-side to the entries matching one month/day, and the
//! warmest and coldest of those are reported. The archive is fetched once for
//! the whole span; [`ArchiveRequest`] describes that one request.

use crate::stats::average;
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// One day of the flattened archive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalArchiveEntry {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
}

impl HistoricalArchiveEntry {
    pub fn new(date: NaiveDate, temp_max: Option<f64>, temp_min: Option<f64>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            temp_max,
            temp_min,
        }
    }

    fn matches(&self, month: u32, day: u32) -> bool {
        self.month == month && self.day == day
    }

    fn is_complete(&self) -> bool {
        self.temp_max.is_some_and(f64::is_finite) && self.temp_min.is_some_and(f64::is_finite)
    }
}

/// A record-holding entry with its temperatures resolved
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub temp_max: f64,
    pub temp_min: f64,
}

/// Extremes for one calendar day across the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordResult {
    /// No archive year had both temperatures for this day
    NoData { month: u32, day: u32 },
    Records {
        month: u32,
        day: u32,
        /// Entry with the highest maximum temperature
        warmest: RecordEntry,
        /// Entry with the lowest minimum temperature
        coldest: RecordEntry,
        /// Mean of the daily maxima over the matching years, `None` on overflow
        mean_max: Option<f64>,
        /// Mean of the daily minima over the matching years, `None` on overflow
        mean_min: Option<f64>,
        years_considered: usize,
    },
}

impl RecordResult {
    pub fn has_data(&self) -> bool {
        matches!(self, RecordResult::Records { .. })
    }
}

/// Date span of the single bulk archive request for a target date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ArchiveRequest {
    /// Cover the `years` full calendar years before the target date's year
    pub fn for_date(target: NaiveDate, years: u32) -> Option<Self> {
        let last_year = target.year() - 1;
        let first_year = target.year() - years.max(1) as i32;
        Some(Self {
            start: NaiveDate::from_ymd_opt(first_year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(last_year, 12, 31)?,
        })
    }
}

/// Find the warmest and coldest archive entries for a month/day.
///
/// One linear scan selects the matching complete entries; one reduction pass
/// over that subset finds both extremes. Ties keep the first entry in archive
/// order, which for a chronological archive is the earliest year.
pub fn find_records(archive: &[HistoricalArchiveEntry], month: u32, day: u32) -> RecordResult {
    let matching: Vec<RecordEntry> = archive
        .iter()
        .filter(|e| e.matches(month, day) && e.is_complete())
        .filter_map(|e| {
            Some(RecordEntry {
                year: e.year,
                month: e.month,
                day: e.day,
                temp_max: e.temp_max?,
                temp_min: e.temp_min?,
            })
        })
        .collect();

    debug!(
        "Historical filter kept {} of {} archive entries for {:02}-{:02}",
        matching.len(),
        archive.len(),
        month,
        day
    );

    let Some(first) = matching.first().copied() else {
        return RecordResult::NoData { month, day };
    };

    let mut warmest = first;
    let mut coldest = first;
    let mut maxima = Vec::with_capacity(matching.len());
    let mut minima = Vec::with_capacity(matching.len());

    for entry in &matching {
        if entry.temp_max > warmest.temp_max {
            warmest = *entry;
        }
        if entry.temp_min < coldest.temp_min {
            coldest = *entry;
        }
        maxima.push(entry.temp_max);
        minima.push(entry.temp_min);
    }

    let years = matching.len();
    RecordResult::Records {
        month,
        day,
        warmest,
        coldest,
        mean_max: average(&maxima),
        mean_min: average(&minima),
        years_considered: years,
    }
}

/// Convenience wrapper taking the target as a date
pub fn records_for_date(archive: &[HistoricalArchiveEntry], target: NaiveDate) -> RecordResult {
    find_records(archive, target.month(), target.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(y: i32, m: u32, d: u32, max: Option<f64>, min: Option<f64>) -> HistoricalArchiveEntry {
        HistoricalArchiveEntry::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), max, min)
    }

    fn sample_archive() -> Vec<HistoricalArchiveEntry> {
        vec![
            entry(1980, 6, 14, Some(35.0), Some(5.0)),
            entry(1980, 6, 15, Some(28.0), Some(14.0)),
            entry(1980, 6, 16, Some(40.0), Some(2.0)),
            entry(1990, 6, 14, Some(36.0), Some(4.0)),
            entry(1990, 6, 15, Some(31.2), Some(12.5)),
            entry(1990, 6, 16, Some(41.0), Some(1.0)),
            entry(2000, 6, 15, None, Some(9.0)),
        ]
    }

    #[test]
    fn test_records_for_matching_day_only() {
        let result = find_records(&sample_archive(), 6, 15);
        let RecordResult::Records {
            warmest,
            coldest,
            years_considered,
            mean_max,
            ..
        } = result
        else {
            panic!("expected records");
        };

        assert_eq!(warmest.year, 1990);
        assert_eq!(warmest.temp_max, 31.2);
        assert_eq!(coldest.year, 1990);
        assert_eq!(coldest.temp_min, 12.5);
        // 06-14, 06-16 and the incomplete 2000 entry are excluded
        assert_eq!(years_considered, 2);
        assert!((mean_max.unwrap() - 29.6).abs() < 1e-9);
    }

    #[test]
    fn test_means_never_overflow_to_infinity() {
        let archive = vec![
            entry(1990, 6, 15, Some(f64::MAX), Some(-f64::MAX)),
            entry(1991, 6, 15, Some(f64::MAX), Some(-f64::MAX)),
        ];
        let RecordResult::Records {
            mean_max, mean_min, ..
        } = find_records(&archive, 6, 15)
        else {
            panic!("expected records");
        };
        assert_eq!(mean_max, None);
        assert_eq!(mean_min, None);
    }

    #[test]
    fn test_extremes_may_come_from_different_years() {
        let archive = vec![
            entry(1981, 3, 1, Some(12.0), Some(-8.0)),
            entry(1995, 3, 1, Some(19.0), Some(1.0)),
            entry(2010, 3, 1, Some(15.0), Some(-2.0)),
        ];
        let result = find_records(&archive, 3, 1);
        let RecordResult::Records { warmest, coldest, .. } = result else {
            panic!("expected records");
        };
        assert_eq!(warmest.year, 1995);
        assert_eq!(coldest.year, 1981);
    }

    #[test]
    fn test_ties_favour_earliest_year() {
        let archive = vec![
            entry(1985, 7, 4, Some(30.0), Some(10.0)),
            entry(1999, 7, 4, Some(30.0), Some(10.0)),
        ];
        let RecordResult::Records { warmest, coldest, .. } = find_records(&archive, 7, 4) else {
            panic!("expected records");
        };
        assert_eq!(warmest.year, 1985);
        assert_eq!(coldest.year, 1985);
    }

    #[test]
    fn test_single_entry_is_degenerate_but_present() {
        let archive = vec![entry(2001, 12, 25, Some(4.0), Some(-1.0))];
        let RecordResult::Records {
            warmest,
            coldest,
            years_considered,
            ..
        } = find_records(&archive, 12, 25)
        else {
            panic!("expected records");
        };
        assert_eq!(warmest, coldest);
        assert_eq!(years_considered, 1);
    }

    #[test]
    fn test_no_data() {
        assert_eq!(
            find_records(&sample_archive(), 1, 1),
            RecordResult::NoData { month: 1, day: 1 }
        );
        assert!(!find_records(&[], 6, 15).has_data());
    }

    #[test]
    fn test_leap_day_matches_leap_years_only() {
        let archive = vec![
            entry(1996, 2, 28, Some(5.0), Some(0.0)),
            entry(1996, 2, 29, Some(6.0), Some(1.0)),
            entry(1997, 2, 28, Some(7.0), Some(2.0)),
            entry(2000, 2, 29, Some(8.0), Some(3.0)),
        ];
        let target = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let RecordResult::Records { years_considered, warmest, .. } =
            records_for_date(&archive, target)
        else {
            panic!("expected records");
        };
        assert_eq!(years_considered, 2);
        assert_eq!(warmest.year, 2000);
    }

    #[test]
    fn test_archive_request_span() {
        let target = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let request = ArchiveRequest::for_date(target, 45).unwrap();
        assert_eq!(request.start, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
        assert_eq!(request.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_large_archive_single_pass() {
        let start = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        let archive: Vec<HistoricalArchiveEntry> = start
            .iter_days()
            .take(16_436)
            .enumerate()
            .map(|(i, d)| {
                // Every 7th day is a null gap
                let gap = i % 7 == 0;
                let t = (i % 40) as f64;
                HistoricalArchiveEntry::new(
                    d,
                    (!gap).then_some(t + 10.0),
                    (!gap).then_some(t - 10.0),
                )
            })
            .collect();

        let result = find_records(&archive, 6, 15);
        let RecordResult::Records { years_considered, .. } = result else {
            panic!("expected records");
        };
        assert!(years_considered > 30 && years_considered <= 45);
    }
}
