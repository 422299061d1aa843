//! Time-series bucketing of campaign rows.
//!
//! Buckets are exact calendar days, ISO weeks (keyed by their Monday) or
//! calendar months (keyed by the 1st). Only buckets that contain at least
//! one row are reported; there is no gap filling.

use crate::{
    records::{CampaignField, CampaignRecord},
    types::SeriesPoint,
};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGrain {
    Daily,
    Weekly,
    Monthly,
}

impl TimeGrain {
    /// First day of the bucket containing `date`, or `None` when that
    /// day falls outside chrono's date range.
    pub fn bucket_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => Some(date),
            Self::Weekly => date.checked_sub_days(Days::new(u64::from(
                date.weekday().num_days_from_monday(),
            ))),
            Self::Monthly => date.with_day(1),
        }
    }
}

/// Parse a raw date cell. Returns `None` for anything unreadable.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Sum `field` per bucket, ascending by bucket start.
/// Rows with an unparsable or unbucketable date are dropped.
pub fn aggregate(records: &[CampaignRecord], field: CampaignField, grain: TimeGrain) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped = 0usize;

    for r in records {
        match parse_date(&r.date).and_then(|d| grain.bucket_start(d)) {
            Some(start) => {
                *buckets.entry(start).or_insert(0.0) += r.value(field);
            }
            None => {
                dropped += 1;
                log::debug!("time_series: dropping row with unparsable date {:?}", r.date);
            }
        }
    }

    if dropped > 0 {
        log::warn!(
            "time_series: {dropped} of {} rows dropped while aggregating {} ({grain:?})",
            records.len(),
            field.name(),
        );
    }

    into_series(buckets)
}

/// Re-bucket an already aggregated series into `grain`.
pub fn rebucket(series: &[SeriesPoint], grain: TimeGrain) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in series {
        match grain.bucket_start(point.date) {
            Some(start) => *buckets.entry(start).or_insert(0.0) += point.value,
            None => log::debug!("time_series: no {grain:?} bucket for {}", point.date),
        }
    }
    into_series(buckets)
}

fn into_series(buckets: BTreeMap<NaiveDate, f64>) -> Vec<SeriesPoint> {
    buckets
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

// ── Calendar heatmap ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub iso_week: u32,
    pub weekday: Weekday,
    pub value: f64,
}

/// Week-by-weekday totals for one calendar year, ordered by ISO week
/// then Monday..Sunday.
pub fn calendar_heatmap(records: &[CampaignRecord], field: CampaignField, year: i32) -> Vec<CalendarCell> {
    let mut cells: BTreeMap<(u32, u32), f64> = BTreeMap::new();
    for r in records {
        let Some(date) = parse_date(&r.date) else {
            continue;
        };
        if date.year() != year {
            continue;
        }
        let key = (date.iso_week().week(), date.weekday().num_days_from_monday());
        *cells.entry(key).or_insert(0.0) += r.value(field);
    }
    cells
        .into_iter()
        .map(|((iso_week, day), value)| CalendarCell {
            iso_week,
            weekday: weekday_from_monday(day),
            value,
        })
        .collect()
}

/// Distinct calendar years present in the data, ascending.
pub fn years_present(records: &[CampaignRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records
        .iter()
        .filter_map(|r| parse_date(&r.date))
        .map(|d| d.year())
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

fn weekday_from_monday(days: u32) -> Weekday {
    match days {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_bucket_starts_on_monday() {
        // 2024-01-07 is a Sunday; its ISO week starts 2024-01-01.
        assert_eq!(TimeGrain::Weekly.bucket_start(ymd(2024, 1, 7)), Some(ymd(2024, 1, 1)));
        assert_eq!(TimeGrain::Weekly.bucket_start(ymd(2024, 1, 8)), Some(ymd(2024, 1, 8)));
    }

    #[test]
    fn accepted_date_formats() {
        assert_eq!(parse_date("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("05/03/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 13:45:00"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05T13:45:00"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }
}
