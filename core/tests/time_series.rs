//! Time-series bucketing tests.

use chrono::{Datelike, NaiveDate, Weekday};
use novamart_core::{
    records::{CampaignField, CampaignRecord},
    time_series::{aggregate, calendar_heatmap, rebucket, years_present, TimeGrain},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn row(date: &str, revenue: f64) -> CampaignRecord {
    CampaignRecord {
        date: date.into(),
        revenue: Some(revenue),
        ..Default::default()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_rows() -> Vec<CampaignRecord> {
    vec![
        row("2024-01-03", 10.0),
        row("2024-01-01", 5.0),
        row("2024-01-03", 1.0),
        row("2024-01-09", 7.0),
        row("2024-02-14", 2.0),
        row("not-a-date", 99.0),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Daily buckets are ascending and unparsable rows are dropped.
#[test]
fn daily_sums_per_day_ascending() {
    let series = aggregate(&sample_rows(), CampaignField::Revenue, TimeGrain::Daily);
    let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    assert_eq!(
        dates,
        vec![ymd(2024, 1, 1), ymd(2024, 1, 3), ymd(2024, 1, 9), ymd(2024, 2, 14)]
    );
    assert_eq!(series[1].value, 11.0);
    let total: f64 = series.iter().map(|p| p.value).sum();
    assert_eq!(total, 25.0, "the unparsable row must not be counted");
}

/// Re-aggregating a daily series at daily grain changes nothing.
#[test]
fn daily_aggregation_is_idempotent() {
    let once = aggregate(&sample_rows(), CampaignField::Revenue, TimeGrain::Daily);
    let twice = rebucket(&once, TimeGrain::Daily);
    assert_eq!(once, twice);
}

#[test]
fn weekly_buckets_key_on_monday() {
    let series = aggregate(&sample_rows(), CampaignField::Revenue, TimeGrain::Weekly);
    assert_eq!(series[0].date, ymd(2024, 1, 1));
    assert_eq!(series[0].value, 16.0);
    assert_eq!(series[1].date, ymd(2024, 1, 8));
    assert!(series.iter().all(|p| p.date.weekday() == Weekday::Mon));
}

#[test]
fn monthly_buckets_key_on_first_of_month() {
    let series = aggregate(&sample_rows(), CampaignField::Revenue, TimeGrain::Monthly);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date, ymd(2024, 1, 1));
    assert_eq!(series[0].value, 23.0);
    assert_eq!(series[1].date, ymd(2024, 2, 1));
}

/// Weekly totals equal the sum of the daily totals they cover.
#[test]
fn rebucketed_daily_matches_direct_weekly() {
    let daily = aggregate(&sample_rows(), CampaignField::Revenue, TimeGrain::Daily);
    let direct = aggregate(&sample_rows(), CampaignField::Revenue, TimeGrain::Weekly);
    assert_eq!(rebucket(&daily, TimeGrain::Weekly), direct);
}

#[test]
fn calendar_heatmap_filters_year() {
    let mut rows = sample_rows();
    rows.push(row("2023-12-31", 50.0));
    assert_eq!(years_present(&rows), vec![2023, 2024]);

    let cells = calendar_heatmap(&rows, CampaignField::Revenue, 2024);
    assert!(cells.iter().all(|c| c.value < 50.0));
    let first = cells[0];
    assert_eq!((first.iso_week, first.weekday), (1, Weekday::Mon));
}

/// A date at the edge of the calendar range has no ISO week start and is
/// dropped like an unparsable one.
#[test]
fn weekly_drops_row_whose_monday_is_out_of_range() {
    let rows = vec![row("-262143-01-01", 1.0), row("2024-01-03", 4.0)];
    let series = aggregate(&rows, CampaignField::Revenue, TimeGrain::Weekly);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].date, ymd(2024, 1, 1));
    assert_eq!(series[0].value, 4.0);

    let daily = aggregate(&rows, CampaignField::Revenue, TimeGrain::Daily);
    assert_eq!(daily.len(), 2, "daily grain keeps the edge date");
    assert_eq!(rebucket(&daily, TimeGrain::Weekly), series);
}
