//! Campaign KPI aggregation.
//!
//! Every function here is total: missing columns and empty inputs
//! degrade to zero-valued results, they never fail.

use crate::{
    records::{CampaignField, CampaignRecord, CustomerRecord},
    time_series::parse_date,
    types::{mean, safe_ratio, sort_descending, LabeledValue},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Denominator used when no record carries a spend value at all.
pub const SAFE_SPEND_DENOMINATOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignKpis {
    pub total_revenue: f64,
    pub total_conversions: f64,
    pub total_spend: f64,
    pub roas: f64,
    pub avg_ctr: f64,
    /// Percent.
    pub avg_conversion_rate: f64,
}

/// Compute headline KPIs over a set of campaign rows.
pub fn compute_kpis(records: &[CampaignRecord]) -> CampaignKpis {
    let total_revenue = sum_field(records, CampaignField::Revenue);
    let total_conversions = sum_field(records, CampaignField::Conversions);

    let total_spend = if records.iter().any(|r| r.spend.is_some()) {
        sum_field(records, CampaignField::Spend)
    } else {
        SAFE_SPEND_DENOMINATOR
    };
    let roas = safe_ratio(total_revenue, total_spend);

    let ctrs: Vec<f64> = records.iter().filter_map(|r| r.ctr).collect();
    let avg_ctr = mean(&ctrs).unwrap_or(0.0);

    let total_clicks = sum_field(records, CampaignField::Clicks);
    let avg_conversion_rate = safe_ratio(total_conversions, total_clicks) * 100.0;

    CampaignKpis {
        total_revenue,
        total_conversions,
        total_spend,
        roas,
        avg_ctr,
        avg_conversion_rate,
    }
}

/// Number of customer rows.
pub fn customer_count(customers: &[CustomerRecord]) -> usize {
    customers.len()
}

/// Sum of one numeric column; absent values count as 0.
pub fn sum_field(records: &[CampaignRecord], field: CampaignField) -> f64 {
    records.iter().map(|r| r.value(field)).sum()
}

// ── Grouped aggregates ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMetric {
    Revenue,
    Conversions,
    Roas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Channel,
    Region,
    CampaignType,
}

impl Dimension {
    fn key<'a>(&self, record: &'a CampaignRecord) -> Option<&'a str> {
        match self {
            Self::Channel => record.channel.as_deref(),
            Self::Region => record.region.as_deref(),
            Self::CampaignType => record.campaign_type.as_deref(),
        }
    }
}

/// Per-channel revenue, conversions or ROAS, highest first.
pub fn aggregate_by_channel(records: &[CampaignRecord], metric: ChannelMetric) -> Vec<LabeledValue> {
    match metric {
        ChannelMetric::Revenue => {
            sum_by_dimension(records, Dimension::Channel, CampaignField::Revenue)
        }
        ChannelMetric::Conversions => {
            sum_by_dimension(records, Dimension::Channel, CampaignField::Conversions)
        }
        ChannelMetric::Roas => {
            let mut totals: HashMap<&str, (f64, f64)> = HashMap::new();
            for r in records {
                if let Some(channel) = r.channel.as_deref() {
                    let entry = totals.entry(channel).or_insert((0.0, 0.0));
                    entry.0 += r.value(CampaignField::Revenue);
                    entry.1 += r.value(CampaignField::Spend);
                }
            }
            let mut out: Vec<LabeledValue> = totals
                .into_iter()
                .map(|(channel, (revenue, spend))| {
                    LabeledValue::new(channel, safe_ratio(revenue, spend))
                })
                .collect();
            sort_descending(&mut out);
            out
        }
    }
}

/// Sum `field` per value of `dimension`, highest first.
/// Rows without the dimension are skipped.
pub fn sum_by_dimension(
    records: &[CampaignRecord],
    dimension: Dimension,
    field: CampaignField,
) -> Vec<LabeledValue> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for r in records {
        if let Some(key) = dimension.key(r) {
            *totals.entry(key).or_insert(0.0) += r.value(field);
        }
    }
    let mut out: Vec<LabeledValue> = totals
        .into_iter()
        .map(|(k, v)| LabeledValue::new(k, v))
        .collect();
    sort_descending(&mut out);
    out
}

/// The channel contributing the most revenue.
pub fn top_channel(records: &[CampaignRecord]) -> Option<String> {
    aggregate_by_channel(records, ChannelMetric::Revenue)
        .into_iter()
        .next()
        .map(|lv| lv.label)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionQuarterRevenue {
    pub region: String,
    pub year: i32,
    pub quarter: u32,
    pub revenue: f64,
}

/// Revenue per (region, year, quarter), ordered by those keys.
/// Rows with no region or an unreadable date are dropped.
pub fn region_quarter_revenue(records: &[CampaignRecord]) -> Vec<RegionQuarterRevenue> {
    let mut totals: BTreeMap<(&str, i32, u32), f64> = BTreeMap::new();
    for r in records {
        let (Some(region), Some(date)) = (r.region.as_deref(), parse_date(&r.date)) else {
            continue;
        };
        let quarter = (date.month0() / 3) + 1;
        *totals.entry((region, date.year(), quarter)).or_insert(0.0) +=
            r.value(CampaignField::Revenue);
    }
    totals
        .into_iter()
        .map(|((region, year, quarter), revenue)| RegionQuarterRevenue {
            region: region.to_string(),
            year,
            quarter,
            revenue,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTypeSpend {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub campaign_type: String,
    pub spend: f64,
    /// Share of the month's spend across all campaign types.
    pub share_pct: f64,
}

/// Spend per (month, campaign type), ordered by month then type.
/// Rows with no campaign type or an unreadable date are dropped.
pub fn monthly_spend_by_campaign_type(records: &[CampaignRecord]) -> Vec<CampaignTypeSpend> {
    let mut totals: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for r in records {
        let (Some(kind), Some(date)) = (r.campaign_type.as_deref(), parse_date(&r.date)) else {
            continue;
        };
        let Some(month) = date.with_day(1) else {
            continue;
        };
        *totals.entry((month, kind)).or_insert(0.0) += r.value(CampaignField::Spend);
    }

    let mut month_totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for ((month, _), spend) in &totals {
        *month_totals.entry(*month).or_insert(0.0) += spend;
    }

    totals
        .into_iter()
        .map(|((month, kind), spend)| {
            let month_total = month_totals.get(&month).copied().unwrap_or(0.0);
            CampaignTypeSpend {
                month,
                campaign_type: kind.to_string(),
                spend,
                share_pct: safe_ratio(spend, month_total) * 100.0,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeConversions {
    pub date: NaiveDate,
    pub channel: String,
    pub conversions: f64,
    pub cumulative_conversions: f64,
}

/// Daily conversions per channel with a running total per channel.
pub fn cumulative_conversions(records: &[CampaignRecord]) -> Vec<CumulativeConversions> {
    let mut daily: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
    for r in records {
        let (Some(channel), Some(date)) = (r.channel.as_deref(), parse_date(&r.date)) else {
            continue;
        };
        *daily.entry((date, channel)).or_insert(0.0) += r.value(CampaignField::Conversions);
    }

    let mut running: HashMap<&str, f64> = HashMap::new();
    daily
        .into_iter()
        .map(|((date, channel), conversions)| {
            let total = running.entry(channel).or_insert(0.0);
            *total += conversions;
            CumulativeConversions {
                date,
                channel: channel.to_string(),
                conversions,
                cumulative_conversions: *total,
            }
        })
        .collect()
}
