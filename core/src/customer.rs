//! Customer segment, NPS and demographic summaries.

use crate::{
    correlation::pearson,
    error::MetricsResult,
    records::CustomerRecord,
    types::{sort_descending, LabeledValue},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub segment: String,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Lifetime-value statistics per segment, highest mean first.
/// Rows missing either segment or LTV are skipped.
pub fn ltv_by_segment(records: &[CustomerRecord]) -> Vec<SegmentStats> {
    let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        if let (Some(segment), Some(ltv)) = (r.segment.as_deref(), r.ltv) {
            groups.entry(segment).or_default().push(ltv);
        }
    }

    let mut stats: Vec<SegmentStats> = groups
        .into_iter()
        .map(|(segment, mut values)| {
            values.sort_by(f64::total_cmp);
            let count = values.len();
            SegmentStats {
                segment: segment.to_string(),
                mean: values.iter().sum::<f64>() / count as f64,
                median: median_of_sorted(&values),
                min: values[0],
                max: values[count - 1],
                count,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.segment.cmp(&b.segment)));
    stats
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Customer count per NPS category, most common first.
pub fn nps_distribution(records: &[CustomerRecord]) -> Vec<LabeledValue> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for category in records.iter().filter_map(|r| r.nps_category.as_deref()) {
        *counts.entry(category).or_insert(0) += 1;
    }
    let mut out: Vec<LabeledValue> = counts
        .into_iter()
        .map(|(k, n)| LabeledValue::new(k, n as f64))
        .collect();
    sort_descending(&mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width age histogram over the observed range.
/// The last bin is closed on both ends.
pub fn age_histogram(records: &[CustomerRecord], bins: usize) -> Vec<HistogramBin> {
    let ages: Vec<f64> = records.iter().filter_map(|r| r.age).collect();
    let (Some(min), Some(max)) = (
        ages.iter().copied().reduce(f64::min),
        ages.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let mut hist: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for age in ages {
        let idx = (((age - min) / width) as usize).min(bins - 1);
        hist[idx].count += 1;
    }
    hist
}

/// Pearson correlation between income and lifetime value.
pub fn income_ltv_correlation(records: &[CustomerRecord]) -> MetricsResult<Option<f64>> {
    let (income, ltv): (Vec<f64>, Vec<f64>) = records
        .iter()
        .filter_map(|r| Some((r.income?, r.ltv?)))
        .unzip();
    pearson(&income, &ltv)
}
