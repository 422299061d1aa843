//! Channel attribution model comparison.

use crate::{
    error::{MetricsError, MetricsResult},
    records::ChannelAttributionRecord,
    types::safe_ratio,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub value: f64,
    /// Percent of the model's total across channels.
    pub share_pct: f64,
}

/// Attribution model names, in column order of the first row.
pub fn attribution_models(records: &[ChannelAttributionRecord]) -> Vec<String> {
    records
        .first()
        .map(|r| r.models.iter().map(|(name, _)| name.clone()).collect())
        .unwrap_or_default()
}

/// Each channel's credit under `model`, smallest first.
/// Channels lacking the model column count as 0.
pub fn model_shares(records: &[ChannelAttributionRecord], model: &str) -> MetricsResult<Vec<ChannelShare>> {
    if !records.iter().any(|r| r.model_value(model).is_some()) {
        return Err(MetricsError::UnknownModel {
            name: model.to_string(),
        });
    }

    let total: f64 = records.iter().filter_map(|r| r.model_value(model)).sum();
    let mut shares: Vec<ChannelShare> = records
        .iter()
        .map(|r| {
            let value = r.model_value(model).unwrap_or(0.0);
            ChannelShare {
                channel: r.channel.clone(),
                value,
                share_pct: safe_ratio(value, total) * 100.0,
            }
        })
        .collect();
    shares.sort_by(|a, b| a.value.total_cmp(&b.value));
    Ok(shares)
}

/// Per-model totals across all channels, in model column order.
pub fn model_totals(records: &[ChannelAttributionRecord]) -> Vec<(String, f64)> {
    attribution_models(records)
        .into_iter()
        .map(|model| {
            let total = records.iter().filter_map(|r| r.model_value(&model)).sum();
            (model, total)
        })
        .collect()
}
