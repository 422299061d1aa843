//! Geographic opportunity scoring and state-level summaries.

use crate::{
    error::{MetricsError, MetricsResult},
    records::GeographicRecord,
    types::mean,
};
use serde::{Deserialize, Serialize};

/// Weights of the three opportunity-score terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpportunityWeights {
    /// Applied to headroom, `100 - market_penetration`.
    pub penetration: f64,
    /// Applied to the 0–10 satisfaction score.
    pub satisfaction: f64,
    /// Applied to customers as a percent of the largest state.
    pub market_size: f64,
}

impl Default for OpportunityWeights {
    fn default() -> Self {
        Self {
            penetration: 0.4,
            satisfaction: 0.4,
            market_size: 0.2,
        }
    }
}

impl OpportunityWeights {
    /// Highest reachable score for penetration in [0,100], satisfaction
    /// in [0,10] and non-negative customer counts.
    pub fn max_score(&self) -> f64 {
        self.penetration * 100.0 + self.satisfaction * 10.0 + self.market_size * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityScore {
    pub state: String,
    pub customers: f64,
    pub market_penetration: f64,
    pub satisfaction: f64,
    pub revenue: Option<f64>,
    pub opportunity_score: f64,
}

/// Score every state with the default weights, lowest score first.
pub fn opportunity_scores(records: &[GeographicRecord]) -> MetricsResult<Vec<OpportunityScore>> {
    opportunity_scores_with(records, &OpportunityWeights::default())
}

/// Score every state, lowest score first. Requires at least one record.
pub fn opportunity_scores_with(
    records: &[GeographicRecord],
    weights: &OpportunityWeights,
) -> MetricsResult<Vec<OpportunityScore>> {
    let max_customers = records
        .iter()
        .map(|r| r.customers)
        .reduce(f64::max)
        .ok_or(MetricsError::EmptyInput {
            operation: "opportunity_scores",
        })?;

    let mut scores: Vec<OpportunityScore> = records
        .iter()
        .map(|r| {
            let size_pct = if max_customers > 0.0 {
                r.customers / max_customers * 100.0
            } else {
                0.0
            };
            let score = weights.penetration * (100.0 - r.market_penetration)
                + weights.satisfaction * r.satisfaction
                + weights.market_size * size_pct;
            OpportunityScore {
                state: r.state.clone(),
                customers: r.customers,
                market_penetration: r.market_penetration,
                satisfaction: r.satisfaction,
                revenue: r.revenue,
                opportunity_score: score,
            }
        })
        .collect();

    scores.sort_by(|a, b| a.opportunity_score.total_cmp(&b.opportunity_score));
    Ok(scores)
}

/// The `n` highest-scoring states, best first.
pub fn top_opportunities(scores: &[OpportunityScore], n: usize) -> Vec<OpportunityScore> {
    scores.iter().rev().take(n).cloned().collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoSummary {
    pub state_count: usize,
    pub total_revenue: f64,
    pub total_customers: f64,
    pub avg_penetration: f64,
    pub avg_satisfaction: f64,
}

pub fn geo_summary(records: &[GeographicRecord]) -> GeoSummary {
    let penetration: Vec<f64> = records.iter().map(|r| r.market_penetration).collect();
    let satisfaction: Vec<f64> = records.iter().map(|r| r.satisfaction).collect();
    GeoSummary {
        state_count: records.len(),
        total_revenue: records.iter().filter_map(|r| r.revenue).sum(),
        total_customers: records.iter().map(|r| r.customers).sum(),
        avg_penetration: mean(&penetration).unwrap_or(0.0),
        avg_satisfaction: mean(&satisfaction).unwrap_or(0.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoSortKey {
    Revenue,
    Customers,
    Satisfaction,
}

/// States sorted by one column. Missing revenue sorts as 0.
pub fn sort_states(records: &[GeographicRecord], key: GeoSortKey, ascending: bool) -> Vec<GeographicRecord> {
    let value = |r: &GeographicRecord| match key {
        GeoSortKey::Revenue => r.revenue.unwrap_or(0.0),
        GeoSortKey::Customers => r.customers,
        GeoSortKey::Satisfaction => r.satisfaction,
    };
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ord = value(a).total_cmp(&value(b));
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    sorted
}
