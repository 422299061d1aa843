//! Typed rows for every dataset the dashboard reads.
//!
//! RULE: column presence is decided here, once, at ingestion.
//! Optional columns are `Option<T>` fields; downstream code reads them
//! through the accessor helpers, which apply the zero-default policy.

use serde::{Deserialize, Serialize};

// ── Campaign performance ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Raw date text. Parsed by the time-series aggregator, which drops
    /// rows it cannot read.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub campaign_type: Option<String>,
    #[serde(default)]
    pub spend: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub conversions: Option<f64>,
    #[serde(default)]
    pub clicks: Option<f64>,
    #[serde(default)]
    pub impressions: Option<f64>,
    #[serde(default)]
    pub ctr: Option<f64>,
}

/// Numeric campaign columns that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignField {
    Revenue,
    Spend,
    Conversions,
    Clicks,
    Impressions,
}

impl CampaignField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Spend => "spend",
            Self::Conversions => "conversions",
            Self::Clicks => "clicks",
            Self::Impressions => "impressions",
        }
    }
}

impl CampaignRecord {
    /// The raw optional value of a numeric column.
    pub fn field(&self, field: CampaignField) -> Option<f64> {
        match field {
            CampaignField::Revenue => self.revenue,
            CampaignField::Spend => self.spend,
            CampaignField::Conversions => self.conversions,
            CampaignField::Clicks => self.clicks,
            CampaignField::Impressions => self.impressions,
        }
    }

    /// The value of a numeric column, 0 when absent.
    pub fn value(&self, field: CampaignField) -> f64 {
        self.field(field).unwrap_or(0.0)
    }
}

// ── Customers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub age: Option<f64>,
    #[serde(default)]
    pub income: Option<f64>,
    #[serde(default)]
    pub ltv: Option<f64>,
    /// 1–10 scale.
    #[serde(default)]
    pub satisfaction_score: Option<f64>,
    #[serde(default)]
    pub nps_category: Option<String>,
    #[serde(default)]
    pub purchases: Option<f64>,
}

// ── Product sales ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSaleRecord {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Quarter label as written in the source, e.g. `Q3` or `2024-Q3`.
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub sales: Option<f64>,
    #[serde(default)]
    pub units: Option<f64>,
    #[serde(default)]
    pub profit_margin: Option<f64>,
}

// ── Funnel ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStageRecord {
    pub stage: String,
    pub visitors: u64,
}

impl FunnelStageRecord {
    pub fn new(stage: impl Into<String>, visitors: u64) -> Self {
        Self {
            stage: stage.into(),
            visitors,
        }
    }
}

// ── Lead scoring model outputs ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadScoringRecord {
    #[serde(default)]
    pub lead_id: Option<String>,
    /// Ground truth, 0 or 1. Kept wide so invalid values reach the evaluator.
    pub actual_converted: i64,
    pub predicted_class: i64,
    pub predicted_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportanceRecord {
    pub feature: String,
    pub importance: f64,
    #[serde(default)]
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurveRecord {
    pub training_set_size: u64,
    pub training_score: f64,
    pub validation_score: f64,
    #[serde(default)]
    pub training_std: Option<f64>,
    #[serde(default)]
    pub validation_std: Option<f64>,
}

// ── Geography ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicRecord {
    pub state: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    pub customers: f64,
    /// Percent, 0–100.
    pub market_penetration: f64,
    /// 0–10 scale.
    pub satisfaction: f64,
}

// ── Attribution & journey ────────────────────────────────────────────────────

/// One channel row of the attribution table. Model columns are dynamic,
/// so they are kept as ordered `(model, value)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAttributionRecord {
    pub channel: String,
    pub models: Vec<(String, f64)>,
}

impl ChannelAttributionRecord {
    pub fn model_value(&self, model: &str) -> Option<f64> {
        self.models
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, v)| *v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerJourneyRecord {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub touchpoint: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub converted: Option<i64>,
}

/// Square matrix of pairwise metric correlations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<String>,
    /// Row-major, `metrics.len()` × `metrics.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
