//! Page summaries assembled from the loaded datasets.
//!
//! Every page is plain serializable data. A page whose primary dataset
//! is empty reports `PageStatus::Unavailable`; classifier contract
//! violations are carried inside the page as text.

use crate::{
    attribution::{attribution_models, model_shares, model_totals, ChannelShare},
    classifier::{evaluate_leads, LeadModelEvaluation},
    config::DashboardConfig,
    correlation::CorrelatedPair,
    customer::{age_histogram, income_ltv_correlation, ltv_by_segment, nps_distribution},
    customer::{HistogramBin, SegmentStats},
    diagnostics::{learning_curve_summary, rank_features, LearningCurveSummary, RankedFeature},
    error::MetricsResult,
    funnel::{analyze_transitions, biggest_drop_off, overall_conversion_rate, FunnelTransition},
    geo::{geo_summary, opportunity_scores_with, sort_states, top_opportunities},
    geo::{GeoSortKey, GeoSummary, OpportunityScore},
    kpi::{aggregate_by_channel, compute_kpis, cumulative_conversions, customer_count},
    kpi::region_quarter_revenue,
    kpi::{sum_by_dimension, top_channel, CampaignKpis, ChannelMetric, CumulativeConversions},
    kpi::{monthly_spend_by_campaign_type, CampaignTypeSpend, Dimension, RegionQuarterRevenue},
    loader::{DatasetCache, DatasetName, Datasets},
    product::{category_stats, product_hierarchy, quarterly_sales, region_performance},
    product::{CategoryStats, HierarchyNode, ProductMetric},
    records::{CampaignField, CorrelationMatrix},
    time_series::{aggregate, calendar_heatmap, years_present, CalendarCell, TimeGrain},
    types::{mean, LabeledValue, SeriesPoint},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Page identifiers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageId {
    Executive,
    Campaigns,
    Customers,
    Products,
    Geographic,
    AttributionFunnel,
    ModelEvaluation,
}

impl PageId {
    pub const ALL: [PageId; 7] = [
        Self::Executive,
        Self::Campaigns,
        Self::Customers,
        Self::Products,
        Self::Geographic,
        Self::AttributionFunnel,
        Self::ModelEvaluation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Executive => "executive",
            Self::Campaigns => "campaigns",
            Self::Customers => "customers",
            Self::Products => "products",
            Self::Geographic => "geographic",
            Self::AttributionFunnel => "attribution_funnel",
            Self::ModelEvaluation => "model_evaluation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Executive => "Executive Overview",
            Self::Campaigns => "Campaign Analytics",
            Self::Customers => "Customer Insights",
            Self::Products => "Product Performance",
            Self::Geographic => "Geographic Analysis",
            Self::AttributionFunnel => "Attribution & Funnel",
            Self::ModelEvaluation => "ML Model Evaluation",
        }
    }

    /// The dataset without which the page has nothing to show.
    pub fn primary_dataset(&self) -> DatasetName {
        match self {
            Self::Executive | Self::Campaigns => DatasetName::CampaignPerformance,
            Self::Customers => DatasetName::CustomerData,
            Self::Products => DatasetName::ProductSales,
            Self::Geographic => DatasetName::GeographicData,
            Self::AttributionFunnel => DatasetName::FunnelData,
            Self::ModelEvaluation => DatasetName::LeadScoringResults,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown page '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageStatus<T> {
    Ready { page: T },
    Unavailable { missing: DatasetName },
}

impl<T> PageStatus<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready { page } => Some(page),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

// ── Page payloads ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveOverview {
    pub kpis: CampaignKpis,
    pub top_channel: Option<String>,
    pub revenue_trend: Vec<SeriesPoint>,
    pub revenue_by_channel: Vec<LabeledValue>,
    pub region_quarter_revenue: Vec<RegionQuarterRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAnalytics {
    pub grain: TimeGrain,
    pub revenue: Vec<SeriesPoint>,
    pub conversions: Vec<SeriesPoint>,
    pub conversions_by_channel: Vec<LabeledValue>,
    pub roas_by_channel: Vec<LabeledValue>,
    pub revenue_by_campaign_type: Vec<LabeledValue>,
    pub monthly_spend_by_campaign_type: Vec<CampaignTypeSpend>,
    pub cumulative_conversions: Vec<CumulativeConversions>,
    /// Revenue calendar for the latest year in the data.
    pub calendar_year: Option<i32>,
    pub calendar: Vec<CalendarCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInsights {
    pub customer_count: usize,
    pub avg_satisfaction: f64,
    pub segments: Vec<SegmentStats>,
    pub nps: Vec<LabeledValue>,
    pub age_histogram: Vec<HistogramBin>,
    pub income_ltv_correlation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub categories: Vec<CategoryStats>,
    pub hierarchy: Vec<HierarchyNode>,
    pub region_sales: Vec<LabeledValue>,
    pub region_margin: Vec<LabeledValue>,
    pub quarterly_sales: Vec<LabeledValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicAnalysis {
    pub summary: GeoSummary,
    pub top_opportunities: Vec<OpportunityScore>,
    pub revenue_by_state: Vec<LabeledValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionFunnel {
    pub transitions: Vec<FunnelTransition>,
    pub overall_conversion_rate: f64,
    pub biggest_drop_off: Option<FunnelTransition>,
    /// Set when funnel rows could not be analysed.
    pub funnel_error: Option<String>,
    pub attribution_models: Vec<String>,
    /// Shares under the first attribution model.
    pub model_shares: Vec<ChannelShare>,
    /// Credited total per model, for comparing models side by side.
    pub model_totals: Vec<LabeledValue>,
    pub correlation: CorrelationMatrix,
    pub strongest_correlations: Vec<CorrelatedPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub evaluation: Option<LeadModelEvaluation>,
    /// Set when the lead rows violate the classifier contract.
    pub error: Option<String>,
    pub features: Vec<RankedFeature>,
    pub top_features: Vec<RankedFeature>,
    pub learning_curve: Option<LearningCurveSummary>,
}

// ── Dashboard ────────────────────────────────────────────────────────────────

/// Owns the data source and config, and builds pages on request.
pub struct Dashboard {
    config: DashboardConfig,
    cache: Option<DatasetCache>,
    datasets: Datasets,
}

impl Dashboard {
    /// Read datasets from `config.data_dir` through a cache.
    pub fn from_dir(config: DashboardConfig) -> MetricsResult<Self> {
        let mut cache = DatasetCache::new(&config.data_dir);
        let datasets = cache.datasets()?.clone();
        Ok(Self {
            config,
            cache: Some(cache),
            datasets,
        })
    }

    /// Serve a fixed, in-memory bundle. `reload` is a no-op.
    pub fn from_datasets(datasets: Datasets, config: DashboardConfig) -> Self {
        Self {
            config,
            cache: None,
            datasets,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// Pick up any dataset file changed since the last read.
    /// Returns true when at least one dataset was re-read.
    pub fn refresh(&mut self) -> MetricsResult<bool> {
        let Some(cache) = self.cache.as_mut() else {
            return Ok(false);
        };
        let mut changed = false;
        for name in DatasetName::ALL {
            changed |= cache.ensure(name)?;
        }
        if changed {
            self.datasets = cache.datasets()?.clone();
        }
        Ok(changed)
    }

    /// Drop the cache and re-read every dataset file.
    pub fn reload(&mut self) -> MetricsResult<()> {
        if let Some(cache) = self.cache.as_mut() {
            cache.invalidate_all();
        }
        self.refresh().map(|_| ())
    }

    /// Availability of every page, in menu order.
    pub fn page_list(&self) -> Vec<(PageId, bool)> {
        PageId::ALL
            .into_iter()
            .map(|p| (p, !self.datasets.is_empty(p.primary_dataset())))
            .collect()
    }

    /// Any page as JSON.
    pub fn page_json(&self, page: PageId) -> MetricsResult<serde_json::Value> {
        let value = match page {
            PageId::Executive => serde_json::to_value(self.executive_overview())?,
            PageId::Campaigns => serde_json::to_value(self.campaign_analytics())?,
            PageId::Customers => serde_json::to_value(self.customer_insights())?,
            PageId::Products => serde_json::to_value(self.product_performance())?,
            PageId::Geographic => serde_json::to_value(self.geographic_analysis()?)?,
            PageId::AttributionFunnel => serde_json::to_value(self.attribution_funnel())?,
            PageId::ModelEvaluation => serde_json::to_value(self.model_evaluation())?,
        };
        Ok(value)
    }

    fn unavailable<T>(&self, page: PageId) -> Option<PageStatus<T>> {
        let missing = page.primary_dataset();
        if self.datasets.is_empty(missing) {
            log::info!("dashboard: {page} unavailable, {missing} is empty");
            Some(PageStatus::Unavailable { missing })
        } else {
            None
        }
    }

    pub fn executive_overview(&self) -> PageStatus<ExecutiveOverview> {
        if let Some(status) = self.unavailable(PageId::Executive) {
            return status;
        }
        let campaigns = &self.datasets.campaigns;
        PageStatus::Ready {
            page: ExecutiveOverview {
                kpis: compute_kpis(campaigns),
                top_channel: top_channel(campaigns),
                revenue_trend: aggregate(
                    campaigns,
                    CampaignField::Revenue,
                    self.config.default_time_grain,
                ),
                revenue_by_channel: aggregate_by_channel(campaigns, ChannelMetric::Revenue),
                region_quarter_revenue: region_quarter_revenue(campaigns),
            },
        }
    }

    pub fn campaign_analytics(&self) -> PageStatus<CampaignAnalytics> {
        self.campaign_analytics_at(self.config.default_time_grain)
    }

    pub fn campaign_analytics_at(&self, grain: TimeGrain) -> PageStatus<CampaignAnalytics> {
        if let Some(status) = self.unavailable(PageId::Campaigns) {
            return status;
        }
        let campaigns = &self.datasets.campaigns;
        let calendar_year = years_present(campaigns).last().copied();
        PageStatus::Ready {
            page: CampaignAnalytics {
                grain,
                revenue: aggregate(campaigns, CampaignField::Revenue, grain),
                conversions: aggregate(campaigns, CampaignField::Conversions, grain),
                conversions_by_channel: aggregate_by_channel(campaigns, ChannelMetric::Conversions),
                roas_by_channel: aggregate_by_channel(campaigns, ChannelMetric::Roas),
                revenue_by_campaign_type: sum_by_dimension(
                    campaigns,
                    Dimension::CampaignType,
                    CampaignField::Revenue,
                ),
                monthly_spend_by_campaign_type: monthly_spend_by_campaign_type(campaigns),
                cumulative_conversions: cumulative_conversions(campaigns),
                calendar_year,
                calendar: calendar_year
                    .map(|y| calendar_heatmap(campaigns, CampaignField::Revenue, y))
                    .unwrap_or_default(),
            },
        }
    }

    pub fn customer_insights(&self) -> PageStatus<CustomerInsights> {
        if let Some(status) = self.unavailable(PageId::Customers) {
            return status;
        }
        let customers = &self.datasets.customers;
        let satisfaction: Vec<f64> = customers.iter().filter_map(|c| c.satisfaction_score).collect();
        let correlation = match income_ltv_correlation(customers) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("dashboard: income/LTV correlation skipped: {e}");
                None
            }
        };
        PageStatus::Ready {
            page: CustomerInsights {
                customer_count: customer_count(customers),
                avg_satisfaction: mean(&satisfaction).unwrap_or(0.0),
                segments: ltv_by_segment(customers),
                nps: nps_distribution(customers),
                age_histogram: age_histogram(customers, self.config.age_histogram_bins),
                income_ltv_correlation: correlation,
            },
        }
    }

    pub fn product_performance(&self) -> PageStatus<ProductPerformance> {
        if let Some(status) = self.unavailable(PageId::Products) {
            return status;
        }
        let sales = &self.datasets.product_sales;
        PageStatus::Ready {
            page: ProductPerformance {
                categories: category_stats(sales),
                hierarchy: product_hierarchy(sales),
                region_sales: region_performance(sales, None, ProductMetric::Sales),
                region_margin: region_performance(sales, None, ProductMetric::Margin),
                quarterly_sales: quarterly_sales(sales, None),
            },
        }
    }

    pub fn geographic_analysis(&self) -> MetricsResult<PageStatus<GeographicAnalysis>> {
        if let Some(status) = self.unavailable(PageId::Geographic) {
            return Ok(status);
        }
        let geo = &self.datasets.geographic;
        let scores = opportunity_scores_with(geo, &self.config.opportunity_weights)?;
        let revenue_by_state = sort_states(geo, GeoSortKey::Revenue, false)
            .into_iter()
            .map(|r| LabeledValue::new(r.state, r.revenue.unwrap_or(0.0)))
            .collect();
        Ok(PageStatus::Ready {
            page: GeographicAnalysis {
                summary: geo_summary(geo),
                top_opportunities: top_opportunities(&scores, self.config.top_n),
                revenue_by_state,
            },
        })
    }

    pub fn attribution_funnel(&self) -> PageStatus<AttributionFunnel> {
        if let Some(status) = self.unavailable(PageId::AttributionFunnel) {
            return status;
        }
        let data = &self.datasets;

        let (transitions, overall, funnel_error) = match analyze_transitions(&data.funnel)
            .and_then(|t| Ok((t, overall_conversion_rate(&data.funnel)?)))
        {
            Ok((t, overall)) => (t, overall, None),
            Err(e) => {
                log::warn!("dashboard: funnel analysis failed: {e}");
                (Vec::new(), 0.0, Some(e.to_string()))
            }
        };

        let models = attribution_models(&data.channel_attribution);
        let shares = match models.first() {
            Some(model) => model_shares(&data.channel_attribution, model).unwrap_or_default(),
            None => Vec::new(),
        };

        PageStatus::Ready {
            page: AttributionFunnel {
                biggest_drop_off: biggest_drop_off(&transitions).copied(),
                transitions,
                overall_conversion_rate: overall,
                funnel_error,
                attribution_models: models,
                model_shares: shares,
                model_totals: model_totals(&data.channel_attribution)
                    .into_iter()
                    .map(|(model, total)| LabeledValue::new(model, total))
                    .collect(),
                strongest_correlations: data.correlation.strongest_pairs(self.config.top_n),
                correlation: data.correlation.clone(),
            },
        }
    }

    pub fn model_evaluation(&self) -> PageStatus<ModelEvaluation> {
        if let Some(status) = self.unavailable(PageId::ModelEvaluation) {
            return status;
        }
        let data = &self.datasets;
        let (evaluation, error) = match evaluate_leads(&data.leads) {
            Ok(ev) => (Some(ev), None),
            Err(e) => {
                log::warn!("dashboard: lead model evaluation failed: {e}");
                (None, Some(e.to_string()))
            }
        };
        let features = rank_features(&data.feature_importance, true);
        let top_features = features.iter().take(self.config.top_n).cloned().collect();
        PageStatus::Ready {
            page: ModelEvaluation {
                evaluation,
                error,
                features,
                top_features,
                learning_curve: learning_curve_summary(&data.learning_curve),
            },
        }
    }
}
