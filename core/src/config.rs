use crate::{geo::OpportunityWeights, time_series::TimeGrain};
use serde::{Deserialize, Serialize};

fn default_data_dir() -> String {
    "./data".into()
}

fn default_time_grain() -> TimeGrain {
    TimeGrain::Daily
}

fn default_top_n() -> usize {
    5
}

fn default_age_histogram_bins() -> usize {
    20
}

fn default_currency_symbol() -> String {
    "$".into()
}

/// Dashboard-wide settings. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_time_grain")]
    pub default_time_grain: TimeGrain,
    /// Length of every "top N" list (opportunities, features, channels).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub opportunity_weights: OpportunityWeights,
    #[serde(default = "default_age_histogram_bins")]
    pub age_histogram_bins: usize,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_time_grain: default_time_grain(),
            top_n: default_top_n(),
            opportunity_weights: OpportunityWeights::default(),
            age_histogram_bins: default_age_histogram_bins(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file.
    /// In tests, use DashboardConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DashboardConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid dashboard config {path}: {e}"))?;
        if config.top_n == 0 {
            anyhow::bail!("Invalid dashboard config {path}: top_n must be at least 1");
        }
        if config.age_histogram_bins == 0 {
            anyhow::bail!("Invalid dashboard config {path}: age_histogram_bins must be at least 1");
        }
        log::info!("config: loaded {path}");
        Ok(config)
    }

    /// Hard-coded config for tests; never touches the filesystem.
    pub fn default_test() -> Self {
        Self {
            data_dir: "tests/data".into(),
            top_n: 3,
            age_histogram_bins: 10,
            ..Self::default()
        }
    }
}
