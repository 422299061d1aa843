//! CSV dataset ingestion and the on-disk dataset cache.
//!
//! RULE: a missing dataset file is never an error. It yields an empty
//! dataset and a warning, and the pages that need it report themselves
//! unavailable.

use crate::{
    error::MetricsResult,
    records::{
        CampaignRecord, ChannelAttributionRecord, CorrelationMatrix, CustomerJourneyRecord,
        CustomerRecord, FeatureImportanceRecord, FunnelStageRecord, GeographicRecord,
        LeadScoringRecord, LearningCurveRecord, ProductSaleRecord,
    },
};
use csv::{ReaderBuilder, Trim};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// ── Dataset names ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetName {
    CampaignPerformance,
    CustomerData,
    ProductSales,
    LeadScoringResults,
    FeatureImportance,
    LearningCurve,
    GeographicData,
    ChannelAttribution,
    FunnelData,
    CustomerJourney,
    CorrelationMatrix,
}

impl DatasetName {
    pub const ALL: [DatasetName; 11] = [
        Self::CampaignPerformance,
        Self::CustomerData,
        Self::ProductSales,
        Self::LeadScoringResults,
        Self::FeatureImportance,
        Self::LearningCurve,
        Self::GeographicData,
        Self::ChannelAttribution,
        Self::FunnelData,
        Self::CustomerJourney,
        Self::CorrelationMatrix,
    ];

    /// File stem; the dataset lives at `<data_dir>/<stem>.csv`.
    pub fn stem(&self) -> &'static str {
        match self {
            Self::CampaignPerformance => "campaign_performance",
            Self::CustomerData => "customer_data",
            Self::ProductSales => "product_sales",
            Self::LeadScoringResults => "lead_scoring_results",
            Self::FeatureImportance => "feature_importance",
            Self::LearningCurve => "learning_curve",
            Self::GeographicData => "geographic_data",
            Self::ChannelAttribution => "channel_attribution",
            Self::FunnelData => "funnel_data",
            Self::CustomerJourney => "customer_journey",
            Self::CorrelationMatrix => "correlation_matrix",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.stem())
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

// ── In-memory bundle ─────────────────────────────────────────────────────────

/// Every dataset the dashboard reads, already typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datasets {
    pub campaigns: Vec<CampaignRecord>,
    pub customers: Vec<CustomerRecord>,
    pub product_sales: Vec<ProductSaleRecord>,
    pub leads: Vec<LeadScoringRecord>,
    pub feature_importance: Vec<FeatureImportanceRecord>,
    pub learning_curve: Vec<LearningCurveRecord>,
    pub geographic: Vec<GeographicRecord>,
    pub channel_attribution: Vec<ChannelAttributionRecord>,
    pub funnel: Vec<FunnelStageRecord>,
    pub customer_journey: Vec<CustomerJourneyRecord>,
    pub correlation: CorrelationMatrix,
}

impl Datasets {
    /// Row count of one dataset. The correlation matrix counts metrics.
    pub fn row_count(&self, name: DatasetName) -> usize {
        match name {
            DatasetName::CampaignPerformance => self.campaigns.len(),
            DatasetName::CustomerData => self.customers.len(),
            DatasetName::ProductSales => self.product_sales.len(),
            DatasetName::LeadScoringResults => self.leads.len(),
            DatasetName::FeatureImportance => self.feature_importance.len(),
            DatasetName::LearningCurve => self.learning_curve.len(),
            DatasetName::GeographicData => self.geographic.len(),
            DatasetName::ChannelAttribution => self.channel_attribution.len(),
            DatasetName::FunnelData => self.funnel.len(),
            DatasetName::CustomerJourney => self.customer_journey.len(),
            DatasetName::CorrelationMatrix => self.correlation.metrics.len(),
        }
    }

    pub fn is_empty(&self, name: DatasetName) -> bool {
        self.row_count(name) == 0
    }

    /// Load every dataset once from `data_dir`, without caching.
    pub fn load_dir(data_dir: &Path) -> MetricsResult<Self> {
        let mut datasets = Datasets::default();
        for name in DatasetName::ALL {
            load_into(&mut datasets, data_dir, name)?;
        }
        Ok(datasets)
    }

    fn clear(&mut self, name: DatasetName) {
        match name {
            DatasetName::CampaignPerformance => self.campaigns.clear(),
            DatasetName::CustomerData => self.customers.clear(),
            DatasetName::ProductSales => self.product_sales.clear(),
            DatasetName::LeadScoringResults => self.leads.clear(),
            DatasetName::FeatureImportance => self.feature_importance.clear(),
            DatasetName::LearningCurve => self.learning_curve.clear(),
            DatasetName::GeographicData => self.geographic.clear(),
            DatasetName::ChannelAttribution => self.channel_attribution.clear(),
            DatasetName::FunnelData => self.funnel.clear(),
            DatasetName::CustomerJourney => self.customer_journey.clear(),
            DatasetName::CorrelationMatrix => self.correlation = CorrelationMatrix::default(),
        }
    }
}

/// Replace one dataset in `datasets` with the contents of its file.
/// A missing file clears the dataset.
fn load_into(datasets: &mut Datasets, data_dir: &Path, name: DatasetName) -> MetricsResult<()> {
    let path = data_dir.join(name.file_name());
    if !path.is_file() {
        log::warn!("loader: {} not found, using an empty dataset", path.display());
        datasets.clear(name);
        return Ok(());
    }

    match name {
        DatasetName::CampaignPerformance => datasets.campaigns = read_records(&path)?,
        DatasetName::CustomerData => datasets.customers = read_records(&path)?,
        DatasetName::ProductSales => datasets.product_sales = read_records(&path)?,
        DatasetName::LeadScoringResults => datasets.leads = read_records(&path)?,
        DatasetName::FeatureImportance => datasets.feature_importance = read_records(&path)?,
        DatasetName::LearningCurve => datasets.learning_curve = read_records(&path)?,
        DatasetName::GeographicData => datasets.geographic = read_records(&path)?,
        DatasetName::ChannelAttribution => {
            datasets.channel_attribution = read_channel_attribution(&path)?
        }
        DatasetName::FunnelData => datasets.funnel = read_records(&path)?,
        DatasetName::CustomerJourney => datasets.customer_journey = read_records(&path)?,
        DatasetName::CorrelationMatrix => datasets.correlation = read_correlation_matrix(&path)?,
    }
    log::info!(
        "loader: {name} loaded, {} rows",
        datasets.row_count(name)
    );
    Ok(())
}

// ── CSV readers ──────────────────────────────────────────────────────────────

fn reader(path: &Path) -> MetricsResult<csv::Reader<std::fs::File>> {
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?)
}

/// Deserialize every row of a headered CSV file. Rows that do not fit
/// the record type are skipped with a warning.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> MetricsResult<Vec<T>> {
    let mut rdr = reader(path)?;
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                log::debug!("loader: {} row {} skipped: {e}", path.display(), line + 1);
            }
        }
    }
    if skipped > 0 {
        log::warn!(
            "loader: {skipped} malformed rows skipped in {}",
            path.display()
        );
    }
    Ok(rows)
}

/// `channel` followed by one numeric column per attribution model.
/// Unreadable model cells count as 0.
pub fn read_channel_attribution(path: &Path) -> MetricsResult<Vec<ChannelAttributionRecord>> {
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let channel_col = headers.iter().position(|h| h == "channel").unwrap_or(0);
    let models: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != channel_col)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let Some(channel) = record.get(channel_col).filter(|c| !c.is_empty()) else {
            continue;
        };
        let values = models
            .iter()
            .map(|(i, model)| {
                let value = record
                    .get(*i)
                    .and_then(|cell| cell.parse::<f64>().ok())
                    .unwrap_or(0.0);
                (model.clone(), value)
            })
            .collect();
        rows.push(ChannelAttributionRecord {
            channel: channel.to_string(),
            models: values,
        });
    }
    Ok(rows)
}

/// First column holds row labels, remaining headers name the metrics.
/// Unreadable cells count as 0.
pub fn read_correlation_matrix(path: &Path) -> MetricsResult<CorrelationMatrix> {
    let mut rdr = reader(path)?;
    let headers = rdr.headers()?.clone();
    let metrics: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut by_label: HashMap<String, Vec<f64>> = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let Some(label) = record.get(0) else {
            continue;
        };
        let row = (1..=metrics.len())
            .map(|i| record.get(i).and_then(|c| c.parse::<f64>().ok()).unwrap_or(0.0))
            .collect();
        by_label.insert(label.to_string(), row);
    }

    let values = metrics
        .iter()
        .map(|m| {
            by_label.remove(m).unwrap_or_else(|| {
                log::warn!("loader: correlation row for {m} missing, using zeros");
                vec![0.0; metrics.len()]
            })
        })
        .collect();
    Ok(CorrelationMatrix { metrics, values })
}

// ── Cache ────────────────────────────────────────────────────────────────────

/// Modification time and length of a dataset file; `None` when absent.
type FileStamp = Option<(SystemTime, u64)>;

fn stamp(path: &Path) -> FileStamp {
    let meta = std::fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// Datasets read from a directory, re-read only when a file changes.
pub struct DatasetCache {
    data_dir: PathBuf,
    datasets: Datasets,
    stamps: HashMap<DatasetName, FileStamp>,
}

impl DatasetCache {
    /// Nothing is read until the first access.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            datasets: Datasets::default(),
            stamps: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Bring every dataset up to date with the directory and return them.
    pub fn datasets(&mut self) -> MetricsResult<&Datasets> {
        for name in DatasetName::ALL {
            self.ensure(name)?;
        }
        Ok(&self.datasets)
    }

    /// Reload `name` if it was never loaded or its file changed.
    /// Returns true when a reload happened.
    pub fn ensure(&mut self, name: DatasetName) -> MetricsResult<bool> {
        let current = stamp(&self.data_dir.join(name.file_name()));
        if self.stamps.get(&name) == Some(&current) {
            return Ok(false);
        }
        load_into(&mut self.datasets, &self.data_dir, name)?;
        self.stamps.insert(name, current);
        Ok(true)
    }

    /// Forget every stamp so the next access re-reads all files.
    pub fn invalidate_all(&mut self) {
        log::info!("loader: cache invalidated for {}", self.data_dir.display());
        self.stamps.clear();
    }

    /// True when every dataset has been read at least once.
    pub fn is_warm(&self) -> bool {
        DatasetName::ALL.iter().all(|n| self.stamps.contains_key(n))
    }
}
