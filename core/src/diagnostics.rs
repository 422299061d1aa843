//! Lead-model diagnostics: feature importance and learning curves.

use crate::records::{FeatureImportanceRecord, LearningCurveRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub rank: usize,
    pub feature: String,
    pub importance: f64,
    /// `[importance - std_dev, importance + std_dev]` when a spread is known.
    pub bounds: Option<(f64, f64)>,
}

/// Features ordered by importance. Rank 1 is the first entry.
pub fn rank_features(records: &[FeatureImportanceRecord], descending: bool) -> Vec<RankedFeature> {
    let mut sorted: Vec<&FeatureImportanceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        let ord = a.importance.total_cmp(&b.importance);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, r)| RankedFeature {
            rank: i + 1,
            feature: r.feature.clone(),
            importance: r.importance,
            bounds: r.std_dev.map(|sd| (r.importance - sd, r.importance + sd)),
        })
        .collect()
}

/// The `n` most important features.
pub fn top_features(records: &[FeatureImportanceRecord], n: usize) -> Vec<RankedFeature> {
    let mut ranked = rank_features(records, true);
    ranked.truncate(n);
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveBand {
    pub training_set_size: u64,
    pub training_score: f64,
    pub validation_score: f64,
    pub training_band: (f64, f64),
    pub validation_band: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurveSummary {
    /// Training minus validation score at the largest set size.
    pub final_gap: f64,
    /// Gap at the smallest set size.
    pub initial_gap: f64,
    pub converging: bool,
    pub points: Vec<CurveBand>,
}

/// Gap and band summary, `None` for an empty curve.
/// Missing standard deviations give zero-width bands.
pub fn learning_curve_summary(records: &[LearningCurveRecord]) -> Option<LearningCurveSummary> {
    let mut sorted: Vec<&LearningCurveRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.training_set_size);

    let first = sorted.first()?;
    let last = sorted.last()?;
    let initial_gap = first.training_score - first.validation_score;
    let final_gap = last.training_score - last.validation_score;

    let points = sorted
        .iter()
        .map(|r| {
            let t_sd = r.training_std.unwrap_or(0.0);
            let v_sd = r.validation_std.unwrap_or(0.0);
            CurveBand {
                training_set_size: r.training_set_size,
                training_score: r.training_score,
                validation_score: r.validation_score,
                training_band: (r.training_score - t_sd, r.training_score + t_sd),
                validation_band: (r.validation_score - v_sd, r.validation_score + v_sd),
            }
        })
        .collect();

    Some(LearningCurveSummary {
        final_gap,
        initial_gap,
        converging: final_gap.abs() < initial_gap.abs(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(size: u64, train: f64, valid: f64) -> LearningCurveRecord {
        LearningCurveRecord {
            training_set_size: size,
            training_score: train,
            validation_score: valid,
            training_std: None,
            validation_std: Some(0.02),
        }
    }

    #[test]
    fn converging_when_gap_shrinks() {
        let records = vec![curve(1000, 0.92, 0.84), curve(100, 0.99, 0.70)];
        let summary = learning_curve_summary(&records).unwrap();
        assert!(summary.converging);
        assert!((summary.final_gap - 0.08).abs() < 1e-9);
        assert_eq!(summary.points[0].training_set_size, 100);
        assert_eq!(summary.points[0].training_band, (0.99, 0.99));
    }

    #[test]
    fn empty_curve_has_no_summary() {
        assert!(learning_curve_summary(&[]).is_none());
    }
}
