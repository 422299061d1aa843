//! Binary classifier evaluation for the lead-scoring model.
//!
//! Contract violations (mismatched lengths, labels outside {0,1},
//! probabilities outside [0,1], single-class ground truth) are errors.
//! They are never defaulted.

use crate::{
    error::{MetricsError, MetricsResult},
    records::LeadScoringRecord,
};
use serde::{Deserialize, Serialize};

// ── Confusion matrix ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub tp: u64,
}

impl ConfusionMatrix {
    pub fn total(&self) -> u64 {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// TP / (TP + FN). Also the true-positive rate.
    pub fn sensitivity(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// TN / (TN + FP).
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    /// TP / (TP + FP).
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.sensitivity();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// Row-major `[[tn, fp], [fn, tp]]`, actual on rows, predicted on columns.
    pub fn as_grid(&self) -> [[u64; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn metrics(&self) -> ClassifierMetrics {
        ClassifierMetrics {
            sensitivity: self.sensitivity(),
            specificity: self.specificity(),
            precision: self.precision(),
            accuracy: self.accuracy(),
            f1_score: self.f1_score(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierMetrics {
    pub sensitivity: f64,
    pub specificity: f64,
    pub precision: f64,
    pub accuracy: f64,
    pub f1_score: f64,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Tally actual vs predicted labels into a 2×2 contingency table.
pub fn confusion_matrix(actual: &[i64], predicted: &[i64]) -> MetricsResult<ConfusionMatrix> {
    check_shape(actual.len(), predicted.len())?;

    let mut cm = ConfusionMatrix::default();
    for (index, (&a, &p)) in actual.iter().zip(predicted).enumerate() {
        match (label(index, a)?, label(index, p)?) {
            (false, false) => cm.tn += 1,
            (false, true) => cm.fp += 1,
            (true, false) => cm.fn_ += 1,
            (true, true) => cm.tp += 1,
        }
    }
    Ok(cm)
}

fn check_shape(left: usize, right: usize) -> MetricsResult<()> {
    if left != right {
        return Err(MetricsError::ShapeMismatch { left, right });
    }
    Ok(())
}

fn label(index: usize, value: i64) -> MetricsResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(MetricsError::InvalidLabel { index, value }),
    }
}

// ── ROC ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// Scores `>= threshold` are predicted positive. The opening point
    /// uses `+inf`, so nothing is predicted positive.
    pub threshold: f64,
}

impl RocPoint {
    /// Youden's J statistic.
    pub fn youden_j(&self) -> f64 {
        self.tpr - self.fpr
    }
}

/// Validated scores, sorted by probability descending.
#[derive(Debug, Clone)]
pub struct RocCurve {
    scored: Vec<(f64, bool)>,
    positives: u64,
    negatives: u64,
}

/// Build a ROC curve from ground-truth labels and predicted probabilities.
pub fn roc_curve(actual: &[i64], probabilities: &[f64]) -> MetricsResult<RocCurve> {
    check_shape(actual.len(), probabilities.len())?;
    if actual.is_empty() {
        return Err(MetricsError::EmptyInput {
            operation: "roc_curve",
        });
    }

    let mut scored = Vec::with_capacity(actual.len());
    for (index, (&a, &p)) in actual.iter().zip(probabilities).enumerate() {
        let positive = label(index, a)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(MetricsError::InvalidProbability { index, value: p });
        }
        scored.push((p, positive));
    }

    let positives = scored.iter().filter(|(_, pos)| *pos).count() as u64;
    let negatives = scored.len() as u64 - positives;
    if positives == 0 || negatives == 0 {
        return Err(MetricsError::DegenerateLabels {
            label: u8::from(positives > 0),
        });
    }

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(RocCurve {
        scored,
        positives,
        negatives,
    })
}

impl RocCurve {
    /// Walk the curve from (0,0) to (1,1), one point per distinct score.
    /// Each call starts a fresh walk over the same points.
    pub fn points(&self) -> RocPoints<'_> {
        RocPoints {
            curve: self,
            next: 0,
            tp: 0,
            fp: 0,
            started: false,
        }
    }

    /// Area under the curve by the trapezoidal rule.
    pub fn auc(&self) -> f64 {
        let mut area = 0.0;
        let mut prev: Option<RocPoint> = None;
        for point in self.points() {
            if let Some(p) = prev {
                area += (point.fpr - p.fpr) * (point.tpr + p.tpr) / 2.0;
            }
            prev = Some(point);
        }
        area
    }

    /// The point maximizing Youden's J. The first maximum wins.
    pub fn optimal_threshold(&self) -> RocPoint {
        let mut points = self.points();
        // points() always yields the opening (0,0) point.
        let mut best = points.next().unwrap_or(RocPoint {
            fpr: 0.0,
            tpr: 0.0,
            threshold: f64::INFINITY,
        });
        for point in points {
            if point.youden_j() > best.youden_j() {
                best = point;
            }
        }
        best
    }

    pub fn summary(&self) -> RocSummary {
        let auc = self.auc();
        RocSummary {
            auc,
            optimal: self.optimal_threshold(),
            quality: ModelQuality::from_auc(auc),
            points: self.points().collect(),
        }
    }
}

/// Lazy walk over a [`RocCurve`].
pub struct RocPoints<'a> {
    curve: &'a RocCurve,
    next: usize,
    tp: u64,
    fp: u64,
    started: bool,
}

impl Iterator for RocPoints<'_> {
    type Item = RocPoint;

    fn next(&mut self) -> Option<RocPoint> {
        if !self.started {
            self.started = true;
            return Some(RocPoint {
                fpr: 0.0,
                tpr: 0.0,
                threshold: f64::INFINITY,
            });
        }

        let scored = &self.curve.scored;
        let threshold = scored.get(self.next)?.0;
        while let Some(&(score, positive)) = scored.get(self.next) {
            if score != threshold {
                break;
            }
            if positive {
                self.tp += 1;
            } else {
                self.fp += 1;
            }
            self.next += 1;
        }

        Some(RocPoint {
            fpr: self.fp as f64 / self.curve.negatives as f64,
            tpr: self.tp as f64 / self.curve.positives as f64,
            threshold,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelQuality {
    Excellent,
    Good,
    Fair,
}

impl ModelQuality {
    pub fn from_auc(auc: f64) -> Self {
        if auc > 0.8 {
            Self::Excellent
        } else if auc > 0.7 {
            Self::Good
        } else {
            Self::Fair
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocSummary {
    pub auc: f64,
    pub optimal: RocPoint,
    pub quality: ModelQuality,
    pub points: Vec<RocPoint>,
}

// ── Lead scoring convenience ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadModelEvaluation {
    pub confusion: ConfusionMatrix,
    pub metrics: ClassifierMetrics,
    pub roc: RocSummary,
}

/// Confusion matrix and ROC summary for lead-scoring rows.
pub fn evaluate_leads(records: &[LeadScoringRecord]) -> MetricsResult<LeadModelEvaluation> {
    let actual: Vec<i64> = records.iter().map(|r| r.actual_converted).collect();
    let predicted: Vec<i64> = records.iter().map(|r| r.predicted_class).collect();
    let probabilities: Vec<f64> = records.iter().map(|r| r.predicted_probability).collect();

    let confusion = confusion_matrix(&actual, &predicted)?;
    let roc = roc_curve(&actual, &probabilities)?.summary();

    Ok(LeadModelEvaluation {
        confusion,
        metrics: confusion.metrics(),
        roc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_scores_collapse_into_one_point() {
        let curve = roc_curve(&[1, 0, 1, 0], &[0.5, 0.5, 0.5, 0.5]).unwrap();
        let points: Vec<RocPoint> = curve.points().collect();
        assert_eq!(points.len(), 2);
        assert_eq!((points[1].fpr, points[1].tpr), (1.0, 1.0));
        assert!((curve.auc() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn nan_probability_is_rejected() {
        let err = roc_curve(&[1, 0], &[f64::NAN, 0.2]).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidProbability { index: 0, .. }));
    }

    #[test]
    fn quality_bands() {
        assert_eq!(ModelQuality::from_auc(0.85), ModelQuality::Excellent);
        assert_eq!(ModelQuality::from_auc(0.8), ModelQuality::Good);
        assert_eq!(ModelQuality::from_auc(0.7), ModelQuality::Fair);
    }
}
