//! Lead-scoring classifier evaluation tests.

use novamart_core::{
    classifier::{confusion_matrix, evaluate_leads, roc_curve, ModelQuality, RocPoint},
    error::MetricsError,
    records::LeadScoringRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn lead(actual: i64, predicted: i64, probability: f64) -> LeadScoringRecord {
    LeadScoringRecord {
        lead_id: None,
        actual_converted: actual,
        predicted_class: predicted,
        predicted_probability: probability,
    }
}

// ── Confusion matrix ─────────────────────────────────────────────────────────

/// One of each outcome: every metric is exactly one half.
#[test]
fn balanced_outcomes_give_half_everywhere() {
    let cm = confusion_matrix(&[1, 1, 0, 0], &[1, 0, 0, 1]).unwrap();
    assert_eq!((cm.tn, cm.fp, cm.fn_, cm.tp), (1, 1, 1, 1));
    let m = cm.metrics();
    for (name, value) in [
        ("sensitivity", m.sensitivity),
        ("specificity", m.specificity),
        ("precision", m.precision),
        ("accuracy", m.accuracy),
        ("f1", m.f1_score),
    ] {
        assert!(close(value, 0.5), "{name} should be 0.5, got {value}");
    }
}

/// The four cells always partition the input.
#[test]
fn cells_sum_to_input_length() {
    let actual = [1, 0, 1, 1, 0, 0, 0, 1, 0];
    let predicted = [1, 1, 0, 1, 0, 0, 1, 1, 0];
    let cm = confusion_matrix(&actual, &predicted).unwrap();
    assert_eq!(cm.total(), actual.len() as u64);
    assert_eq!(cm.as_grid(), [[3, 2], [1, 3]]);
}

/// No predicted positives: precision and F1 fall back to 0.
#[test]
fn zero_denominators_yield_zero() {
    let cm = confusion_matrix(&[1, 0], &[0, 0]).unwrap();
    assert_eq!(cm.precision(), 0.0);
    assert_eq!(cm.f1_score(), 0.0);
    assert_eq!(cm.sensitivity(), 0.0);
    assert_eq!(cm.specificity(), 1.0);
}

#[test]
fn contract_violations_are_errors() {
    assert!(matches!(
        confusion_matrix(&[1, 0, 1], &[1, 0]),
        Err(MetricsError::ShapeMismatch { left: 3, right: 2 })
    ));
    assert!(matches!(
        confusion_matrix(&[1, 2], &[1, 0]),
        Err(MetricsError::InvalidLabel { index: 1, value: 2 })
    ));
    assert!(matches!(
        roc_curve(&[1, 0], &[0.5, 1.5]),
        Err(MetricsError::InvalidProbability { index: 1, .. })
    ));
    assert!(matches!(
        roc_curve(&[1, 0], &[-0.1, 0.5]),
        Err(MetricsError::InvalidProbability { index: 0, .. })
    ));
    assert!(matches!(
        roc_curve(&[1, 1], &[0.2, 0.9]),
        Err(MetricsError::DegenerateLabels { label: 1 })
    ));
    assert!(matches!(
        roc_curve(&[], &[]),
        Err(MetricsError::EmptyInput { .. })
    ));
}

// ── ROC ──────────────────────────────────────────────────────────────────────

/// The curve runs from (0,0) to (1,1) with non-decreasing rates.
#[test]
fn roc_spans_unit_square() {
    let actual = [1, 0, 1, 0, 1, 0, 0, 1];
    let probs = [0.9, 0.7, 0.65, 0.4, 0.4, 0.2, 0.1, 0.05];
    let curve = roc_curve(&actual, &probs).unwrap();
    let points: Vec<RocPoint> = curve.points().collect();

    let first = points.first().unwrap();
    let last = points.last().unwrap();
    assert_eq!((first.fpr, first.tpr), (0.0, 0.0));
    assert!(first.threshold.is_infinite());
    assert_eq!((last.fpr, last.tpr), (1.0, 1.0));

    for pair in points.windows(2) {
        assert!(pair[1].fpr >= pair[0].fpr && pair[1].tpr >= pair[0].tpr);
        assert!(pair[1].threshold < pair[0].threshold);
    }
    let auc = curve.auc();
    assert!((0.0..=1.0).contains(&auc), "AUC {auc} out of range");
}

/// Perfect separation scores AUC 1; reversed scores AUC 0.
#[test]
fn auc_extremes() {
    let probs = [0.9, 0.8, 0.3, 0.1];
    let perfect = roc_curve(&[1, 1, 0, 0], &probs).unwrap();
    assert!(close(perfect.auc(), 1.0));
    let reversed = roc_curve(&[0, 0, 1, 1], &probs).unwrap();
    assert!(close(reversed.auc(), 0.0));
}

/// Youden's J peaks where every positive and no negative is selected.
#[test]
fn optimal_threshold_maximises_youden_j() {
    let curve = roc_curve(&[1, 1, 0, 0], &[0.9, 0.8, 0.3, 0.1]).unwrap();
    let best = curve.optimal_threshold();
    assert!(close(best.threshold, 0.8));
    assert!(close(best.youden_j(), 1.0));
}

/// When two thresholds share the best J, the higher one (seen first) wins.
#[test]
fn optimal_threshold_keeps_first_of_tied_maxima() {
    let curve = roc_curve(&[1, 0, 1, 0], &[0.9, 0.8, 0.7, 0.1]).unwrap();
    let best = curve.optimal_threshold();
    assert!(close(best.youden_j(), 0.5));
    assert_eq!(best.threshold, 0.9);
}

#[test]
fn evaluate_leads_bundles_everything() {
    let leads = vec![
        lead(1, 1, 0.92),
        lead(1, 1, 0.81),
        lead(0, 0, 0.35),
        lead(0, 1, 0.55),
        lead(1, 0, 0.45),
        lead(0, 0, 0.12),
    ];
    let ev = evaluate_leads(&leads).unwrap();
    assert_eq!(ev.confusion.total(), 6);
    assert_eq!(ev.metrics, ev.confusion.metrics());
    assert!(close(ev.roc.auc, 8.0 / 9.0), "auc {}", ev.roc.auc);
    assert_eq!(ev.roc.quality, ModelQuality::Excellent);
    assert_eq!(ev.roc.points.first().map(|p| p.tpr), Some(0.0));
}
