//! Pearson correlation and the precomputed metric correlation matrix.

use crate::{
    error::{MetricsError, MetricsResult},
    records::CorrelationMatrix,
};
use serde::{Deserialize, Serialize};

/// Pearson's r for two equally long samples.
///
/// `Ok(None)` when r is undefined: fewer than two points, or either
/// sample has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> MetricsResult<Option<f64>> {
    if xs.len() != ys.len() {
        return Err(MetricsError::ShapeMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }
    let n = xs.len();
    if n < 2 {
        return Ok(None);
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(None);
    }
    Ok(Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub left: String,
    pub right: String,
    pub r: f64,
}

impl CorrelationMatrix {
    /// Correlation between two named metrics.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.metrics.iter().position(|m| m == row)?;
        let j = self.metrics.iter().position(|m| m == col)?;
        self.values.get(i)?.get(j).copied()
    }

    /// The `n` off-diagonal pairs with the largest |r|, each pair once.
    pub fn strongest_pairs(&self, n: usize) -> Vec<CorrelatedPair> {
        let mut pairs = Vec::new();
        for (i, row) in self.values.iter().enumerate() {
            for (j, &r) in row.iter().enumerate().skip(i + 1) {
                let (Some(left), Some(right)) = (self.metrics.get(i), self.metrics.get(j)) else {
                    continue;
                };
                pairs.push(CorrelatedPair {
                    left: left.clone(),
                    right: right.clone(),
                    r,
                });
            }
        }
        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs.truncate(n);
        pairs
    }
}
