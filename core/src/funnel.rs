//! Funnel transition analysis.
//!
//! Stages are reordered into the canonical funnel order before any
//! transition is computed, whatever order the rows arrive in.

use crate::{
    error::{MetricsError, MetricsResult},
    records::FunnelStageRecord,
    types::safe_ratio,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FunnelStage {
    Awareness,
    Interest,
    Consideration,
    Evaluation,
    Purchase,
}

impl FunnelStage {
    /// Canonical order, top of funnel first.
    pub const ORDER: [FunnelStage; 5] = [
        Self::Awareness,
        Self::Interest,
        Self::Consideration,
        Self::Evaluation,
        Self::Purchase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Awareness => "Awareness",
            Self::Interest => "Interest",
            Self::Consideration => "Consideration",
            Self::Evaluation => "Evaluation",
            Self::Purchase => "Purchase",
        }
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FunnelStage {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ORDER
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| MetricsError::UnknownStage {
                name: trimmed.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelTransition {
    pub from: FunnelStage,
    pub to: FunnelStage,
    /// Percent of `from` visitors that reached `to`.
    pub conversion_rate: f64,
    /// `from` visitors minus `to` visitors. Negative when the funnel widens.
    pub drop_off: i64,
    pub remaining: u64,
}

impl FunnelTransition {
    /// True when the later stage has more visitors than the earlier one.
    pub fn is_inverted(&self) -> bool {
        self.drop_off < 0
    }

    /// Percent of `from` visitors lost at this step.
    pub fn drop_off_rate(&self) -> f64 {
        100.0 - self.conversion_rate
    }
}

/// Parse and sort rows into canonical order. Duplicate stages keep
/// their input order.
pub fn canonical_order(records: &[FunnelStageRecord]) -> MetricsResult<Vec<(FunnelStage, u64)>> {
    let mut stages = records
        .iter()
        .map(|r| Ok((r.stage.parse::<FunnelStage>()?, r.visitors)))
        .collect::<MetricsResult<Vec<_>>>()?;
    stages.sort_by_key(|(stage, _)| *stage);
    Ok(stages)
}

/// One transition per adjacent pair of stages, `n - 1` in total.
pub fn analyze_transitions(records: &[FunnelStageRecord]) -> MetricsResult<Vec<FunnelTransition>> {
    let stages = canonical_order(records)?;

    let transitions: Vec<FunnelTransition> = stages
        .windows(2)
        .map(|pair| {
            let (from, current) = pair[0];
            let (to, next) = pair[1];
            FunnelTransition {
                from,
                to,
                conversion_rate: safe_ratio(next as f64, current as f64) * 100.0,
                drop_off: current as i64 - next as i64,
                remaining: next,
            }
        })
        .collect();

    for t in transitions.iter().filter(|t| t.is_inverted()) {
        log::warn!(
            "funnel: {} has {} visitors, more than {} ({}); reporting drop-off {}",
            t.to,
            t.remaining,
            t.from,
            t.remaining as i64 + t.drop_off,
            t.drop_off,
        );
    }

    Ok(transitions)
}

/// The transition losing the most visitors in absolute terms.
pub fn biggest_drop_off(transitions: &[FunnelTransition]) -> Option<&FunnelTransition> {
    transitions.iter().fold(None, |best, t| match best {
        Some(b) if b.drop_off >= t.drop_off => Some(b),
        _ => Some(t),
    })
}

/// Last-stage visitors as a percent of first-stage visitors.
pub fn overall_conversion_rate(records: &[FunnelStageRecord]) -> MetricsResult<f64> {
    let stages = canonical_order(records)?;
    match (stages.first(), stages.last()) {
        (Some((_, first)), Some((_, last))) => Ok(safe_ratio(*last as f64, *first as f64) * 100.0),
        _ => Ok(0.0),
    }
}
