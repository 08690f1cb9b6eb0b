//! Portfolio-level aggregation
//!
//! Rolls up independent per-position reports into one fleet-level view.
//! A single unreadable position never aborts the batch: failures are
//! excluded from the ratio and mean denominators and surfaced in the
//! errors list, so a missing read cannot hide a CRITICAL status elsewhere.

use crate::risk::{Concentration, RiskLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fully evaluated position, ready for display or downstream automation.
#[derive(Debug, Clone, Serialize)]
pub struct PositionReport {
    pub position_id: String,
    pub pool_id: String,
    /// Display pair, e.g. "WETH/USDC 0.05%"
    pub pair: String,
    /// Human-scaled holdings at the current price (truncated decimals)
    pub amount0: String,
    pub amount1: String,
    /// `None` when the data source cannot supply uncollected fees
    pub uncollected_fees0: Option<String>,
    pub uncollected_fees1: Option<String>,
    pub in_range: bool,
    pub edge_distance_percent: Option<f64>,
    pub risk_level: RiskLevel,
    pub urgency_score: u8,
    pub concentration: Concentration,
}

/// A position that could not be evaluated.
#[derive(Debug, Clone, Serialize)]
pub struct PositionFailure {
    pub position_id: String,
    pub error: String,
}

/// Count of positions per risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl RiskDistribution {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
        }
    }
}

/// Fleet-level view over all watched positions at one point in time.
/// Ephemeral; recomputed on every query.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSnapshot {
    pub total_positions: usize,
    /// Positions that could actually be evaluated; the denominator for
    /// ratio and mean below.
    pub evaluable: usize,
    pub out_of_range_ratio: f64,
    pub avg_urgency: f64,
    pub risk_distribution: RiskDistribution,
    pub overall_risk: RiskLevel,
    /// Evaluated positions, most urgent first.
    pub positions: Vec<PositionReport>,
    pub errors: Vec<PositionFailure>,
    pub generated_at: DateTime<Utc>,
}

/// Aggregates per-position outcomes into a portfolio snapshot.
///
/// An empty evaluable set yields zero ratios and an overall Low verdict,
/// with any failures still reported.
pub fn aggregate(
    outcomes: Vec<Result<PositionReport, PositionFailure>>,
) -> PortfolioSnapshot {
    let total_positions = outcomes.len();
    let mut positions = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(report) => positions.push(report),
            Err(failure) => errors.push(failure),
        }
    }

    let evaluable = positions.len();
    let mut distribution = RiskDistribution::default();
    let mut out_of_range = 0usize;
    let mut urgency_sum = 0u32;
    for report in &positions {
        distribution.record(report.risk_level);
        if !report.in_range {
            out_of_range += 1;
        }
        urgency_sum += u32::from(report.urgency_score);
    }

    let (out_of_range_ratio, avg_urgency) = if evaluable == 0 {
        (0.0, 0.0)
    } else {
        (
            out_of_range as f64 / evaluable as f64,
            f64::from(urgency_sum) / evaluable as f64,
        )
    };

    // Stable presentation order: most urgent first.
    positions.sort_by(|a, b| {
        b.urgency_score
            .cmp(&a.urgency_score)
            .then_with(|| a.position_id.cmp(&b.position_id))
    });

    PortfolioSnapshot {
        total_positions,
        evaluable,
        out_of_range_ratio,
        avg_urgency,
        risk_distribution: distribution,
        overall_risk: overall_verdict(&distribution),
        positions,
        errors,
        generated_at: Utc::now(),
    }
}

/// Strict precedence: any CRITICAL dominates; more than one HIGH escalates
/// to HIGH; a single HIGH or more than two MEDIUM is MEDIUM; else LOW.
fn overall_verdict(distribution: &RiskDistribution) -> RiskLevel {
    if distribution.critical > 0 {
        RiskLevel::Critical
    } else if distribution.high > 1 {
        RiskLevel::High
    } else if distribution.high > 0 || distribution.medium > 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
