//! Risk scoring for individual positions
//!
//! Maps a position's range status and edge distance to a discrete risk
//! level and a 0-100 urgency score used to prioritize operator attention.
//! Concentration rates how narrow the range is; it is a property of the
//! position's design, not its current health, and is reported separately.

use crate::range::RangeStatus;
use serde::{Deserialize, Serialize};

/// How urgently a position needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// How narrow the position's range is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Concentration {
    Low,
    Medium,
    High,
}

impl Concentration {
    pub fn name(&self) -> &'static str {
        match self {
            Concentration::Low => "LOW",
            Concentration::Medium => "MEDIUM",
            Concentration::High => "HIGH",
        }
    }
}

/// Risk verdict for one position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// 0-100; higher means rebalance sooner.
    pub urgency_score: u8,
    pub concentration: Concentration,
}

/// Scores a position from its range status and range width in ticks.
///
/// The urgency ladder is evaluated in strict precedence order: out of
/// range dominates everything, then progressively wider edge-distance
/// bands step the score down.
pub fn assess(status: &RangeStatus, range_width: i32) -> RiskAssessment {
    let (risk_level, urgency_score) = match status.edge_distance_percent {
        None => (RiskLevel::Critical, 100),
        Some(d) if d < 5.0 => (RiskLevel::High, 90),
        Some(d) if d < 10.0 => (RiskLevel::High, 70),
        Some(d) if d < 15.0 => (RiskLevel::Medium, 50),
        Some(d) if d < 20.0 => (RiskLevel::Medium, 30),
        Some(_) => (RiskLevel::Low, 10),
    };
    RiskAssessment {
        risk_level,
        urgency_score,
        concentration: concentration_for_width(range_width),
    }
}

/// Concentration from range width alone: narrower ranges earn more fees
/// per unit of capital but fall out of range faster.
pub fn concentration_for_width(range_width: i32) -> Concentration {
    if range_width < 500 {
        Concentration::High
    } else if range_width < 1000 {
        Concentration::Medium
    } else {
        Concentration::Low
    }
}
