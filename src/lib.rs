//! LP Position Risk Monitor
//!
//! Valuation and risk engine for concentrated-liquidity positions:
//! - Converts a position's liquidity and tick range into the token
//!   holdings it represents at the pool's current price
//! - Classifies in-range status and distance from the range edges
//! - Scores urgency (0-100) and concentration per position
//! - Aggregates a fleet of positions into one portfolio verdict
//!
//! # Design
//!
//! - All amount math runs on wide fixed-point integers; floats exist only
//!   at the display boundary
//! - Chain data arrives through injected read-only reader traits; every
//!   read is timeout-bounded and a failed read is reported as
//!   unavailable, never as zero
//! - One unreadable position never hides the status of the others

pub mod config;
pub mod engine;
pub mod math;
pub mod portfolio;
pub mod range;
pub mod reader;
pub mod risk;
pub mod tokens;
pub mod valuation;

mod error;

// Re-export commonly used types
pub use config::{Config, Network, WatchedPosition, GRAPH_API_KEY_ENV};
pub use engine::MonitorEngine;
pub use error::{Error, Result};
pub use portfolio::{PortfolioSnapshot, PositionReport};
pub use risk::{Concentration, RiskLevel};
