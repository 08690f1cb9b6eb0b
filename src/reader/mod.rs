//! Read-only chain data sources
//!
//! The engine never talks to the chain directly; it consumes snapshots
//! through the two reader traits below. Readers are injected, side-effect
//! free, and every call is bounded by a timeout: a slow or failed read
//! becomes `Error::DataUnavailable` for that query, never a zero value.

pub mod graph;

use crate::error::{Error, Result};
use crate::tokens::TokenMeta;
use alloy::primitives::U256;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub use graph::GraphReader;

/// Snapshot of a pool's current price state.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolState {
    /// Current price as a discrete tick index. Used for range checks;
    /// `sqrt_price_x96` is the authoritative price for amount math.
    pub current_tick: i32,
    /// Q64.96 sqrt-price.
    pub sqrt_price_x96: U256,
    pub token0: TokenMeta,
    pub token1: TokenMeta,
    /// Fee in hundredths of a basis point (e.g. 500 = 0.05%).
    pub fee_tier: u32,
}

/// Snapshot of a single concentrated-liquidity position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    pub pool_id: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Fees accrued but not yet withdrawn. `None` when the data source
    /// cannot supply them; never conflated with an actual zero balance.
    pub uncollected_fees0: Option<U256>,
    pub uncollected_fees1: Option<U256>,
}

impl PositionState {
    /// A position with zero liquidity is closed; it may still be queried
    /// for historical reporting but holds nothing.
    pub fn is_active(&self) -> bool {
        self.liquidity > 0
    }
}

/// Supplies current pool price state.
#[async_trait]
pub trait PoolStateReader: Send + Sync {
    async fn pool_state(&self, pool_id: &str) -> Result<PoolState>;
}

/// Supplies position range, liquidity and uncollected fees.
#[async_trait]
pub trait PositionStateReader: Send + Sync {
    async fn position_state(&self, position_id: &str) -> Result<PositionState>;
}

/// Bounds a read with a timeout; expiry is reported as `DataUnavailable`,
/// identical to any other failed read.
pub async fn read_with_timeout<T, F>(what: &str, timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::DataUnavailable(format!(
            "{what} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_maps_to_data_unavailable() {
        let result: Result<()> = read_with_timeout("pool state", Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(Error::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fast_read_passes_through() {
        let result =
            read_with_timeout("pool state", Duration::from_secs(1), async { Ok(42u32) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_zero_liquidity_position_inactive() {
        let position = PositionState {
            pool_id: "0xpool".into(),
            tick_lower: -1000,
            tick_upper: 1000,
            liquidity: 0,
            uncollected_fees0: Some(U256::ZERO),
            uncollected_fees1: Some(U256::ZERO),
        };
        assert!(!position.is_active());
    }
}
