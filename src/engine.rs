//! Evaluation engine
//!
//! Fans out independent reads for every watched position, runs the pure
//! valuation pipeline (holdings -> range -> risk) on each snapshot, and
//! aggregates the outcomes. Reads are concurrent and individually
//! timeout-bounded; aggregation waits for all of them because the
//! portfolio denominators depend on the final count.

use crate::config::WatchedPosition;
use crate::error::{Error, Result};
use crate::portfolio::{self, PortfolioSnapshot, PositionFailure, PositionReport};
use crate::range;
use crate::reader::{
    read_with_timeout, PoolState, PoolStateReader, PositionState, PositionStateReader,
};
use crate::risk;
use crate::valuation::{format_token_amount, token_amounts};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives position evaluation against an injected chain reader.
pub struct MonitorEngine<R> {
    reader: R,
    read_timeout: Duration,
}

impl<R> MonitorEngine<R>
where
    R: PoolStateReader + PositionStateReader,
{
    pub fn new(reader: R, read_timeout: Duration) -> Self {
        Self {
            reader,
            read_timeout,
        }
    }

    /// Evaluates every watched position concurrently and aggregates the
    /// results.
    ///
    /// Per-position failures (unreadable data, malformed ranges) are
    /// recovered locally and reported in the snapshot's errors list.
    /// `Error::Overflow` means the math itself is broken and aborts the
    /// whole batch.
    pub async fn evaluate_all(&self, watched: &[WatchedPosition]) -> Result<PortfolioSnapshot> {
        info!(positions = watched.len(), "evaluating portfolio");
        let evaluations = watched.iter().map(|w| self.evaluate_one(w));
        let results = futures::future::join_all(evaluations).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (w, result) in watched.iter().zip(results) {
            match result {
                Ok(report) => outcomes.push(Ok(report)),
                Err(error) if error.is_per_position() => {
                    warn!(position = %w.position_id, %error, "position skipped");
                    outcomes.push(Err(PositionFailure {
                        position_id: w.position_id.clone(),
                        error: error.to_string(),
                    }));
                }
                Err(fatal) => return Err(fatal),
            }
        }

        let snapshot = portfolio::aggregate(outcomes);
        info!(
            evaluable = snapshot.evaluable,
            failed = snapshot.errors.len(),
            overall = snapshot.overall_risk.name(),
            "portfolio evaluated"
        );
        Ok(snapshot)
    }

    /// Evaluates one position by id, reading its pool through the reader.
    pub async fn evaluate_single(&self, position_id: &str) -> Result<PositionReport> {
        let position = read_with_timeout(
            "position state",
            self.read_timeout,
            self.reader.position_state(position_id),
        )
        .await?;
        let pool = read_with_timeout(
            "pool state",
            self.read_timeout,
            self.reader.pool_state(&position.pool_id),
        )
        .await?;
        evaluate_position(position_id, &pool, &position)
    }

    async fn evaluate_one(&self, watched: &WatchedPosition) -> Result<PositionReport> {
        let report = self.evaluate_single(&watched.position_id).await?;
        if report.pool_id != watched.pool_id {
            warn!(
                position = %watched.position_id,
                configured = %watched.pool_id,
                actual = %report.pool_id,
                "configured pool does not match position's pool"
            );
        }
        Ok(report)
    }
}

/// Pure valuation pipeline for one position snapshot. Identical inputs
/// always yield an identical report.
pub fn evaluate_position(
    position_id: &str,
    pool: &PoolState,
    position: &PositionState,
) -> Result<PositionReport> {
    if position.tick_lower >= position.tick_upper {
        return Err(Error::InvalidRange {
            lower: position.tick_lower,
            upper: position.tick_upper,
        });
    }

    let amounts = token_amounts(
        position.liquidity,
        position.tick_lower,
        position.tick_upper,
        pool.current_tick,
        pool.sqrt_price_x96,
    )?;
    let status = range::classify(position.tick_lower, position.tick_upper, pool.current_tick);
    let assessment = risk::assess(&status, position.tick_upper - position.tick_lower);

    debug!(
        position = position_id,
        in_range = status.in_range,
        urgency = assessment.urgency_score,
        "position evaluated"
    );

    Ok(PositionReport {
        position_id: position_id.to_string(),
        pool_id: position.pool_id.clone(),
        pair: format!(
            "{}/{} {}%",
            pool.token0.symbol,
            pool.token1.symbol,
            pool.fee_tier as f64 / 10_000.0
        ),
        amount0: format_token_amount(amounts.amount0, pool.token0.decimals),
        amount1: format_token_amount(amounts.amount1, pool.token1.decimals),
        uncollected_fees0: position
            .uncollected_fees0
            .map(|fees| format_token_amount(fees, pool.token0.decimals)),
        uncollected_fees1: position
            .uncollected_fees1
            .map(|fees| format_token_amount(fees, pool.token1.decimals)),
        in_range: status.in_range,
        edge_distance_percent: status.edge_distance_percent,
        risk_level: assessment.risk_level,
        urgency_score: assessment.urgency_score,
        concentration: assessment.concentration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::sqrt_price_at_tick;
    use crate::risk::RiskLevel;
    use crate::tokens::TokenMeta;
    use alloy::primitives::U256;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MockReader {
        pools: HashMap<String, PoolState>,
        positions: HashMap<String, PositionState>,
    }

    #[async_trait]
    impl PoolStateReader for MockReader {
        async fn pool_state(&self, pool_id: &str) -> Result<PoolState> {
            self.pools
                .get(pool_id)
                .cloned()
                .ok_or_else(|| Error::DataUnavailable(format!("no pool {pool_id}")))
        }
    }

    #[async_trait]
    impl PositionStateReader for MockReader {
        async fn position_state(&self, position_id: &str) -> Result<PositionState> {
            self.positions
                .get(position_id)
                .cloned()
                .ok_or_else(|| Error::DataUnavailable(format!("no position {position_id}")))
        }
    }

    fn pool_at_tick(tick: i32) -> PoolState {
        PoolState {
            current_tick: tick,
            sqrt_price_x96: sqrt_price_at_tick(tick).unwrap(),
            token0: TokenMeta::new("WETH", 18),
            token1: TokenMeta::new("USDC", 6),
            fee_tier: 500,
        }
    }

    fn position(tick_lower: i32, tick_upper: i32, liquidity: u128) -> PositionState {
        PositionState {
            pool_id: "0xpool".to_string(),
            tick_lower,
            tick_upper,
            liquidity,
            uncollected_fees0: None,
            uncollected_fees1: None,
        }
    }

    fn watched(ids: &[&str]) -> Vec<WatchedPosition> {
        ids.iter()
            .map(|id| WatchedPosition {
                position_id: id.to_string(),
                pool_id: "0xpool".to_string(),
            })
            .collect()
    }

    fn engine_with(
        pools: Vec<(&str, PoolState)>,
        positions: Vec<(&str, PositionState)>,
    ) -> MonitorEngine<MockReader> {
        let reader = MockReader {
            pools: pools
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            positions: positions
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        };
        MonitorEngine::new(reader, Duration::from_secs(1))
    }

    #[test]
    fn test_evaluate_position_deep_in_range() {
        let report =
            evaluate_position("1", &pool_at_tick(0), &position(-1000, 1000, 1_000_000)).unwrap();
        assert!(report.in_range);
        assert_eq!(report.edge_distance_percent, Some(50.0));
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.urgency_score, 10);
    }

    #[test]
    fn test_evaluate_position_out_of_range_below() {
        let report =
            evaluate_position("1", &pool_at_tick(-1500), &position(-1000, 1000, 1_000_000))
                .unwrap();
        assert!(!report.in_range);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert_eq!(report.urgency_score, 100);
        // All value sits in token0 below the range.
        assert_eq!(report.amount1, "0");
        assert_ne!(report.amount0, "0");
    }

    #[test]
    fn test_fees_reported_only_when_known() {
        // A source that cannot supply fees yields no fee figures at all;
        // an actual zero balance is a different answer.
        let mut state = position(-1000, 1000, 1_000_000);
        let report = evaluate_position("1", &pool_at_tick(0), &state).unwrap();
        assert_eq!(report.uncollected_fees0, None);
        assert_eq!(report.uncollected_fees1, None);

        state.uncollected_fees0 = Some(U256::from(1_500_000_000_000_000_000u128));
        state.uncollected_fees1 = Some(U256::from(2_000_000u64));
        let report = evaluate_position("1", &pool_at_tick(0), &state).unwrap();
        assert_eq!(report.uncollected_fees0.as_deref(), Some("1.5"));
        assert_eq!(report.uncollected_fees1.as_deref(), Some("2"));
    }

    #[test]
    fn test_evaluate_position_rejects_malformed_range() {
        assert!(matches!(
            evaluate_position("1", &pool_at_tick(0), &position(1000, -1000, 1)),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreadable_position_among_three() {
        let engine = engine_with(
            vec![("0xpool", pool_at_tick(0))],
            vec![
                ("a", position(-1000, 1000, 1_000_000)),
                // "b" missing: reader returns DataUnavailable
                ("c", position(-2000, -1500, 1_000_000)),
            ],
        );
        let snapshot = engine.evaluate_all(&watched(&["a", "b", "c"])).await.unwrap();
        assert_eq!(snapshot.total_positions, 3);
        assert_eq!(snapshot.evaluable, 2);
        assert_eq!(snapshot.errors.len(), 1);
        assert_eq!(snapshot.errors[0].position_id, "b");
        // Aggregates computed only over the two evaluable positions:
        // one in range (LOW), one above its range (CRITICAL).
        assert_eq!(snapshot.out_of_range_ratio, 0.5);
        assert_eq!(snapshot.avg_urgency, 55.0);
        assert_eq!(snapshot.overall_risk, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn test_malformed_range_recovered_locally() {
        let engine = engine_with(
            vec![("0xpool", pool_at_tick(0))],
            vec![
                ("good", position(-1000, 1000, 1_000_000)),
                ("bad", position(500, 500, 1_000_000)),
            ],
        );
        let snapshot = engine
            .evaluate_all(&watched(&["good", "bad"]))
            .await
            .unwrap();
        assert_eq!(snapshot.evaluable, 1);
        assert_eq!(snapshot.errors.len(), 1);
        assert!(snapshot.errors[0].error.contains("invalid tick range"));
    }

    #[tokio::test]
    async fn test_reports_sorted_most_urgent_first() {
        let engine = engine_with(
            vec![("0xpool", pool_at_tick(0))],
            vec![
                ("calm", position(-5000, 5000, 1_000_000)),
                ("edgy", position(-2000, 50, 1_000_000)), // 2.4% from upper edge
            ],
        );
        let snapshot = engine
            .evaluate_all(&watched(&["calm", "edgy"]))
            .await
            .unwrap();
        assert_eq!(snapshot.positions[0].position_id, "edgy");
        assert_eq!(snapshot.positions[0].urgency_score, 90);
    }

    #[tokio::test]
    async fn test_single_position_report() {
        let engine = engine_with(
            vec![("0xpool", pool_at_tick(0))],
            vec![("a", position(-1000, 1000, 1_000_000))],
        );
        let report = engine.evaluate_single("a").await.unwrap();
        assert_eq!(report.pair, "WETH/USDC 0.05%");
        assert!(report.in_range);
    }
}
