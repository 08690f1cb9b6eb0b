//! Uniswap V3 subgraph reader
//!
//! Implements both reader traits over The Graph's Uniswap V3 subgraphs.
//! Subgraph numeric fields arrive as strings; everything is parsed into
//! wide integers here so no valuation code ever touches JSON.

use crate::config::{Config, Network};
use crate::error::{Error, Result};
use crate::math::tick_at_sqrt_price;
use crate::reader::{PoolState, PoolStateReader, PositionState, PositionStateReader};
use crate::tokens::{TokenMeta, TokenRegistry};
use alloy::primitives::U256;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const POOL_QUERY: &str = r#"
    query PoolState($id: ID!) {
        pool(id: $id) {
            tick
            sqrtPrice
            feeTier
            token0 { id symbol decimals }
            token1 { id symbol decimals }
        }
    }
"#;

const POSITION_QUERY: &str = r#"
    query PositionState($id: ID!) {
        position(id: $id) {
            liquidity
            tickLower { tickIdx }
            tickUpper { tickIdx }
            pool { id }
        }
    }
"#;

/// Reader backed by a Uniswap V3 subgraph endpoint.
pub struct GraphReader {
    client: Client,
    endpoint: String,
    registry: TokenRegistry,
}

impl GraphReader {
    /// Build a reader for the configured network's subgraph endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.subgraphs.get(config.network)?.to_string();
        Ok(Self::new(endpoint, TokenRegistry::from_entries(&config.tokens)))
    }

    pub fn new(endpoint: String, registry: TokenRegistry) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            registry,
        }
    }

    /// Convenience constructor for a network with endpoints from the
    /// environment.
    pub fn for_network(network: Network) -> Result<Self> {
        let config = Config {
            network,
            ..Config::default()
        };
        Self::from_config(&config)
    }

    /// Execute a raw GraphQL query against the subgraph.
    async fn query_subgraph(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "query": query,
                "variables": variables
            }))
            .send()
            .await
            .map_err(|e| Error::DataUnavailable(format!("subgraph request failed: {e}")))?;

        let result: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| Error::DataUnavailable(format!("bad subgraph response: {e}")))?;

        if let Some(errors) = result.errors {
            return Err(Error::DataUnavailable(format!(
                "subgraph errors: {errors:?}"
            )));
        }
        result
            .data
            .ok_or_else(|| Error::DataUnavailable("no data in subgraph response".to_string()))
    }

    fn token_meta(&self, token: &GqlToken) -> TokenMeta {
        match token.decimals.parse::<u8>() {
            Ok(decimals) => TokenMeta::new(token.symbol.clone(), decimals),
            // Malformed decimals on the subgraph side; fall back to the
            // configured registry before giving up on scaling.
            Err(_) => self.registry.get_or_unknown(&token.id),
        }
    }
}

#[async_trait]
impl PoolStateReader for GraphReader {
    async fn pool_state(&self, pool_id: &str) -> Result<PoolState> {
        let variables = json!({ "id": pool_id.to_lowercase() });
        let data = self.query_subgraph(POOL_QUERY, variables).await?;

        let pool: GqlPool = match data.get("pool") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())?,
            _ => {
                return Err(Error::DataUnavailable(format!(
                    "pool {pool_id} not found in subgraph"
                )))
            }
        };

        let current_tick = parse_num::<i32>("pool tick", &pool.tick)?;
        let sqrt_price_x96 = parse_u256("pool sqrtPrice", &pool.sqrt_price)?;

        // sqrtPrice is authoritative; warn if the reported tick disagrees
        // with the one it implies.
        if let Ok(derived) = tick_at_sqrt_price(sqrt_price_x96) {
            if derived != current_tick {
                tracing::warn!(
                    pool = pool_id,
                    reported = current_tick,
                    derived,
                    "pool tick disagrees with sqrt price"
                );
            }
        }

        Ok(PoolState {
            current_tick,
            sqrt_price_x96,
            token0: self.token_meta(&pool.token0),
            token1: self.token_meta(&pool.token1),
            fee_tier: parse_num::<u32>("pool feeTier", &pool.fee_tier)?,
        })
    }
}

#[async_trait]
impl PositionStateReader for GraphReader {
    async fn position_state(&self, position_id: &str) -> Result<PositionState> {
        let variables = json!({ "id": position_id });
        let data = self.query_subgraph(POSITION_QUERY, variables).await?;

        let position: GqlPosition = match data.get("position") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())?,
            _ => {
                return Err(Error::DataUnavailable(format!(
                    "position {position_id} not found in subgraph"
                )))
            }
        };

        Ok(PositionState {
            pool_id: position.pool.id,
            tick_lower: parse_num::<i32>("tickLower", &position.tick_lower.tick_idx)?,
            tick_upper: parse_num::<i32>("tickUpper", &position.tick_upper.tick_idx)?,
            liquidity: parse_num::<u128>("liquidity", &position.liquidity)?,
            // The subgraph does not expose uncollected fees; they require
            // fee-growth accounting against on-chain state.
            uncollected_fees0: None,
            uncollected_fees1: None,
        })
    }
}

fn parse_num<T: std::str::FromStr>(what: &str, raw: &str) -> Result<T> {
    raw.parse::<T>()
        .map_err(|_| Error::DataUnavailable(format!("unparseable {what}: {raw:?}")))
}

fn parse_u256(what: &str, raw: &str) -> Result<U256> {
    raw.parse::<U256>()
        .map_err(|_| Error::DataUnavailable(format!("unparseable {what}: {raw:?}")))
}

/// GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[allow(dead_code)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct GqlToken {
    id: String,
    symbol: String,
    decimals: String,
}

#[derive(Debug, Deserialize)]
struct GqlPool {
    tick: String,
    #[serde(rename = "sqrtPrice")]
    sqrt_price: String,
    #[serde(rename = "feeTier")]
    fee_tier: String,
    token0: GqlToken,
    token1: GqlToken,
}

#[derive(Debug, Deserialize)]
struct GqlTickRef {
    #[serde(rename = "tickIdx")]
    tick_idx: String,
}

#[derive(Debug, Deserialize)]
struct GqlPoolRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GqlPosition {
    liquidity: String,
    #[serde(rename = "tickLower")]
    tick_lower: GqlTickRef,
    #[serde(rename = "tickUpper")]
    tick_upper: GqlTickRef,
    pool: GqlPoolRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pool_payload() {
        let value = json!({
            "tick": "201450",
            "sqrtPrice": "1885798694538206627812315221647643",
            "feeTier": "500",
            "token0": { "id": "0xusdc", "symbol": "USDC", "decimals": "6" },
            "token1": { "id": "0xweth", "symbol": "WETH", "decimals": "18" }
        });
        let pool: GqlPool = serde_json::from_value(value).unwrap();
        assert_eq!(parse_num::<i32>("tick", &pool.tick).unwrap(), 201450);
        assert_eq!(pool.token0.symbol, "USDC");
    }

    #[test]
    fn test_parse_position_payload() {
        let value = json!({
            "liquidity": "340282366920938463463",
            "tickLower": { "tickIdx": "-887220" },
            "tickUpper": { "tickIdx": "887220" },
            "pool": { "id": "0xpool" }
        });
        let position: GqlPosition = serde_json::from_value(value).unwrap();
        assert_eq!(
            parse_num::<u128>("liquidity", &position.liquidity).unwrap(),
            340282366920938463463u128
        );
        assert_eq!(
            parse_num::<i32>("tickLower", &position.tick_lower.tick_idx).unwrap(),
            -887220
        );
    }

    #[test]
    fn test_unparseable_field_is_data_unavailable() {
        assert!(matches!(
            parse_num::<i32>("tick", "not-a-number"),
            Err(Error::DataUnavailable(_))
        ));
    }
}
