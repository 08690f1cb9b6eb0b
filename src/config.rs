//! Configuration for the LP risk monitor
//!
//! The watched position list and token metadata are explicit configuration
//! passed into the engine at call time; nothing here is global or
//! hardcoded into the valuation modules.

use crate::error::{Error, Result};
use crate::tokens::TokenMeta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The Graph API key environment variable name
pub const GRAPH_API_KEY_ENV: &str = "GRAPH_API_KEY";

/// Supported blockchain networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Ethereum,
    Arbitrum,
    Optimism,
    Base,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Arbitrum => 42161,
            Network::Optimism => 10,
            Network::Base => 8453,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Ethereum => "ethereum",
            Network::Arbitrum => "arbitrum",
            Network::Optimism => "optimism",
            Network::Base => "base",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "arbitrum" => Ok(Network::Arbitrum),
            "optimism" => Ok(Network::Optimism),
            "base" => Ok(Network::Base),
            _ => Err(Error::Config(format!(
                "unknown network: {s}. Supported: ethereum, arbitrum, optimism, base"
            ))),
        }
    }
}

/// Uniswap V3 subgraph IDs on The Graph decentralized network
pub struct SubgraphIds;

impl SubgraphIds {
    pub const UNISWAP_V3_ETHEREUM: &'static str = "5zvR82QoaXYFyDEKLZ9t6v9adgnptxYpKpSbxtgVENFV";
    pub const UNISWAP_V3_ARBITRUM: &'static str = "FbCGRftH4a3yZugY7TnbYgPJVEv2LvMT6oF1fxPe9aJM";
    pub const UNISWAP_V3_OPTIMISM: &'static str = "Cghf4LfVqPiFw6fp6Y5X5Ubc8UpmUhSfJL82zwiBFLaj";
    pub const UNISWAP_V3_BASE: &'static str = "43Hwfi3dJSoGpyas9VwNoDAv28pNwMgNGVi8CKNS9r6R";
}

/// The Graph subgraph endpoints per network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphEndpoints {
    pub endpoints: HashMap<Network, String>,
}

impl SubgraphEndpoints {
    /// Build endpoints using The Graph decentralized network with an API key
    pub fn with_api_key(api_key: &str) -> Self {
        let gateway = "https://gateway.thegraph.com/api";
        let mut endpoints = HashMap::new();
        for (network, id) in [
            (Network::Ethereum, SubgraphIds::UNISWAP_V3_ETHEREUM),
            (Network::Arbitrum, SubgraphIds::UNISWAP_V3_ARBITRUM),
            (Network::Optimism, SubgraphIds::UNISWAP_V3_OPTIMISM),
            (Network::Base, SubgraphIds::UNISWAP_V3_BASE),
        ] {
            endpoints.insert(network, format!("{gateway}/{api_key}/subgraphs/id/{id}"));
        }
        Self { endpoints }
    }

    /// Try to build endpoints from the GRAPH_API_KEY environment variable
    pub fn from_env() -> Option<Self> {
        std::env::var(GRAPH_API_KEY_ENV)
            .ok()
            .map(|key| Self::with_api_key(&key))
    }

    /// Copy of the endpoints with the API-key path segment masked, for
    /// printing configuration without leaking credentials.
    pub fn redacted(&self) -> Self {
        let endpoints = self
            .endpoints
            .iter()
            .map(|(network, url)| (*network, redact_api_key(url)))
            .collect();
        Self { endpoints }
    }

    pub fn get(&self, network: Network) -> Result<&str> {
        self.endpoints
            .get(&network)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Config(format!("no subgraph endpoint configured for {}", network.name()))
            })
    }
}

fn redact_api_key(url: &str) -> String {
    match (url.find("/api/"), url.find("/subgraphs/")) {
        (Some(start), Some(end)) if start + 5 < end => {
            format!("{}***{}", &url[..start + 5], &url[end..])
        }
        _ => url.to_string(),
    }
}

impl Default for SubgraphEndpoints {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|| Self {
            endpoints: HashMap::new(),
        })
    }
}

/// One position to monitor: the on-chain position id (NFT token id) plus
/// the pool it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedPosition {
    pub position_id: String,
    pub pool_id: String,
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network the watched positions live on
    pub network: Network,
    /// Positions to evaluate
    #[serde(default)]
    pub positions: Vec<WatchedPosition>,
    /// Per-read timeout (milliseconds)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Subgraph endpoints
    #[serde(default)]
    pub subgraphs: SubgraphEndpoints,
    /// Token metadata overrides, keyed by token address. Fallback for
    /// readers that cannot supply symbol/decimals themselves.
    #[serde(default)]
    pub tokens: HashMap<String, TokenMeta>,
}

fn default_read_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn read_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Ethereum,
            positions: Vec::new(),
            read_timeout_ms: default_read_timeout_ms(),
            subgraphs: SubgraphEndpoints::default(),
            tokens: HashMap::new(),
        }
    }
}
