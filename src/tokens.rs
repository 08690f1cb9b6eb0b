//! Token metadata lookup
//!
//! Display metadata (symbol, decimals) for the tokens behind monitored
//! pools. Readers that return token metadata inline (the subgraph does)
//! don't need this; it is the fallback for data sources that only know
//! addresses. The registry is built from configuration and passed in
//! explicitly, never held in global state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display metadata for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMeta {
    /// Token symbol (e.g., "USDC", "WETH")
    pub symbol: String,
    /// Number of decimals
    pub decimals: u8,
}

impl TokenMeta {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Placeholder for tokens nothing knows about; raw units, zero scaling.
    pub fn unknown() -> Self {
        Self::new("???", 0)
    }
}

/// Token metadata lookups keyed by lowercase token address.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenMeta>,
}

impl TokenRegistry {
    /// Build a registry from configured `(address, meta)` entries.
    pub fn from_entries(entries: &HashMap<String, TokenMeta>) -> Self {
        let tokens = entries
            .iter()
            .map(|(addr, meta)| (addr.to_lowercase(), meta.clone()))
            .collect();
        Self { tokens }
    }

    /// Look up metadata by token address (case-insensitive).
    pub fn get(&self, address: &str) -> Option<&TokenMeta> {
        self.tokens.get(&address.to_lowercase())
    }

    /// Metadata for `address`, or the unknown-token placeholder.
    pub fn get_or_unknown(&self, address: &str) -> TokenMeta {
        self.get(address).cloned().unwrap_or_else(TokenMeta::unknown)
    }
}
