//! Error types for the LP risk monitor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A reader could not supply pool or position state (RPC/subgraph
    /// failure or timeout). Never conflated with a zero-valued result.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("invalid tick range: lower {lower} >= upper {upper}")]
    InvalidRange { lower: i32, upper: i32 },

    #[error("tick {0} outside supported domain")]
    TickOutOfDomain(i32),

    /// Internal invariant violation in the fixed-point math. Aborts the
    /// whole evaluation batch rather than being recovered per position.
    #[error("arithmetic overflow in position math")]
    Overflow,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is recovered locally by the portfolio aggregator
    /// (excluded from aggregates, reported in the errors list) rather than
    /// aborting the batch.
    pub fn is_per_position(&self) -> bool {
        !matches!(self, Error::Overflow)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
