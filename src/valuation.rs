//! Liquidity-to-amounts valuation
//!
//! Converts a position's liquidity magnitude and tick range, together with
//! the pool's current sqrt-price, into the two token quantities the
//! position currently represents. All arithmetic runs on wide integers
//! with floor division; truncation is deliberate so holdings are never
//! overstated. Conversion to human-scaled decimals happens strictly at the
//! formatting boundary.

use crate::error::{Error, Result};
use crate::math::{sqrt_price_at_tick, MAX_TICK, MIN_TICK};
use alloy::primitives::{U256, U512};

const RESOLUTION: usize = 96;

/// Raw token quantities represented by a position at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmounts {
    pub amount0: U256,
    pub amount1: U256,
}

impl TokenAmounts {
    pub const ZERO: Self = Self {
        amount0: U256::ZERO,
        amount1: U256::ZERO,
    };
}

/// Computes the token amounts for `liquidity` deployed over
/// `[tick_lower, tick_upper)` with the pool at `current_tick` /
/// `sqrt_price_x96`.
///
/// Pure: identical inputs always produce bit-identical output.
///
/// - below range (`current_tick < tick_lower`): all value in token0
/// - at/above upper (`current_tick >= tick_upper`): all value in token1
/// - in range: a mix of both, varying continuously with price
pub fn token_amounts(
    liquidity: u128,
    tick_lower: i32,
    tick_upper: i32,
    current_tick: i32,
    sqrt_price_x96: U256,
) -> Result<TokenAmounts> {
    if tick_lower >= tick_upper {
        return Err(Error::InvalidRange {
            lower: tick_lower,
            upper: tick_upper,
        });
    }
    if !(MIN_TICK..=MAX_TICK).contains(&current_tick) {
        return Err(Error::TickOutOfDomain(current_tick));
    }
    if liquidity == 0 {
        return Ok(TokenAmounts::ZERO);
    }

    let sqrt_lower = sqrt_price_at_tick(tick_lower)?;
    let sqrt_upper = sqrt_price_at_tick(tick_upper)?;

    if current_tick < tick_lower {
        Ok(TokenAmounts {
            amount0: amount0_delta(liquidity, sqrt_lower, sqrt_upper)?,
            amount1: U256::ZERO,
        })
    } else if current_tick >= tick_upper {
        Ok(TokenAmounts {
            amount0: U256::ZERO,
            amount1: amount1_delta(liquidity, sqrt_lower, sqrt_upper)?,
        })
    } else {
        // Inconsistent pool data can report a tick inside the range while
        // the sqrt-price sits outside it; clamp so the deltas cannot
        // underflow.
        let sqrt_current = sqrt_price_x96.clamp(sqrt_lower, sqrt_upper);
        Ok(TokenAmounts {
            amount0: amount0_delta(liquidity, sqrt_current, sqrt_upper)?,
            amount1: amount1_delta(liquidity, sqrt_lower, sqrt_current)?,
        })
    }
}

/// Token0 owed between two sqrt-prices:
/// `floor(floor((L << 96) * (sb - sa) / sb) / sa)`. The two-step floor
/// matches the reference SqrtPriceMath round-down path.
fn amount0_delta(liquidity: u128, sqrt_a: U256, sqrt_b: U256) -> Result<U256> {
    debug_assert!(sqrt_a <= sqrt_b);
    if sqrt_a.is_zero() {
        return Err(Error::Overflow);
    }
    let numerator = (U512::from(liquidity) << RESOLUTION) * U512::from(sqrt_b - sqrt_a);
    narrow(numerator / U512::from(sqrt_b) / U512::from(sqrt_a))
}

/// Token1 owed between two sqrt-prices: `floor(L * (sb - sa) / 2^96)`.
fn amount1_delta(liquidity: u128, sqrt_a: U256, sqrt_b: U256) -> Result<U256> {
    debug_assert!(sqrt_a <= sqrt_b);
    narrow((U512::from(liquidity) * U512::from(sqrt_b - sqrt_a)) >> RESOLUTION)
}

/// Narrows a wide intermediate back to `U256`, failing on overflow.
fn narrow(wide: U512) -> Result<U256> {
    let limbs = wide.as_limbs();
    if limbs[4..].iter().any(|&l| l != 0) {
        return Err(Error::Overflow);
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// Formats a raw integer amount as a human-scaled decimal string.
///
/// Pure integer division/remainder: the fractional part is truncated,
/// never rounded up, and trailing zeros are trimmed.
pub fn format_token_amount(raw: U256, decimals: u8) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    let scale = U256::from(10u8).pow(U256::from(decimals));
    let whole = raw / scale;
    let frac = raw % scale;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    format!("{whole}.{frac}")
}
