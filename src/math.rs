//! Fixed-point tick and sqrt-price math
//!
//! Exact port of the canonical concentrated-liquidity TickMath: sqrt-prices
//! are Q64.96 integers (`sqrt(1.0001^tick) * 2^96`). Everything that feeds
//! amount calculations stays in wide integers; floats appear only in the
//! display-only `price_at_tick`.
//!
//! Matching the on-chain rounding bit-for-bit matters here: a one-unit
//! discrepancy at a range boundary flips a position between in-range and
//! out-of-range.

use crate::error::{Error, Result};
use alloy::primitives::U256;

/// Lowest tick supported by the AMM.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick supported by the AMM.
pub const MAX_TICK: i32 = 887_272;

/// Fixed-point scale for sqrt-prices (2^96).
pub const Q96: U256 = U256::from_limbs([0, 0x1_0000_0000, 0, 0]);

/// `sqrt(1.0001^tick)` at MIN_TICK, the smallest representable sqrt-price.
pub const MIN_SQRT_PRICE: U256 = U256::from_limbs([4295128739, 0, 0, 0]);

/// Per-bit Q128.128 multipliers for `1.0001^(-2^(i-1))`, i = 0..19.
const TICK_MULTIPLIERS: [U256; 20] = [
    U256::from_limbs([0xaa2d162d1a594001, 0xfffcb933bd6fad37, 0, 0]),
    U256::from_limbs([0x59a46990580e213a, 0xfff97272373d4132, 0, 0]),
    U256::from_limbs([0xef12357cf3c7fdcc, 0xfff2e50f5f656932, 0, 0]),
    U256::from_limbs([0x1c3624eaa0941cd0, 0xffe5caca7e10e4e6, 0, 0]),
    U256::from_limbs([0xc9db58835c926644, 0xffcb9843d60f6159, 0, 0]),
    U256::from_limbs([0x472e6896dfb254c0, 0xff973b41fa98c081, 0, 0]),
    U256::from_limbs([0x43ec78b326b52861, 0xff2ea16466c96a38, 0, 0]),
    U256::from_limbs([0x11c461f1969c3053, 0xfe5dee046a99a2a8, 0, 0]),
    U256::from_limbs([0xdcffc83b479aa3a4, 0xfcbe86c7900a88ae, 0, 0]),
    U256::from_limbs([0x6f2b074cf7815e54, 0xf987a7253ac41317, 0, 0]),
    U256::from_limbs([0x940c7a398e4b70f3, 0xf3392b0822b70005, 0, 0]),
    U256::from_limbs([0x43b29c7fa6e889d9, 0xe7159475a2c29b74, 0, 0]),
    U256::from_limbs([0x845ad8f792aa5825, 0xd097f3bdfd2022b8, 0, 0]),
    U256::from_limbs([0x8a65dc1f90e061e5, 0xa9f746462d870fdf, 0, 0]),
    U256::from_limbs([0x90bb3df62baf32f7, 0x70d869a156d2a1b8, 0, 0]),
    U256::from_limbs([0x81231505542fcfa6, 0x31be135f97d08fd9, 0, 0]),
    U256::from_limbs([0xc677de54f3e99bc9, 0x09aa508b5b7a84e1, 0, 0]),
    U256::from_limbs([0x6699c329225ee604, 0x005d6af8dedb8119, 0, 0]),
    U256::from_limbs([0x1ea926041bedfe98, 0x00002216e584f5fa, 0, 0]),
    U256::from_limbs([0x91f7dc42444e8fa2, 0x00000000048a1703, 0, 0]),
];

/// Computes `sqrt(1.0001^tick) * 2^96` with the exact on-chain rounding
/// (round-up on the final Q128.128 -> Q64.96 shift).
///
/// Ticks outside `[MIN_TICK, MAX_TICK]` are malformed input and return
/// `Error::TickOutOfDomain`.
pub fn sqrt_price_at_tick(tick: i32) -> Result<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(Error::TickOutOfDomain(tick));
    }
    let abs_tick = tick.unsigned_abs();

    // Q128.128 running product over the set bits of |tick|.
    let mut ratio = if abs_tick & 1 != 0 {
        TICK_MULTIPLIERS[0]
    } else {
        U256::from(1u8) << 128
    };
    for (bit, multiplier) in TICK_MULTIPLIERS.iter().enumerate().skip(1) {
        if abs_tick & (1 << bit) != 0 {
            // ratio < 2^128 and multiplier < 2^128, so the product fits.
            ratio = (ratio * multiplier) >> 128;
        }
    }
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.96, rounding up.
    let shifted = ratio >> 32;
    if (ratio & U256::from(0xffff_ffffu64)) == U256::ZERO {
        Ok(shifted)
    } else {
        Ok(shifted + U256::from(1u8))
    }
}

/// Largest tick whose sqrt-price does not exceed `sqrt_price_x96`.
///
/// Exact on-grid inverse of [`sqrt_price_at_tick`] via binary search; used
/// to cross-check a pool's reported tick against its authoritative
/// sqrt-price.
pub fn tick_at_sqrt_price(sqrt_price_x96: U256) -> Result<i32> {
    if sqrt_price_x96 < MIN_SQRT_PRICE {
        return Err(Error::DataUnavailable(format!(
            "sqrt price {sqrt_price_x96} below minimum"
        )));
    }
    let (mut lo, mut hi) = (MIN_TICK, MAX_TICK);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if sqrt_price_at_tick(mid)? <= sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// `1.0001^tick` as a float. Display only; never feeds amount math.
pub fn price_at_tick(tick: i32) -> f64 {
    1.0001f64.powi(tick)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_price_at_zero_is_q96() {
        assert_eq!(sqrt_price_at_tick(0).unwrap(), Q96);
    }

    #[test]
    fn test_sqrt_price_matches_onchain_extremes() {
        // MIN_SQRT_RATIO / MAX_SQRT_RATIO from the reference TickMath.
        assert_eq!(
            sqrt_price_at_tick(MIN_TICK).unwrap(),
            U256::from(4295128739u64)
        );
        assert_eq!(
            sqrt_price_at_tick(MAX_TICK).unwrap(),
            "1461446703485210103287273052203988822378723970342"
                .parse::<U256>()
                .unwrap()
        );
    }

    #[test]
    fn test_sqrt_price_beyond_bit_19() {
        // |tick| >= 524288 exercises the last multiplier in the ladder;
        // these values come from the reference TickMath.
        assert_eq!(
            sqrt_price_at_tick(-524288).unwrap(),
            U256::from(327099227039063107u128)
        );
        assert_eq!(
            sqrt_price_at_tick(524288).unwrap(),
            "19190206568837448476620805525116361302670"
                .parse::<U256>()
                .unwrap()
        );
        // Full-range position bounds on a tick-spacing-60 pool.
        assert_eq!(
            sqrt_price_at_tick(-887220).unwrap(),
            U256::from(4306310044u64)
        );
        assert_eq!(
            sqrt_price_at_tick(887220).unwrap(),
            "1457652066949847389969617340386294118487833376468"
                .parse::<U256>()
                .unwrap()
        );
    }

    #[test]
    fn test_sqrt_price_known_ticks() {
        assert_eq!(
            sqrt_price_at_tick(1000).unwrap(),
            U256::from(83290069058676223003182343270u128)
        );
        assert_eq!(
            sqrt_price_at_tick(-1000).unwrap(),
            U256::from(75364347830767020784054125655u128)
        );
    }

    #[test]
    fn test_sqrt_price_monotonic_near_zero() {
        let mut prev = sqrt_price_at_tick(-50).unwrap();
        for tick in -49..=50 {
            let cur = sqrt_price_at_tick(tick).unwrap();
            assert!(cur > prev, "not monotonic at tick {tick}");
            prev = cur;
        }
    }

    #[test]
    fn test_out_of_domain_tick_rejected() {
        assert!(matches!(
            sqrt_price_at_tick(MAX_TICK + 1),
            Err(Error::TickOutOfDomain(_))
        ));
        assert!(matches!(
            sqrt_price_at_tick(MIN_TICK - 1),
            Err(Error::TickOutOfDomain(_))
        ));
    }

    #[test]
    fn test_tick_at_sqrt_price_roundtrip_on_grid() {
        for tick in [-887272, -100000, -1, 0, 1, 12345, 887272] {
            let sp = sqrt_price_at_tick(tick).unwrap();
            assert_eq!(tick_at_sqrt_price(sp).unwrap(), tick);
        }
    }

    #[test]
    fn test_tick_at_sqrt_price_floors_between_ticks() {
        let sp = sqrt_price_at_tick(100).unwrap() + U256::from(1u8);
        assert_eq!(tick_at_sqrt_price(sp).unwrap(), 100);
    }

    #[test]
    fn test_price_at_tick_display() {
        assert!((price_at_tick(0) - 1.0).abs() < 1e-12);
        assert!((price_at_tick(1) - 1.0001).abs() < 1e-12);
        // 1.0001^6932 is roughly 2.
        assert!((price_at_tick(6932) - 2.0).abs() < 1e-3);
    }
}
