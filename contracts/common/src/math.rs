//! Checked Arithmetic and Yield Math
//!
//! All value arithmetic is overflow-checked; fee and reward formulas widen
//! to `u128` internally and floor the result.

use crate::constants::{fees, time};
use crate::errors::{StakeError, StakeResult};

pub fn safe_add(a: u64, b: u64) -> StakeResult<u64> {
    a.checked_add(b).ok_or(StakeError::Overflow)
}

pub fn safe_sub(a: u64, b: u64) -> StakeResult<u64> {
    a.checked_sub(b).ok_or(StakeError::Underflow)
}

/// Platform fee: `amount * fee_bps / 10000`, floored.
pub fn platform_fee(amount: u64, fee_bps: u64) -> StakeResult<u64> {
    let fee = (amount as u128) * (fee_bps as u128) / (fees::BPS_DENOMINATOR as u128);
    u64::try_from(fee).map_err(|_| StakeError::Overflow)
}

/// Whole days between two POSIX millisecond timestamps, floored; zero when
/// `now_ms` is not past `last_claim_ms`.
pub fn days_elapsed(last_claim_ms: u64, now_ms: u64) -> u64 {
    now_ms.saturating_sub(last_claim_ms) / time::MS_PER_DAY
}

/// Accrued reward: `stake * rate_bps * days / (365 * 10000)`, floored.
pub fn accrued_reward(
    stake_amount: u64,
    yield_rate_bps: u64,
    last_claim_ms: u64,
    now_ms: u64,
) -> StakeResult<u64> {
    if stake_amount == 0 {
        return Ok(0);
    }
    let days = days_elapsed(last_claim_ms, now_ms);
    let numerator = (stake_amount as u128)
        .checked_mul(yield_rate_bps as u128)
        .and_then(|v| v.checked_mul(days as u128))
        .ok_or(StakeError::Overflow)?;
    let reward = numerator / (time::DAYS_PER_YEAR as u128 * fees::BPS_DENOMINATOR as u128);
    u64::try_from(reward).map_err(|_| StakeError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::time::MS_PER_DAY;

    #[test]
    fn fee_is_floored() {
        // 1000 * 100bps = 10; 999 * 100bps = 9.99 -> 9
        assert_eq!(platform_fee(1_000, 100), Ok(10));
        assert_eq!(platform_fee(999, 100), Ok(9));
    }

    #[test]
    fn zero_bps_means_zero_fee() {
        assert_eq!(platform_fee(1_000_000, 0), Ok(0));
    }

    #[test]
    fn reward_is_zero_at_zero_elapsed_time() {
        let t = 1_700_000_000_000;
        assert_eq!(accrued_reward(1_000_000, 500, t, t), Ok(0));
    }

    #[test]
    fn reward_is_zero_below_one_day() {
        let t = 1_700_000_000_000;
        assert_eq!(accrued_reward(1_000_000, 500, t, t + MS_PER_DAY - 1), Ok(0));
    }

    #[test]
    fn reward_matches_formula() {
        // 1,000,000 staked at 5% for 73 days: 1e6 * 500 * 73 / 3,650,000 = 10,000
        let t = 1_700_000_000_000;
        assert_eq!(
            accrued_reward(1_000_000, 500, t, t + 73 * MS_PER_DAY),
            Ok(10_000)
        );
    }

    #[test]
    fn reward_is_monotone_in_elapsed_time() {
        let t = 1_700_000_000_000;
        let mut previous = 0;
        for days in 0..=30 {
            let reward = accrued_reward(1_000_000, 500, t, t + days * MS_PER_DAY).unwrap();
            assert!(reward >= previous);
            previous = reward;
        }
    }

    #[test]
    fn clock_running_backwards_accrues_nothing() {
        let t = 1_700_000_000_000;
        assert_eq!(accrued_reward(1_000_000, 500, t, t - MS_PER_DAY), Ok(0));
    }

    #[test]
    fn checked_ops() {
        assert_eq!(safe_add(u64::MAX, 1), Err(StakeError::Overflow));
        assert_eq!(safe_sub(0, 1), Err(StakeError::Underflow));
        assert_eq!(safe_add(2, 3), Ok(5));
        assert_eq!(safe_sub(3, 2), Ok(1));
    }
}
