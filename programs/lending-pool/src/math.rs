//! Checked integer helpers
//!
//! Amounts are u64 smallest units; every product is taken in u128 and
//! narrowed back with an overflow check.

use crate::{
    constants::{BPS_DENOMINATOR, SECONDS_PER_YEAR},
    error::LendingError,
};

/// floor(a * b / denominator)
pub fn mul_div(a: u64, b: u64, denominator: u64) -> Result<u64, LendingError> {
    if denominator == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let result = (a as u128)
        .checked_mul(b as u128)
        .ok_or(LendingError::ArithmeticOverflow)?
        / denominator as u128;
    to_u64(result)
}

/// floor(amount * bps / 10_000)
pub fn apply_bps(amount: u64, bps: u64) -> Result<u64, LendingError> {
    mul_div(amount, bps, BPS_DENOMINATOR)
}

/// Linear interest: principal * rate_bps * elapsed / (10_000 * seconds_per_year)
pub fn simple_interest(principal: u64, rate_bps: u64, elapsed: u64) -> Result<u64, LendingError> {
    if principal == 0 || rate_bps == 0 || elapsed == 0 {
        return Ok(0);
    }
    let numerator = (principal as u128)
        .checked_mul(rate_bps as u128)
        .and_then(|v| v.checked_mul(elapsed as u128))
        .ok_or(LendingError::ArithmeticOverflow)?;
    let denominator = BPS_DENOMINATOR as u128 * SECONDS_PER_YEAR as u128;
    to_u64(numerator / denominator)
}

/// Seconds between two unix timestamps, zero if time went backwards
pub fn elapsed_seconds(from: i64, to: i64) -> u64 {
    if to <= from {
        0
    } else {
        (to - from) as u64
    }
}

pub fn pow10(exp: u32) -> Result<u128, LendingError> {
    10u128.checked_pow(exp).ok_or(LendingError::ArithmeticOverflow)
}

pub fn to_u64(value: u128) -> Result<u64, LendingError> {
    u64::try_from(value).map_err(|_| LendingError::ArithmeticOverflow)
}

pub fn checked_add(a: u64, b: u64) -> Result<u64, LendingError> {
    a.checked_add(b).ok_or(LendingError::ArithmeticOverflow)
}

pub fn checked_sub(a: u64, b: u64) -> Result<u64, LendingError> {
    a.checked_sub(b).ok_or(LendingError::ArithmeticOverflow)
}
