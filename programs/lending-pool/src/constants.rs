//! Protocol constants

/// 100% in basis points
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seconds in a (365 day) year, used for linear interest accrual
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// Platform fee ceiling (5%)
pub const MAX_PLATFORM_FEE_BPS: u16 = 500;

/// Liquidation bonus ceiling (50%)
pub const MAX_LIQUIDATION_BONUS_BPS: u16 = 5_000;

/// Default liquidation bonus (5%)
pub const DEFAULT_LIQUIDATION_BONUS_BPS: u16 = 500;

/// Default maximum age of an oracle price, in seconds
pub const DEFAULT_MAX_PRICE_AGE: u64 = 60;

/// Largest decimal scale accepted for any token
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Minimum collateral threshold: 100% collateral-to-debt
pub const MIN_LIQUIDATION_THRESHOLD_BPS: u16 = 10_000;

/// Default interest rate curve: 2% base, 10% slope, 100% jump, 80% kink
pub const DEFAULT_BASE_RATE_BPS: u64 = 200;
pub const DEFAULT_MULTIPLIER_BPS: u64 = 1_000;
pub const DEFAULT_JUMP_MULTIPLIER_BPS: u64 = 10_000;
pub const DEFAULT_KINK_BPS: u64 = 8_000;
