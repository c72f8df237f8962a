//! Interest Rate Model
//!
//! Utilization-driven borrow rate with a kink, in basis-point arithmetic

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::msg;

use crate::{
    constants::*,
    error::LendingError,
    math::mul_div,
};

/// Two-slope (jump rate) curve. All fields are annual rates or
/// utilization points in basis points.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestRateModel {
    /// Rate at zero utilization
    pub base_rate_bps: u64,

    /// Rate added between zero utilization and the kink
    pub multiplier_bps: u64,

    /// Rate added between the kink and full utilization
    pub jump_multiplier_bps: u64,

    /// Utilization at which the jump slope starts
    pub kink_bps: u64,
}

impl Default for InterestRateModel {
    fn default() -> Self {
        Self {
            base_rate_bps: DEFAULT_BASE_RATE_BPS,
            multiplier_bps: DEFAULT_MULTIPLIER_BPS,
            jump_multiplier_bps: DEFAULT_JUMP_MULTIPLIER_BPS,
            kink_bps: DEFAULT_KINK_BPS,
        }
    }
}

impl InterestRateModel {
    pub const LEN: usize = 8 * 4;

    pub fn new(
        base_rate_bps: u64,
        multiplier_bps: u64,
        jump_multiplier_bps: u64,
        kink_bps: u64,
    ) -> Result<Self, LendingError> {
        let model = Self {
            base_rate_bps,
            multiplier_bps,
            jump_multiplier_bps,
            kink_bps,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.kink_bps == 0 || self.kink_bps > BPS_DENOMINATOR {
            msg!("Kink must be within (0, {}], got {}", BPS_DENOMINATOR, self.kink_bps);
            return Err(LendingError::InvalidRateModel);
        }

        // Peak rate must be representable
        self.base_rate_bps
            .checked_add(self.multiplier_bps)
            .and_then(|v| v.checked_add(self.jump_multiplier_bps))
            .ok_or(LendingError::InvalidRateModel)?;

        Ok(())
    }

    /// Replace all four parameters, or none of them
    pub fn update(
        &mut self,
        base_rate_bps: u64,
        multiplier_bps: u64,
        jump_multiplier_bps: u64,
        kink_bps: u64,
    ) -> Result<(), LendingError> {
        *self = Self::new(base_rate_bps, multiplier_bps, jump_multiplier_bps, kink_bps)?;
        Ok(())
    }

    /// Annual borrow rate for a utilization, both in basis points.
    /// Below the kink: base + multiplier * u / kink
    /// At or above:    base + multiplier + jump * (u - kink) / (10_000 - kink)
    pub fn borrow_rate(&self, utilization_bps: u64) -> Result<u64, LendingError> {
        let utilization = utilization_bps.min(BPS_DENOMINATOR);

        if utilization < self.kink_bps {
            let variable = mul_div(self.multiplier_bps, utilization, self.kink_bps)?;
            return self
                .base_rate_bps
                .checked_add(variable)
                .ok_or(LendingError::ArithmeticOverflow);
        }

        let excess = utilization - self.kink_bps;
        let remaining = BPS_DENOMINATOR - self.kink_bps;
        let jump = if remaining == 0 {
            0
        } else {
            mul_div(self.jump_multiplier_bps, excess, remaining)?
        };

        self.base_rate_bps
            .checked_add(self.multiplier_bps)
            .and_then(|v| v.checked_add(jump))
            .ok_or(LendingError::ArithmeticOverflow)
    }

    /// Rate earned by depositors: the borrow stream scaled by utilization,
    /// minus the platform's cut
    pub fn supply_rate(
        &self,
        utilization_bps: u64,
        platform_fee_bps: u16,
    ) -> Result<u64, LendingError> {
        let utilization = utilization_bps.min(BPS_DENOMINATOR);
        if utilization == 0 {
            return Ok(0);
        }

        let fee = (platform_fee_bps as u64).min(BPS_DENOMINATOR);
        let gross = mul_div(self.borrow_rate(utilization)?, utilization, BPS_DENOMINATOR)?;
        mul_div(gross, BPS_DENOMINATOR - fee, BPS_DENOMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> InterestRateModel {
        InterestRateModel::new(200, 1_000, 10_000, 8_000).unwrap()
    }

    #[test]
    fn test_rate_curve_points() {
        let m = model();
        assert_eq!(m.borrow_rate(0).unwrap(), 200);
        assert_eq!(m.borrow_rate(5_000).unwrap(), 825);
        assert_eq!(m.borrow_rate(8_000).unwrap(), 1_200);
        assert_eq!(m.borrow_rate(9_000).unwrap(), 6_200);
        assert_eq!(m.borrow_rate(10_000).unwrap(), 11_200);

        // Clamped at full utilization
        assert_eq!(m.borrow_rate(12_000).unwrap(), 11_200);
    }

    #[test]
    fn test_continuous_at_kink() {
        let m = model();
        let below = m.borrow_rate(7_999).unwrap();
        let at = m.borrow_rate(8_000).unwrap();
        assert!(below <= at);
        assert!(at - below <= 1);
    }

    #[test]
    fn test_supply_rate() {
        let m = model();
        assert_eq!(m.supply_rate(0, 0).unwrap(), 0);
        assert_eq!(m.supply_rate(5_000, 0).unwrap(), 412);
        assert_eq!(m.supply_rate(5_000, 100).unwrap(), 407);
    }

    #[test]
    fn test_full_kink() {
        let m = InterestRateModel::new(100, 500, 3_000, 10_000).unwrap();
        assert_eq!(m.borrow_rate(10_000).unwrap(), 600);
        assert_eq!(m.borrow_rate(5_000).unwrap(), 350);
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut m = model();

        // Invalid kink leaves every parameter untouched
        assert_eq!(m.update(1, 2, 3, 0), Err(LendingError::InvalidRateModel));
        assert_eq!(m, model());

        assert_eq!(m.update(1, 2, 3, 10_001), Err(LendingError::InvalidRateModel));
        assert_eq!(m, model());

        m.update(300, 2_000, 20_000, 9_000).unwrap();
        assert_eq!(m.base_rate_bps, 300);
        assert_eq!(m.multiplier_bps, 2_000);
        assert_eq!(m.jump_multiplier_bps, 20_000);
        assert_eq!(m.kink_bps, 9_000);
    }
}
