use solana_program::msg;

use crate::{
    constants::BPS_DENOMINATOR,
    error::LendingError,
    math::{apply_bps, checked_sub, mul_div},
    state::Loan,
};

/// Health factor reported for a loan with no debt
pub const HEALTH_FACTOR_MAX: u64 = u64::MAX;

/// Result of liquidating one loan, handed to the ledger for bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationOutcome {
    pub loan_id: u64,

    /// Principal plus interest at liquidation time
    pub total_debt: u64,

    /// Lending asset paid in by the liquidator
    pub debt_repaid: u64,

    /// Debt the seized collateral could not cover
    pub bad_debt: u64,

    /// Covered debt written off as the liquidator's discount
    pub liquidation_discount: u64,

    /// Collateral transferred to the liquidator
    pub collateral_seized: u64,

    /// Oracle value of the seized collateral in lending-asset units
    pub collateral_value: u64,
}

/// Settles unhealthy loans against their collateral
pub struct LiquidationEngine {
    /// Discount on collateral value granted to the liquidator
    pub bonus_bps: u16,
}

impl LiquidationEngine {
    pub fn new(bonus_bps: u16) -> Self {
        Self { bonus_bps }
    }

    /// Health factor in bps: collateral value * threshold / 10_000 / debt.
    /// Below 10_000 the loan can be liquidated.
    pub fn health_factor(
        collateral_value: u64,
        threshold_bps: u16,
        total_debt: u64,
    ) -> Result<u64, LendingError> {
        if total_debt == 0 {
            return Ok(HEALTH_FACTOR_MAX);
        }
        let adjusted = apply_bps(collateral_value, threshold_bps as u64)?;
        let factor = (adjusted as u128)
            .checked_mul(BPS_DENOMINATOR as u128)
            .ok_or(LendingError::ArithmeticOverflow)?
            / total_debt as u128;
        Ok(u64::try_from(factor).unwrap_or(HEALTH_FACTOR_MAX))
    }

    pub fn is_liquidatable(
        collateral_value: u64,
        threshold_bps: u16,
        total_debt: u64,
    ) -> Result<bool, LendingError> {
        let adjusted = apply_bps(collateral_value, threshold_bps as u64)?;
        Ok(adjusted < total_debt)
    }

    /// Check an active loan against a fresh collateral valuation and work
    /// out what the liquidator pays and what is written off
    pub fn assess(
        &self,
        loan: &Loan,
        collateral_value: u64,
        threshold_bps: u16,
        now: i64,
    ) -> Result<LiquidationOutcome, LendingError> {
        loan.ensure_active()?;

        let total_debt = loan.total_debt(now)?;
        if !Self::is_liquidatable(collateral_value, threshold_bps, total_debt)? {
            msg!(
                "Loan {} is healthy: collateral value {}, debt {}",
                loan.id,
                collateral_value,
                total_debt
            );
            return Err(LendingError::LoanNotLiquidatable);
        }

        // Liquidator buys the collateral at a discount
        let discounted = mul_div(
            collateral_value,
            BPS_DENOMINATOR,
            BPS_DENOMINATOR + self.bonus_bps as u64,
        )?;
        let debt_repaid = discounted.min(total_debt);
        let bad_debt = total_debt.saturating_sub(collateral_value);
        let liquidation_discount = checked_sub(checked_sub(total_debt, debt_repaid)?, bad_debt)?;

        Ok(LiquidationOutcome {
            loan_id: loan.id,
            total_debt,
            debt_repaid,
            bad_debt,
            liquidation_discount,
            collateral_seized: loan.collateral_amount,
            collateral_value,
        })
    }
}
