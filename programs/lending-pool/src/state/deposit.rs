use borsh::{BorshDeserialize, BorshSerialize};

use crate::{
    error::LendingError,
    math::{checked_add, elapsed_seconds, simple_interest},
};

/// Lender position in the lending asset
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deposit {
    /// Principal supplied
    pub amount: u64,

    /// Time interest was last settled
    pub last_update_time: i64,

    /// Settled interest not yet withdrawn
    pub accrued_interest: u64,
}

impl Deposit {
    pub const LEN: usize = 8 + 8 + 8;

    /// Interest earned since the last settlement
    pub fn pending_interest(&self, supply_rate_bps: u64, now: i64) -> Result<u64, LendingError> {
        simple_interest(
            self.amount,
            supply_rate_bps,
            elapsed_seconds(self.last_update_time, now),
        )
    }

    /// Move pending interest into `accrued_interest` and reset the clock
    pub fn settle(&mut self, supply_rate_bps: u64, now: i64) -> Result<u64, LendingError> {
        let interest = self.pending_interest(supply_rate_bps, now)?;
        self.accrued_interest = checked_add(self.accrued_interest, interest)?;
        self.last_update_time = now;
        Ok(interest)
    }

    /// Principal plus settled interest
    pub fn balance(&self) -> Result<u64, LendingError> {
        checked_add(self.amount, self.accrued_interest)
    }

    /// Take `amount` out, interest first. Returns `(interest, principal)`.
    pub fn take(&mut self, amount: u64) -> Result<(u64, u64), LendingError> {
        if amount > self.balance()? {
            return Err(LendingError::InsufficientDeposit);
        }

        let interest = amount.min(self.accrued_interest);
        let principal = amount - interest;
        self.accrued_interest -= interest;
        self.amount -= principal;
        Ok((interest, principal))
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.accrued_interest == 0
    }
}
