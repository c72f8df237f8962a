use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{
    error::LendingError,
    math::{checked_add, elapsed_seconds, simple_interest},
};

/// Loan lifecycle. `Active` is the only non-terminal state.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Active = 0,
    Repaid = 1,
    Liquidated = 2,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoanStatus::Active)
    }

    /// Validate a status change; only `Active -> Repaid | Liquidated` is allowed
    pub fn transition(self, next: LoanStatus) -> Result<LoanStatus, LendingError> {
        match (self, next) {
            (LoanStatus::Active, LoanStatus::Repaid)
            | (LoanStatus::Active, LoanStatus::Liquidated) => Ok(next),
            _ => {
                msg!("Invalid loan status transition {:?} -> {:?}", self, next);
                Err(LendingError::LoanNotActive)
            }
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: u64,

    pub borrower: Pubkey,

    /// Outstanding principal in lending-asset units
    pub borrowed_amount: u64,

    pub collateral_token: Pubkey,

    /// Collateral held in custody for this loan
    pub collateral_amount: u64,

    /// Annual borrow rate in bps, fixed at origination
    pub interest_rate: u64,

    pub borrowed_at: i64,

    pub last_interest_update: i64,

    /// Settled, unpaid interest
    pub accrued_interest: u64,

    /// Sum of all repayments
    pub total_repaid: u64,

    pub status: LoanStatus,
}

impl Loan {
    pub const LEN: usize = 8 + 32 + 8 + 32 + 8 + 8 + 8 + 8 + 8 + 8 + 1;

    pub fn new(
        id: u64,
        borrower: Pubkey,
        borrowed_amount: u64,
        collateral_token: Pubkey,
        collateral_amount: u64,
        interest_rate: u64,
        now: i64,
    ) -> Self {
        Self {
            id,
            borrower,
            borrowed_amount,
            collateral_token,
            collateral_amount,
            interest_rate,
            borrowed_at: now,
            last_interest_update: now,
            accrued_interest: 0,
            total_repaid: 0,
            status: LoanStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    pub fn ensure_active(&self) -> Result<(), LendingError> {
        if !self.is_active() {
            msg!("Loan {} is {:?}", self.id, self.status);
            return Err(LendingError::LoanNotActive);
        }
        Ok(())
    }

    /// Interest since `last_interest_update` at the snapshotted rate
    pub fn pending_interest(&self, now: i64) -> Result<u64, LendingError> {
        if !self.is_active() {
            return Ok(0);
        }
        simple_interest(
            self.borrowed_amount,
            self.interest_rate,
            elapsed_seconds(self.last_interest_update, now),
        )
    }

    /// Fold pending interest into `accrued_interest`
    pub fn accrue(&mut self, now: i64) -> Result<u64, LendingError> {
        let interest = self.pending_interest(now)?;
        self.accrued_interest = checked_add(self.accrued_interest, interest)?;
        self.last_interest_update = now;
        Ok(interest)
    }

    /// Principal plus all interest owed at `now`
    pub fn total_debt(&self, now: i64) -> Result<u64, LendingError> {
        let settled = checked_add(self.borrowed_amount, self.accrued_interest)?;
        checked_add(settled, self.pending_interest(now)?)
    }

    pub fn close(&mut self, status: LoanStatus) -> Result<(), LendingError> {
        self.status = self.status.transition(status)?;
        self.borrowed_amount = 0;
        self.accrued_interest = 0;
        Ok(())
    }
}
