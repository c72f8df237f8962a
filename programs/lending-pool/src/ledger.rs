//! Loan ledger
//!
//! Owns deposit and loan records plus the pool aggregates. Pure
//! bookkeeping: token movements and oracle reads happen in the pool, which
//! calls in here with amounts already validated against balances and prices.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{
    constants::BPS_DENOMINATOR,
    error::LendingError,
    liquidation::LiquidationOutcome,
    math::{apply_bps, checked_add, checked_sub, mul_div},
    state::{Deposit, Loan, LoanStatus},
};

/// Split of a withdrawal between earned interest and principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawOutcome {
    pub interest: u64,
    pub principal: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepayOutcome {
    pub principal_paid: u64,
    pub interest_paid: u64,
    /// Treasury share of `interest_paid`
    pub platform_fee: u64,
    pub remaining_debt: u64,
    pub fully_repaid: bool,
    pub total_repaid: u64,
    pub collateral_token: Pubkey,
    pub collateral_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationSettlement {
    pub principal_recovered: u64,
    pub interest_recovered: u64,
    /// Treasury share of `interest_recovered`
    pub platform_fee: u64,
    pub bad_debt: u64,
    pub liquidation_discount: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanLedger {
    deposits: BTreeMap<Pubkey, Deposit>,
    loans: BTreeMap<u64, Loan>,
    active_loans: BTreeMap<Pubkey, Vec<u64>>,
    total_liquidity: u64,
    total_borrowed: u64,
    total_bad_debt: u64,
    loan_counter: u64,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_liquidity(&self) -> u64 {
        self.total_liquidity
    }

    pub fn total_borrowed(&self) -> u64 {
        self.total_borrowed
    }

    pub fn total_bad_debt(&self) -> u64 {
        self.total_bad_debt
    }

    pub fn loan_counter(&self) -> u64 {
        self.loan_counter
    }

    pub fn available_liquidity(&self) -> u64 {
        self.total_liquidity.saturating_sub(self.total_borrowed)
    }

    /// totalBorrowed * 10_000 / totalLiquidity, zero for an empty pool
    pub fn utilization_rate(&self) -> Result<u64, LendingError> {
        if self.total_liquidity == 0 {
            return Ok(0);
        }
        mul_div(self.total_borrowed, BPS_DENOMINATOR, self.total_liquidity)
    }

    pub fn deposit_of(&self, account: &Pubkey) -> Option<&Deposit> {
        self.deposits.get(account)
    }

    pub fn loan(&self, loan_id: u64) -> Option<&Loan> {
        self.loans.get(&loan_id)
    }

    pub fn active_loans_of(&self, account: &Pubkey) -> Vec<u64> {
        self.active_loans.get(account).cloned().unwrap_or_default()
    }

    /// Principal plus settled and pending interest of `account`
    pub fn deposit_with_interest(
        &self,
        account: &Pubkey,
        supply_rate_bps: u64,
        now: i64,
    ) -> Result<u64, LendingError> {
        match self.deposits.get(account) {
            Some(deposit) => checked_add(deposit.balance()?, deposit.pending_interest(supply_rate_bps, now)?),
            None => Ok(0),
        }
    }

    pub fn deposit(
        &mut self,
        account: Pubkey,
        amount: u64,
        supply_rate_bps: u64,
        now: i64,
    ) -> Result<(), LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let total_liquidity = checked_add(self.total_liquidity, amount)?;

        let deposit = self.deposits.entry(account).or_insert(Deposit {
            amount: 0,
            last_update_time: now,
            accrued_interest: 0,
        });
        deposit.settle(supply_rate_bps, now)?;
        deposit.amount = checked_add(deposit.amount, amount)?;

        self.total_liquidity = total_liquidity;
        Ok(())
    }

    pub fn withdraw(
        &mut self,
        account: &Pubkey,
        amount: u64,
        supply_rate_bps: u64,
        now: i64,
    ) -> Result<WithdrawOutcome, LendingError> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        let deposit = self
            .deposits
            .get_mut(account)
            .ok_or(LendingError::InsufficientDeposit)?;
        deposit.settle(supply_rate_bps, now)?;

        let balance = deposit.balance()?;
        if amount > balance {
            msg!("Withdrawal of {} exceeds balance {}", amount, balance);
            return Err(LendingError::InsufficientDeposit);
        }

        // Lent-out funds stay in the pool
        let total_borrowed = self.total_borrowed;
        let remaining = self
            .total_liquidity
            .checked_sub(amount)
            .filter(|remaining| *remaining >= total_borrowed)
            .ok_or_else(|| {
                msg!(
                    "Withdrawal of {} leaves less than {} borrowed",
                    amount,
                    total_borrowed
                );
                LendingError::InsufficientLiquidity
            })?;

        let (interest, principal) = deposit.take(amount)?;

        if deposit.is_empty() {
            self.deposits.remove(account);
        }
        self.total_liquidity = remaining;

        Ok(WithdrawOutcome {
            interest,
            principal,
        })
    }

    /// Record a new loan and return its id. Caller has already checked the
    /// collateral allowance.
    pub fn open_loan(
        &mut self,
        borrower: Pubkey,
        amount: u64,
        collateral_token: Pubkey,
        collateral_amount: u64,
        interest_rate: u64,
        now: i64,
    ) -> Result<u64, LendingError> {
        if amount == 0 || collateral_amount == 0 {
            return Err(LendingError::InvalidAmount);
        }
        if amount > self.available_liquidity() {
            msg!(
                "Borrow of {} exceeds available liquidity {}",
                amount,
                self.available_liquidity()
            );
            return Err(LendingError::InsufficientLiquidity);
        }

        let loan_id = self.loan_counter;
        self.loan_counter = checked_add(loan_id, 1)?;
        self.total_borrowed = checked_add(self.total_borrowed, amount)?;

        self.loans.insert(
            loan_id,
            Loan::new(
                loan_id,
                borrower,
                amount,
                collateral_token,
                collateral_amount,
                interest_rate,
                now,
            ),
        );
        self.active_loans.entry(borrower).or_default().push(loan_id);

        Ok(loan_id)
    }

    pub fn total_debt(&self, loan_id: u64, now: i64) -> Result<u64, LendingError> {
        self.loans
            .get(&loan_id)
            .ok_or(LendingError::LoanNotFound)?
            .total_debt(now)
    }

    /// Apply a repayment. The amount is split between principal and interest
    /// in proportion to their share of the debt; the platform fee is taken
    /// from the interest share and the rest of the interest joins liquidity.
    pub fn repay(
        &mut self,
        loan_id: u64,
        payer: &Pubkey,
        amount: u64,
        platform_fee_bps: u16,
        now: i64,
    ) -> Result<RepayOutcome, LendingError> {
        let loan = self.loans.get_mut(&loan_id).ok_or(LendingError::LoanNotFound)?;
        loan.ensure_active()?;
        if loan.borrower != *payer {
            return Err(LendingError::NotBorrower);
        }
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }

        loan.accrue(now)?;
        let total_debt = checked_add(loan.borrowed_amount, loan.accrued_interest)?;
        if amount > total_debt {
            msg!("Repayment {} exceeds debt {}", amount, total_debt);
            return Err(LendingError::ExceedsDebt);
        }

        let principal_paid = if amount == total_debt {
            loan.borrowed_amount
        } else {
            mul_div(amount, loan.borrowed_amount, total_debt)?
        };
        let interest_paid = amount - principal_paid;
        let platform_fee = apply_bps(interest_paid, platform_fee_bps as u64)?;

        loan.borrowed_amount = checked_sub(loan.borrowed_amount, principal_paid)?;
        loan.accrued_interest = checked_sub(loan.accrued_interest, interest_paid)?;
        loan.total_repaid = checked_add(loan.total_repaid, amount)?;

        let remaining_debt = checked_add(loan.borrowed_amount, loan.accrued_interest)?;
        let fully_repaid = remaining_debt == 0;
        if fully_repaid {
            loan.close(LoanStatus::Repaid)?;
        }

        let outcome = RepayOutcome {
            principal_paid,
            interest_paid,
            platform_fee,
            remaining_debt,
            fully_repaid,
            total_repaid: loan.total_repaid,
            collateral_token: loan.collateral_token,
            collateral_amount: loan.collateral_amount,
        };
        let borrower = loan.borrower;

        self.total_borrowed = checked_sub(self.total_borrowed, principal_paid)?;
        self.total_liquidity = checked_add(self.total_liquidity, interest_paid - platform_fee)?;
        if fully_repaid {
            self.remove_active(&borrower, loan_id);
        }

        Ok(outcome)
    }

    /// Close a loan after liquidation. The liquidator's payment covers
    /// principal first, then interest; principal it cannot cover leaves
    /// the pool. Only debt above the collateral value counts as bad debt,
    /// the liquidator's discount is a plain liquidity loss.
    pub fn apply_liquidation(
        &mut self,
        outcome: &LiquidationOutcome,
        platform_fee_bps: u16,
        now: i64,
    ) -> Result<LiquidationSettlement, LendingError> {
        let loan = self
            .loans
            .get_mut(&outcome.loan_id)
            .ok_or(LendingError::LoanNotFound)?;
        loan.ensure_active()?;
        loan.accrue(now)?;

        let principal = loan.borrowed_amount;
        let total_debt = checked_add(principal, loan.accrued_interest)?;
        if total_debt != outcome.total_debt
            || checked_add(
                checked_add(outcome.debt_repaid, outcome.bad_debt)?,
                outcome.liquidation_discount,
            )? != total_debt
        {
            msg!(
                "Liquidation outcome does not match loan {} debt {}",
                outcome.loan_id,
                total_debt
            );
            return Err(LendingError::InvalidAmount);
        }

        let principal_recovered = outcome.debt_repaid.min(principal);
        let interest_recovered = outcome.debt_repaid - principal_recovered;
        let principal_lost = principal - principal_recovered;
        let platform_fee = apply_bps(interest_recovered, platform_fee_bps as u64)?;

        let borrower = loan.borrower;
        loan.close(LoanStatus::Liquidated)?;

        self.total_borrowed = checked_sub(self.total_borrowed, principal)?;
        self.total_liquidity = checked_add(
            checked_sub(self.total_liquidity, principal_lost)?,
            interest_recovered - platform_fee,
        )?;
        self.total_bad_debt = checked_add(self.total_bad_debt, outcome.bad_debt)?;
        self.remove_active(&borrower, outcome.loan_id);

        Ok(LiquidationSettlement {
            principal_recovered,
            interest_recovered,
            platform_fee,
            bad_debt: outcome.bad_debt,
            liquidation_discount: outcome.liquidation_discount,
        })
    }

    fn remove_active(&mut self, borrower: &Pubkey, loan_id: u64) {
        if let Some(ids) = self.active_loans.get_mut(borrower) {
            ids.retain(|id| *id != loan_id);
            if ids.is_empty() {
                self.active_loans.remove(borrower);
            }
        }
    }
}
