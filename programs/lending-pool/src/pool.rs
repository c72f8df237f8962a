//! Lending pool orchestrator
//!
//! Composes the collateral registry, loan ledger, oracle adapter and
//! liquidation engine behind the public operation set. Every mutating
//! operation runs under the reentrancy guard against a working copy of the
//! pool state; the copy, its events and its token movements are committed
//! together or not at all.

use std::{
    cell::{Ref, RefCell},
    rc::Rc,
};

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::Clock, msg, pubkey::Pubkey};

use crate::{
    config::PoolConfig,
    constants::{BPS_DENOMINATOR, MAX_PLATFORM_FEE_BPS},
    error::LendingError,
    events::{EventLog, PoolEvent},
    interest_rate::InterestRateModel,
    ledger::LoanLedger,
    liquidation::{LiquidationEngine, LiquidationOutcome},
    math::mul_div,
    oracle::{FeedId, PriceOracle, PriceOracleAdapter},
    security::{ReentrancyContext, ReentrancyGuard},
    state::{ApprovedCollateral, CollateralRegistry, Deposit, Loan},
    token::{TokenProgram, TransferReceipt},
};

/// Everything a pool persists
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub config: PoolConfig,
    pub collateral: CollateralRegistry,
    pub ledger: LoanLedger,
}

impl PoolState {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            collateral: CollateralRegistry::new(),
            ledger: LoanLedger::new(),
        }
    }

    fn require_owner(&self, caller: &Pubkey) -> Result<(), LendingError> {
        if !self.config.is_owner(caller) {
            msg!("{} is not the pool owner", caller);
            return Err(LendingError::Unauthorized);
        }
        Ok(())
    }

    fn require_not_paused(&self) -> Result<(), LendingError> {
        if self.config.paused {
            return Err(LendingError::PoolPaused);
        }
        Ok(())
    }

    fn borrow_rate(&self) -> Result<u64, LendingError> {
        self.config
            .rate_model
            .borrow_rate(self.ledger.utilization_rate()?)
    }

    fn supply_rate(&self) -> Result<u64, LendingError> {
        self.config
            .rate_model
            .supply_rate(self.ledger.utilization_rate()?, self.config.platform_fee_bps)
    }
}

/// In-flight operation: working state plus what to commit or undo
struct Operation<'a> {
    state: PoolState,
    events: Vec<PoolEvent>,
    receipts: Vec<TransferReceipt>,
    tokens: &'a dyn TokenProgram,
}

impl<'a> Operation<'a> {
    fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Pull tokens from `from` into custody using the pool's allowance
    fn transfer_in(&mut self, mint: &Pubkey, from: &Pubkey, amount: u64) -> Result<(), LendingError> {
        if amount == 0 {
            return Ok(());
        }
        let custody = self.state.config.pool_authority;
        let receipt = self.tokens.transfer_from(mint, &custody, from, &custody, amount)?;
        self.receipts.push(receipt);
        Ok(())
    }

    /// Pay tokens out of custody
    fn transfer_out(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), LendingError> {
        if amount == 0 {
            return Ok(());
        }
        let custody = self.state.config.pool_authority;
        let receipt = self.tokens.transfer(mint, &custody, to, amount)?;
        self.receipts.push(receipt);
        Ok(())
    }

    fn collect_platform_fee(&mut self, amount: u64) -> Result<(), LendingError> {
        if amount == 0 {
            return Ok(());
        }
        let mint = self.state.config.lending_mint;
        let treasury = self.state.config.treasury;
        self.transfer_out(&mint, &treasury, amount)?;
        self.emit(PoolEvent::PlatformFeeCollected { amount, treasury });
        Ok(())
    }

    fn rollback(self) {
        for receipt in self.receipts.iter().rev() {
            if let Err(err) = self.tokens.rollback(receipt) {
                msg!("Failed to roll back transfer of {} {}: {}", receipt.amount, receipt.mint, err);
            }
        }
    }
}

pub struct LendingPool {
    state: RefCell<PoolState>,
    events: RefCell<EventLog>,
    guard: ReentrancyGuard,
    tokens: Rc<dyn TokenProgram>,
    oracle: Rc<dyn PriceOracle>,
}

impl LendingPool {
    pub fn new(
        config: PoolConfig,
        tokens: Rc<dyn TokenProgram>,
        oracle: Rc<dyn PriceOracle>,
    ) -> Result<Self, LendingError> {
        Self::from_state(PoolState::new(config), tokens, oracle)
    }

    /// Rebuild a pool from a persisted snapshot
    pub fn from_state(
        state: PoolState,
        tokens: Rc<dyn TokenProgram>,
        oracle: Rc<dyn PriceOracle>,
    ) -> Result<Self, LendingError> {
        state.config.validate()?;
        msg!(
            "Lending pool for mint {} owned by {}",
            state.config.lending_mint,
            state.config.owner
        );
        Ok(Self {
            state: RefCell::new(state),
            events: RefCell::new(EventLog::new()),
            guard: ReentrancyGuard::new(),
            tokens,
            oracle,
        })
    }

    fn adapter(&self, config: &PoolConfig) -> PriceOracleAdapter {
        PriceOracleAdapter::new(self.oracle.clone(), config.lending_decimals, config.max_price_age)
    }

    /// Run `f` against a working copy of the state and commit on success
    fn execute<T>(
        &self,
        f: impl FnOnce(&mut Operation) -> Result<T, LendingError>,
    ) -> Result<T, LendingError> {
        let ctx = ReentrancyContext::new(&self.guard)?;

        let mut op = Operation {
            state: self.state.borrow().clone(),
            events: Vec::new(),
            receipts: Vec::new(),
            tokens: self.tokens.as_ref(),
        };

        let result = f(&mut op);
        match result {
            Ok(value) => {
                *self.state.borrow_mut() = op.state;
                self.events.borrow_mut().append(op.events);
                ctx.exit()?;
                Ok(value)
            }
            Err(err) => {
                msg!("Operation failed: {}", err);
                op.rollback();
                Err(err)
            }
        }
    }

    fn collateral_value(
        &self,
        state: &PoolState,
        entry: &ApprovedCollateral,
        amount: u64,
        update_data: &[Vec<u8>],
        fee_paid: u64,
        clock: &Clock,
    ) -> Result<u64, LendingError> {
        self.adapter(&state.config).get_value_usd(
            &entry.price_feed_id,
            amount,
            entry.decimals,
            update_data,
            fee_paid,
            clock,
        )
    }

    /// Collateral value divided by the threshold ratio
    fn max_borrow_in(
        &self,
        state: &PoolState,
        token: &Pubkey,
        collateral_amount: u64,
        clock: &Clock,
    ) -> Result<u64, LendingError> {
        let entry = *state.collateral.require_supported(token)?;
        let value = self.collateral_value(state, &entry, collateral_amount, &[], 0, clock)?;
        mul_div(value, BPS_DENOMINATOR, entry.liquidation_threshold as u64)
    }

    fn loan_valuation(
        &self,
        state: &PoolState,
        loan: &Loan,
        clock: &Clock,
    ) -> Result<(ApprovedCollateral, u64), LendingError> {
        let entry = *state
            .collateral
            .get(&loan.collateral_token)
            .ok_or(LendingError::UnsupportedCollateral)?;
        let value = self.collateral_value(state, &entry, loan.collateral_amount, &[], 0, clock)?;
        Ok((entry, value))
    }

    // ---------------------------------------------------------------------
    // Lender operations
    // ---------------------------------------------------------------------

    pub fn deposit(&self, caller: &Pubkey, amount: u64, clock: &Clock) -> Result<(), LendingError> {
        self.execute(|op| {
            if amount == 0 {
                return Err(LendingError::InvalidAmount);
            }
            op.state.require_not_paused()?;

            let supply_rate = op.state.supply_rate()?;
            op.state
                .ledger
                .deposit(*caller, amount, supply_rate, clock.unix_timestamp)?;

            let mint = op.state.config.lending_mint;
            op.transfer_in(&mint, caller, amount)?;

            msg!("Deposited {} from {}", amount, caller);
            op.emit(PoolEvent::Deposited {
                lender: *caller,
                amount,
                timestamp: clock.unix_timestamp,
            });
            Ok(())
        })
    }

    pub fn withdraw(&self, caller: &Pubkey, amount: u64, clock: &Clock) -> Result<(), LendingError> {
        self.execute(|op| {
            if amount == 0 {
                return Err(LendingError::InvalidAmount);
            }
            op.state.require_not_paused()?;

            let supply_rate = op.state.supply_rate()?;
            let outcome = op
                .state
                .ledger
                .withdraw(caller, amount, supply_rate, clock.unix_timestamp)?;

            let mint = op.state.config.lending_mint;
            op.transfer_out(&mint, caller, amount)?;

            msg!("Withdrew {} ({} interest) to {}", amount, outcome.interest, caller);
            op.emit(PoolEvent::Withdrawn {
                lender: *caller,
                amount,
                interest: outcome.interest,
                timestamp: clock.unix_timestamp,
            });
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Borrower operations
    // ---------------------------------------------------------------------

    pub fn borrow(
        &self,
        caller: &Pubkey,
        amount: u64,
        collateral_token: &Pubkey,
        collateral_amount: u64,
        clock: &Clock,
    ) -> Result<u64, LendingError> {
        self.execute(|op| {
            if amount == 0 || collateral_amount == 0 {
                return Err(LendingError::InvalidAmount);
            }
            op.state.require_not_paused()?;
            op.state.collateral.require_supported(collateral_token)?;

            let available = op.state.ledger.available_liquidity();
            if amount > available {
                msg!("Borrow of {} exceeds available liquidity {}", amount, available);
                return Err(LendingError::InsufficientLiquidity);
            }

            let max_borrow = self.max_borrow_in(&op.state, collateral_token, collateral_amount, clock)?;
            if amount > max_borrow {
                msg!("Borrow of {} exceeds max borrow {}", amount, max_borrow);
                return Err(LendingError::ExceedsMaxBorrow);
            }

            // Rate from utilization before this loan
            let interest_rate = op.state.borrow_rate()?;
            let loan_id = op.state.ledger.open_loan(
                *caller,
                amount,
                *collateral_token,
                collateral_amount,
                interest_rate,
                clock.unix_timestamp,
            )?;

            let mint = op.state.config.lending_mint;
            op.transfer_in(collateral_token, caller, collateral_amount)?;
            op.transfer_out(&mint, caller, amount)?;

            msg!("Loan {} created: {} at {} bps", loan_id, amount, interest_rate);
            op.emit(PoolEvent::LoanCreated {
                loan_id,
                borrower: *caller,
                amount,
                collateral_token: *collateral_token,
                collateral_amount,
                interest_rate,
            });
            Ok(loan_id)
        })
    }

    pub fn repay(&self, caller: &Pubkey, loan_id: u64, amount: u64, clock: &Clock) -> Result<(), LendingError> {
        self.execute(|op| {
            if amount == 0 {
                return Err(LendingError::InvalidAmount);
            }
            op.state.require_not_paused()?;

            let fee_bps = op.state.config.platform_fee_bps;
            let outcome = op
                .state
                .ledger
                .repay(loan_id, caller, amount, fee_bps, clock.unix_timestamp)?;

            let mint = op.state.config.lending_mint;
            op.transfer_in(&mint, caller, amount)?;
            op.collect_platform_fee(outcome.platform_fee)?;

            msg!(
                "Loan {} repaid {} (principal {}, interest {})",
                loan_id,
                amount,
                outcome.principal_paid,
                outcome.interest_paid
            );
            op.emit(PoolEvent::LoanRepaid {
                loan_id,
                amount,
                remaining_debt: outcome.remaining_debt,
                timestamp: clock.unix_timestamp,
            });

            if outcome.fully_repaid {
                op.transfer_out(&outcome.collateral_token, caller, outcome.collateral_amount)?;
                op.emit(PoolEvent::LoanFullyRepaid {
                    loan_id,
                    total_repaid: outcome.total_repaid,
                    timestamp: clock.unix_timestamp,
                });
            }
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Liquidation
    // ---------------------------------------------------------------------

    /// Liquidate an unhealthy loan. The liquidator pays the discounted
    /// collateral value (capped at the debt) and receives the collateral.
    pub fn liquidate(
        &self,
        liquidator: &Pubkey,
        loan_id: u64,
        price_update_data: &[Vec<u8>],
        fee_paid: u64,
        clock: &Clock,
    ) -> Result<LiquidationOutcome, LendingError> {
        self.execute(|op| {
            op.state.require_not_paused()?;
            // Engine address only gates; the caller need not be the engine
            if op.state.config.liquidation_engine.is_none() {
                return Err(LendingError::LiquidationEngineNotSet);
            }

            let loan = op
                .state
                .ledger
                .loan(loan_id)
                .ok_or(LendingError::LoanNotFound)?
                .clone();
            loan.ensure_active()?;

            self.adapter(&op.state.config).refresh(price_update_data, fee_paid)?;
            let (entry, value) = self.loan_valuation(&op.state, &loan, clock)?;

            let engine = LiquidationEngine::new(op.state.config.liquidation_bonus_bps);
            let outcome = engine.assess(&loan, value, entry.liquidation_threshold, clock.unix_timestamp)?;

            let fee_bps = op.state.config.platform_fee_bps;
            let settlement = op
                .state
                .ledger
                .apply_liquidation(&outcome, fee_bps, clock.unix_timestamp)?;

            let mint = op.state.config.lending_mint;
            op.transfer_in(&mint, liquidator, outcome.debt_repaid)?;
            op.collect_platform_fee(settlement.platform_fee)?;
            op.transfer_out(&loan.collateral_token, liquidator, outcome.collateral_seized)?;

            msg!(
                "Loan {} liquidated: repaid {}, bad debt {}",
                loan_id,
                outcome.debt_repaid,
                outcome.bad_debt
            );
            op.emit(PoolEvent::LoanLiquidated {
                loan_id,
                liquidator: *liquidator,
                debt_repaid: outcome.debt_repaid,
                collateral_seized: outcome.collateral_seized,
                bad_debt: outcome.bad_debt,
            });
            Ok(outcome)
        })
    }

    // ---------------------------------------------------------------------
    // Owner operations
    // ---------------------------------------------------------------------

    pub fn add_collateral(
        &self,
        caller: &Pubkey,
        token: &Pubkey,
        price_feed_id: FeedId,
        liquidation_threshold: u16,
        decimals: u8,
    ) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            op.state
                .collateral
                .add(*token, price_feed_id, liquidation_threshold, decimals)?;

            msg!("Collateral {} added at {} bps", token, liquidation_threshold);
            op.emit(PoolEvent::CollateralAdded {
                token: *token,
                price_feed_id,
                liquidation_threshold,
                decimals,
            });
            Ok(())
        })
    }

    pub fn remove_collateral(&self, caller: &Pubkey, token: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            op.state.collateral.remove(token)?;

            msg!("Collateral {} removed", token);
            op.emit(PoolEvent::CollateralRemoved { token: *token });
            Ok(())
        })
    }

    pub fn set_platform_fee(&self, caller: &Pubkey, fee_bps: u16) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            if fee_bps > MAX_PLATFORM_FEE_BPS {
                msg!("Platform fee {} exceeds {}", fee_bps, MAX_PLATFORM_FEE_BPS);
                return Err(LendingError::FeeTooHigh);
            }

            let old_fee_bps = op.state.config.platform_fee_bps;
            op.state.config.platform_fee_bps = fee_bps;
            op.emit(PoolEvent::PlatformFeeUpdated {
                old_fee_bps,
                new_fee_bps: fee_bps,
            });
            Ok(())
        })
    }

    pub fn set_treasury(&self, caller: &Pubkey, treasury: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            if *treasury == Pubkey::default() {
                return Err(LendingError::InvalidAddress);
            }

            let old_treasury = op.state.config.treasury;
            op.state.config.treasury = *treasury;
            op.emit(PoolEvent::TreasuryUpdated {
                old_treasury,
                new_treasury: *treasury,
            });
            Ok(())
        })
    }

    /// Record the liquidation engine address. The address is only a switch:
    /// once set, liquidation is open to any account.
    pub fn set_liquidation_engine(&self, caller: &Pubkey, engine: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            if *engine == Pubkey::default() {
                return Err(LendingError::InvalidAddress);
            }

            op.state.config.liquidation_engine = Some(*engine);
            op.emit(PoolEvent::LiquidationEngineUpdated { engine: *engine });
            Ok(())
        })
    }

    pub fn update_interest_rate_model(
        &self,
        caller: &Pubkey,
        base_rate_bps: u64,
        multiplier_bps: u64,
        jump_multiplier_bps: u64,
        kink_bps: u64,
    ) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            op.state.config.rate_model.update(
                base_rate_bps,
                multiplier_bps,
                jump_multiplier_bps,
                kink_bps,
            )?;

            op.emit(PoolEvent::InterestRateModelUpdated {
                base_rate_bps,
                multiplier_bps,
                jump_multiplier_bps,
                kink_bps,
            });
            Ok(())
        })
    }

    pub fn pause(&self, caller: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            op.state.require_not_paused()?;

            op.state.config.paused = true;
            msg!("Pool paused");
            op.emit(PoolEvent::Paused { by: *caller });
            Ok(())
        })
    }

    pub fn unpause(&self, caller: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            if !op.state.config.paused {
                return Err(LendingError::PoolNotPaused);
            }

            op.state.config.paused = false;
            msg!("Pool unpaused");
            op.emit(PoolEvent::Unpaused { by: *caller });
            Ok(())
        })
    }

    pub fn transfer_ownership(&self, caller: &Pubkey, new_owner: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            if *new_owner == Pubkey::default() {
                return Err(LendingError::InvalidAddress);
            }

            op.state.config.owner = *new_owner;
            op.emit(PoolEvent::OwnershipTransferred {
                previous_owner: *caller,
                new_owner: *new_owner,
            });
            Ok(())
        })
    }

    /// Give up ownership; every owner-only operation is disabled afterwards
    pub fn renounce_ownership(&self, caller: &Pubkey) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;

            op.state.config.owner = Pubkey::default();
            op.emit(PoolEvent::OwnershipTransferred {
                previous_owner: *caller,
                new_owner: Pubkey::default(),
            });
            Ok(())
        })
    }

    /// Move tokens out of custody to the owner while the pool is paused.
    /// Pool accounting is left as is.
    pub fn emergency_withdraw(&self, caller: &Pubkey, token: &Pubkey, amount: u64) -> Result<(), LendingError> {
        self.execute(|op| {
            op.state.require_owner(caller)?;
            if amount == 0 {
                return Err(LendingError::InvalidAmount);
            }
            if !op.state.config.paused {
                return Err(LendingError::PoolNotPaused);
            }

            op.transfer_out(token, caller, amount)?;

            msg!("Emergency withdrawal of {} {}", amount, token);
            op.emit(PoolEvent::EmergencyWithdrawal {
                token: *token,
                amount,
                to: *caller,
            });
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    pub fn get_current_borrow_rate(&self) -> Result<u64, LendingError> {
        self.state.borrow().borrow_rate()
    }

    pub fn get_current_supply_rate(&self) -> Result<u64, LendingError> {
        self.state.borrow().supply_rate()
    }

    pub fn get_utilization_rate(&self) -> Result<u64, LendingError> {
        self.state.borrow().ledger.utilization_rate()
    }

    pub fn get_max_borrow_amount(
        &self,
        token: &Pubkey,
        collateral_amount: u64,
        clock: &Clock,
    ) -> Result<u64, LendingError> {
        let state = self.state.borrow();
        self.max_borrow_in(&state, token, collateral_amount, clock)
    }

    pub fn get_user_active_loans(&self, account: &Pubkey) -> Vec<u64> {
        self.state.borrow().ledger.active_loans_of(account)
    }

    pub fn get_total_debt(&self, loan_id: u64, clock: &Clock) -> Result<u64, LendingError> {
        self.state
            .borrow()
            .ledger
            .total_debt(loan_id, clock.unix_timestamp)
    }

    pub fn is_liquidatable(&self, loan_id: u64, clock: &Clock) -> Result<bool, LendingError> {
        let state = self.state.borrow();
        let loan = state.ledger.loan(loan_id).ok_or(LendingError::LoanNotFound)?;
        if !loan.is_active() {
            return Ok(false);
        }
        let (entry, value) = self.loan_valuation(&state, loan, clock)?;
        LiquidationEngine::is_liquidatable(
            value,
            entry.liquidation_threshold,
            loan.total_debt(clock.unix_timestamp)?,
        )
    }

    /// Health factor in bps; below 10_000 the loan can be liquidated
    pub fn get_health_factor(&self, loan_id: u64, clock: &Clock) -> Result<u64, LendingError> {
        let state = self.state.borrow();
        let loan = state.ledger.loan(loan_id).ok_or(LendingError::LoanNotFound)?;
        let (entry, value) = self.loan_valuation(&state, loan, clock)?;
        LiquidationEngine::health_factor(
            value,
            entry.liquidation_threshold,
            loan.total_debt(clock.unix_timestamp)?,
        )
    }

    pub fn get_deposit_with_interest(&self, account: &Pubkey, clock: &Clock) -> Result<u64, LendingError> {
        let state = self.state.borrow();
        state
            .ledger
            .deposit_with_interest(account, state.supply_rate()?, clock.unix_timestamp)
    }

    pub fn get_update_fee(&self, price_update_data: &[Vec<u8>]) -> u64 {
        self.oracle.get_update_fee(price_update_data)
    }

    pub fn deposits(&self, account: &Pubkey) -> Option<Deposit> {
        self.state.borrow().ledger.deposit_of(account).copied()
    }

    pub fn loans(&self, loan_id: u64) -> Option<Loan> {
        self.state.borrow().ledger.loan(loan_id).cloned()
    }

    pub fn approved_collateral(&self, token: &Pubkey) -> Option<ApprovedCollateral> {
        self.state.borrow().collateral.get(token).copied()
    }

    pub fn total_liquidity(&self) -> u64 {
        self.state.borrow().ledger.total_liquidity()
    }

    pub fn total_borrowed(&self) -> u64 {
        self.state.borrow().ledger.total_borrowed()
    }

    pub fn total_bad_debt(&self) -> u64 {
        self.state.borrow().ledger.total_bad_debt()
    }

    pub fn loan_counter(&self) -> u64 {
        self.state.borrow().ledger.loan_counter()
    }

    pub fn owner(&self) -> Pubkey {
        self.state.borrow().config.owner
    }

    pub fn treasury(&self) -> Pubkey {
        self.state.borrow().config.treasury
    }

    pub fn platform_fee(&self) -> u16 {
        self.state.borrow().config.platform_fee_bps
    }

    pub fn paused(&self) -> bool {
        self.state.borrow().config.paused
    }

    pub fn liquidation_engine(&self) -> Option<Pubkey> {
        self.state.borrow().config.liquidation_engine
    }

    pub fn interest_rate_model(&self) -> InterestRateModel {
        self.state.borrow().config.rate_model
    }

    pub fn config(&self) -> PoolConfig {
        self.state.borrow().config.clone()
    }

    pub fn events(&self) -> Ref<'_, EventLog> {
        self.events.borrow()
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    pub fn snapshot(&self) -> PoolState {
        self.state.borrow().clone()
    }

    /// Replace the whole pool state. Rejected while an operation is running.
    pub fn restore(&self, state: PoolState) -> Result<(), LendingError> {
        let ctx = ReentrancyContext::new(&self.guard)?;
        state.config.validate()?;
        *self.state.borrow_mut() = state;
        ctx.exit()
    }
}
