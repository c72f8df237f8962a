mod common;

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use common::*;
use lending_pool::{
    token::TransferReceipt, InMemoryTokenProgram, LendingError, LendingPool, TokenProgram,
};
use solana_program::{clock::Clock, pubkey::Pubkey};

#[derive(Debug, Clone, Copy)]
enum Reentry {
    Deposit,
    Withdraw,
}

/// Token program that calls back into the pool while pulling funds
struct HookedToken {
    inner: Rc<InMemoryTokenProgram>,
    pool: RefCell<Weak<LendingPool>>,
    reentry: Cell<Option<(Reentry, Pubkey)>>,
    observed: RefCell<Vec<Result<(), LendingError>>>,
    liquidity_seen: Cell<Option<u64>>,
    fail_transfer_out: Cell<bool>,
    clock: Cell<i64>,
}

impl HookedToken {
    fn new(inner: Rc<InMemoryTokenProgram>) -> Self {
        Self {
            inner,
            pool: RefCell::new(Weak::new()),
            reentry: Cell::new(None),
            observed: RefCell::new(Vec::new()),
            liquidity_seen: Cell::new(None),
            fail_transfer_out: Cell::new(false),
            clock: Cell::new(START_TIME),
        }
    }

    fn attach(&self, pool: &Rc<LendingPool>) {
        *self.pool.borrow_mut() = Rc::downgrade(pool);
    }

    fn arm(&self, reentry: Reentry, caller: Pubkey) {
        self.reentry.set(Some((reentry, caller)));
    }

    fn call_back(&self) {
        let Some((reentry, caller)) = self.reentry.take() else {
            return;
        };
        let Some(pool) = self.pool.borrow().upgrade() else {
            return;
        };

        self.liquidity_seen.set(Some(pool.total_liquidity()));
        let clock = Clock {
            unix_timestamp: self.clock.get(),
            ..Clock::default()
        };
        let result = match reentry {
            Reentry::Deposit => pool.deposit(&caller, 1, &clock),
            Reentry::Withdraw => pool.withdraw(&caller, 1, &clock),
        };
        self.observed.borrow_mut().push(result);
    }
}

impl TokenProgram for HookedToken {
    fn decimals(&self, mint: &Pubkey) -> Result<u8, LendingError> {
        self.inner.decimals(mint)
    }

    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.inner.balance_of(mint, owner)
    }

    fn allowance(&self, mint: &Pubkey, owner: &Pubkey, delegate: &Pubkey) -> u64 {
        self.inner.allowance(mint, owner, delegate)
    }

    fn approve(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        delegate: &Pubkey,
        amount: u64,
    ) -> Result<(), LendingError> {
        self.inner.approve(mint, owner, delegate, amount)
    }

    fn transfer(
        &self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<TransferReceipt, LendingError> {
        if self.fail_transfer_out.get() {
            return Err(LendingError::TransferFailed);
        }
        self.inner.transfer(mint, from, to, amount)
    }

    fn transfer_from(
        &self,
        mint: &Pubkey,
        delegate: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<TransferReceipt, LendingError> {
        self.call_back();
        self.inner.transfer_from(mint, delegate, from, to, amount)
    }

    fn rollback(&self, receipt: &TransferReceipt) -> Result<(), LendingError> {
        self.inner.rollback(receipt)
    }
}

fn hooked_context() -> (TestContext, Rc<HookedToken>) {
    let mut hook = None;
    let ctx = TestContext::build(|tokens| {
        let hooked = Rc::new(HookedToken::new(tokens));
        hook = Some(hooked.clone());
        hooked as Rc<dyn TokenProgram>
    });
    let hook = hook.unwrap();
    hook.attach(&ctx.pool);
    (ctx, hook)
}

#[test]
fn test_reentrant_deposit_is_rejected() {
    let (ctx, hook) = hooked_context();
    ctx.approve(&ctx.bob, &ctx.pyusd, pyusd(10));
    hook.arm(Reentry::Deposit, ctx.bob);

    ctx.deposit(&ctx.alice, pyusd(1_000));

    assert_eq!(
        *hook.observed.borrow(),
        vec![Err(LendingError::ReentrancyDetected)]
    );
    assert_eq!(ctx.pool.total_liquidity(), pyusd(1_000));
    assert!(ctx.pool.deposits(&ctx.bob).is_none());
    assert_eq!(ctx.pyusd_balance(&ctx.custody()), pyusd(1_000));
}

#[test]
fn test_reentrant_withdraw_is_rejected() {
    let (ctx, hook) = hooked_context();
    ctx.deposit(&ctx.alice, pyusd(1_000));

    hook.arm(Reentry::Withdraw, ctx.alice);
    ctx.deposit(&ctx.alice, pyusd(500));

    assert_eq!(
        *hook.observed.borrow(),
        vec![Err(LendingError::ReentrancyDetected)]
    );
    // Views inside the callback see the last committed state
    assert_eq!(hook.liquidity_seen.get(), Some(pyusd(1_000)));
    assert_eq!(ctx.pool.total_liquidity(), pyusd(1_500));
    assert_eq!(ctx.pool.deposits(&ctx.alice).unwrap().amount, pyusd(1_500));
}

#[test]
fn test_failed_transfer_out_unwinds_borrow() {
    let (ctx, hook) = hooked_context();
    ctx.deposit(&ctx.alice, pyusd(10_000));
    let events_before = ctx.pool.events().len();

    hook.fail_transfer_out.set(true);
    ctx.approve(&ctx.bob, &ctx.weth, weth(1));
    assert_eq!(
        ctx.pool
            .borrow(&ctx.bob, pyusd(500), &ctx.weth, weth(1), &ctx.clock()),
        Err(LendingError::TransferFailed)
    );

    assert_eq!(ctx.pool.loan_counter(), 0);
    assert_eq!(ctx.pool.total_borrowed(), 0);
    assert_eq!(ctx.weth_balance(&ctx.bob), weth(100));
    assert_eq!(ctx.weth_balance(&ctx.custody()), 0);
    assert_eq!(ctx.tokens.allowance(&ctx.weth, &ctx.bob, &ctx.custody()), weth(1));
    assert_eq!(ctx.pool.events().len(), events_before);

    // Guard released after the failure
    hook.fail_transfer_out.set(false);
    let loan_id = ctx.borrow(&ctx.bob, pyusd(500), weth(1));
    assert_eq!(loan_id, 0);
}
