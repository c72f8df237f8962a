#![allow(dead_code)]

use std::rc::Rc;

use lending_pool::{
    oracle::{FeedId, PriceUpdateMessage},
    InMemoryTokenProgram, LendingPool, PoolConfig, PushOracle, TokenProgram,
};
use solana_program::{clock::Clock, pubkey::Pubkey};

pub const PYUSD_DECIMALS: u8 = 6;
pub const WETH_DECIMALS: u8 = 8;

pub const ETH_FEED: FeedId = [0xe6; 32];
/// $2,500 with expo -8
pub const ETH_PRICE: i64 = 250_000_000_000;
pub const ETH_EXPO: i32 = -8;
pub const WETH_THRESHOLD: u16 = 15_000;

pub const ORACLE_FEE: u64 = 1;
pub const START_TIME: i64 = 1_700_000_000;
pub const DAY: i64 = 24 * 60 * 60;

pub fn pyusd(whole: u64) -> u64 {
    whole * 10u64.pow(PYUSD_DECIMALS as u32)
}

pub fn weth(whole: u64) -> u64 {
    whole * 10u64.pow(WETH_DECIMALS as u32)
}

pub struct TestContext {
    pub pool: Rc<LendingPool>,
    pub tokens: Rc<InMemoryTokenProgram>,
    pub oracle: Rc<PushOracle>,
    pub owner: Pubkey,
    pub alice: Pubkey,
    pub bob: Pubkey,
    pub liquidator: Pubkey,
    pub pyusd: Pubkey,
    pub weth: Pubkey,
    pub now: i64,
    pub eth_price: i64,
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(|tokens| tokens as Rc<dyn TokenProgram>)
    }

    /// Same fixture, with the pool talking to whatever `wrap` returns
    pub fn build(wrap: impl FnOnce(Rc<InMemoryTokenProgram>) -> Rc<dyn TokenProgram>) -> Self {
        Self::build_with(wrap, |config| config)
    }

    /// Default fixture with a customized pool configuration
    pub fn with_config(configure: impl FnOnce(PoolConfig) -> PoolConfig) -> Self {
        Self::build_with(|tokens| tokens as Rc<dyn TokenProgram>, configure)
    }

    fn build_with(
        wrap: impl FnOnce(Rc<InMemoryTokenProgram>) -> Rc<dyn TokenProgram>,
        configure: impl FnOnce(PoolConfig) -> PoolConfig,
    ) -> Self {
        let tokens = Rc::new(InMemoryTokenProgram::new());
        let oracle = Rc::new(PushOracle::new(ORACLE_FEE));

        let owner = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        let liquidator = Pubkey::new_unique();
        let pyusd_mint = Pubkey::new_unique();
        let weth_mint = Pubkey::new_unique();

        tokens.create_mint(pyusd_mint, PYUSD_DECIMALS);
        tokens.create_mint(weth_mint, WETH_DECIMALS);
        for user in [alice, bob, liquidator] {
            tokens.mint_to(&pyusd_mint, &user, pyusd(1_000_000)).unwrap();
        }
        tokens.mint_to(&weth_mint, &bob, weth(100)).unwrap();

        oracle.set_price(ETH_FEED, ETH_PRICE, ETH_EXPO, START_TIME);

        let config = configure(PoolConfig::new(owner, pyusd_mint, PYUSD_DECIMALS));
        let pool = Rc::new(LendingPool::new(config, wrap(tokens.clone()), oracle.clone()).unwrap());
        pool.add_collateral(&owner, &weth_mint, ETH_FEED, WETH_THRESHOLD, WETH_DECIMALS)
            .unwrap();

        Self {
            pool,
            tokens,
            oracle,
            owner,
            alice,
            bob,
            liquidator,
            pyusd: pyusd_mint,
            weth: weth_mint,
            now: START_TIME,
            eth_price: ETH_PRICE,
        }
    }

    pub fn clock(&self) -> Clock {
        Clock {
            unix_timestamp: self.now,
            ..Clock::default()
        }
    }

    pub fn custody(&self) -> Pubkey {
        self.pool.config().pool_authority
    }

    /// Move time forward, keeping the ETH price fresh
    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
        self.oracle
            .set_price(ETH_FEED, self.eth_price, ETH_EXPO, self.now);
    }

    /// Move time forward without publishing a price
    pub fn advance_without_price(&mut self, seconds: i64) {
        self.now += seconds;
    }

    /// Signed update blob for the ETH feed at the current time
    pub fn eth_price_update(&self, price: i64) -> Vec<Vec<u8>> {
        vec![PriceUpdateMessage::new(ETH_FEED, price, 0, ETH_EXPO, self.now).encode()]
    }

    pub fn approve(&self, user: &Pubkey, mint: &Pubkey, amount: u64) {
        self.tokens
            .approve(mint, user, &self.custody(), amount)
            .unwrap();
    }

    pub fn deposit(&self, user: &Pubkey, amount: u64) {
        self.approve(user, &self.pyusd, amount);
        self.pool.deposit(user, amount, &self.clock()).unwrap();
    }

    pub fn borrow(&self, user: &Pubkey, amount: u64, collateral: u64) -> u64 {
        self.approve(user, &self.weth, collateral);
        self.pool
            .borrow(user, amount, &self.weth, collateral, &self.clock())
            .unwrap()
    }

    pub fn pyusd_balance(&self, user: &Pubkey) -> u64 {
        self.tokens.balance_of(&self.pyusd, user)
    }

    pub fn weth_balance(&self, user: &Pubkey) -> u64 {
        self.tokens.balance_of(&self.weth, user)
    }
}
