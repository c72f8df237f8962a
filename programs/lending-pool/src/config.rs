//! Pool configuration
//!
//! Owner-controlled parameters. Everything the admin entry points can
//! change lives here so a pool's settings round-trip as one record.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{
    constants::*,
    error::LendingError,
    interest_rate::InterestRateModel,
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Admin; `Pubkey::default()` once ownership is renounced
    pub owner: Pubkey,

    /// Platform fee recipient
    pub treasury: Pubkey,

    /// Mint of the lent stablecoin
    pub lending_mint: Pubkey,

    pub lending_decimals: u8,

    /// Token account owner holding deposits and collateral
    pub pool_authority: Pubkey,

    /// Share of interest routed to the treasury, in bps
    pub platform_fee_bps: u16,

    /// Oracle staleness bound, in seconds
    pub max_price_age: u64,

    /// Discount given to liquidators on seized collateral, in bps
    pub liquidation_bonus_bps: u16,

    /// Liquidations are rejected until this is set
    pub liquidation_engine: Option<Pubkey>,

    pub paused: bool,

    pub rate_model: InterestRateModel,
}

impl PoolConfig {
    pub const DISCRIMINATOR: [u8; 8] = *b"LENDPOOL";

    pub const LEN: usize = 8 + 32 + 32 + 32 + 1 + 32 + 2 + 8 + 2 + 33 + 1 + InterestRateModel::LEN;

    pub fn new(owner: Pubkey, lending_mint: Pubkey, lending_decimals: u8) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            owner,
            treasury: owner,
            lending_mint,
            lending_decimals,
            pool_authority: crate::id(),
            platform_fee_bps: 0,
            max_price_age: DEFAULT_MAX_PRICE_AGE,
            liquidation_bonus_bps: DEFAULT_LIQUIDATION_BONUS_BPS,
            liquidation_engine: None,
            paused: false,
            rate_model: InterestRateModel::default(),
        }
    }

    pub fn with_rate_model(mut self, rate_model: InterestRateModel) -> Self {
        self.rate_model = rate_model;
        self
    }

    pub fn with_pool_authority(mut self, pool_authority: Pubkey) -> Self {
        self.pool_authority = pool_authority;
        self
    }

    pub fn with_max_price_age(mut self, max_price_age: u64) -> Self {
        self.max_price_age = max_price_age;
        self
    }

    pub fn with_liquidation_bonus(mut self, liquidation_bonus_bps: u16) -> Self {
        self.liquidation_bonus_bps = liquidation_bonus_bps;
        self
    }

    pub fn validate(&self) -> Result<(), LendingError> {
        if self.discriminator != Self::DISCRIMINATOR {
            return Err(LendingError::InvalidConfig);
        }
        if self.lending_mint == Pubkey::default() || self.pool_authority == Pubkey::default() {
            return Err(LendingError::InvalidAddress);
        }
        if self.lending_decimals > MAX_TOKEN_DECIMALS {
            return Err(LendingError::InvalidDecimals);
        }
        if self.platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            msg!("Platform fee {} exceeds {}", self.platform_fee_bps, MAX_PLATFORM_FEE_BPS);
            return Err(LendingError::FeeTooHigh);
        }
        if self.liquidation_bonus_bps > MAX_LIQUIDATION_BONUS_BPS {
            msg!(
                "Liquidation bonus {} exceeds {}",
                self.liquidation_bonus_bps,
                MAX_LIQUIDATION_BONUS_BPS
            );
            return Err(LendingError::InvalidConfig);
        }
        if self.max_price_age == 0 {
            return Err(LendingError::InvalidConfig);
        }
        self.rate_model.validate()
    }

    pub fn is_owner(&self, key: &Pubkey) -> bool {
        self.owner != Pubkey::default() && self.owner == *key
    }
}
