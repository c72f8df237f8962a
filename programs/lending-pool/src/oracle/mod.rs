//! Price oracle integration
//!
//! Push-style oracle: callers submit signed update blobs (paying a fee),
//! the pool reads back `(price, conf, expo, publish_time)` per feed id.

pub mod adapter;
pub mod push_oracle;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::LendingError;

pub use adapter::*;
pub use push_oracle::*;

/// Oracle feed identifier
pub type FeedId = [u8; 32];

/// Price as published by the oracle: `price * 10^expo` USD
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFeed {
    pub price: i64,
    pub conf: u64,
    pub expo: i32,
    pub publish_time: i64,
}

/// External push-price oracle
pub trait PriceOracle {
    /// Fee required to submit `update_data`
    fn get_update_fee(&self, update_data: &[Vec<u8>]) -> u64;

    /// Apply price updates; fails without side effects if the fee is short
    /// or any blob is malformed
    fn update_price_feeds(&self, update_data: &[Vec<u8>], fee_paid: u64) -> Result<(), LendingError>;

    /// Latest stored price with no freshness check
    fn get_price_unsafe(&self, feed_id: &FeedId) -> Result<PriceFeed, LendingError>;
}
