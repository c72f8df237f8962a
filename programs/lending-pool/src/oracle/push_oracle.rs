//! In-memory push oracle
//!
//! Stands in for the on-chain price oracle in simulations and tests.
//! Update blobs are fixed-layout `PriceUpdateMessage`s.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    mem::size_of,
};

use bytemuck::{Pod, Zeroable};
use solana_program::msg;

use crate::error::LendingError;

use super::{FeedId, PriceFeed, PriceOracle};

/// Wire layout of a single price update blob
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PriceUpdateMessage {
    pub feed_id: [u8; 32],
    pub price: i64,
    pub conf: u64,
    pub expo: i32,
    pub _padding: [u8; 4],
    pub publish_time: i64,
}

impl PriceUpdateMessage {
    pub const LEN: usize = size_of::<Self>();

    pub fn new(feed_id: FeedId, price: i64, conf: u64, expo: i32, publish_time: i64) -> Self {
        Self {
            feed_id,
            price,
            conf,
            expo,
            _padding: [0; 4],
            publish_time,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        bytemuck::bytes_of(self).to_vec()
    }

    pub fn decode(data: &[u8]) -> Result<Self, LendingError> {
        if data.len() != Self::LEN {
            msg!("Price update has {} bytes, expected {}", data.len(), Self::LEN);
            return Err(LendingError::InvalidPriceUpdate);
        }
        bytemuck::try_pod_read_unaligned::<Self>(data).map_err(|_| LendingError::InvalidPriceUpdate)
    }

    fn feed(&self) -> PriceFeed {
        PriceFeed {
            price: self.price,
            conf: self.conf,
            expo: self.expo,
            publish_time: self.publish_time,
        }
    }
}

#[derive(Debug, Default)]
pub struct PushOracle {
    feeds: RefCell<BTreeMap<FeedId, PriceFeed>>,
    fee_per_update: u64,
    collected_fees: Cell<u64>,
}

impl PushOracle {
    pub fn new(fee_per_update: u64) -> Self {
        Self {
            feeds: RefCell::new(BTreeMap::new()),
            fee_per_update,
            collected_fees: Cell::new(0),
        }
    }

    /// Write a price directly, bypassing update blobs and fees
    pub fn set_price(&self, feed_id: FeedId, price: i64, expo: i32, publish_time: i64) {
        self.feeds.borrow_mut().insert(
            feed_id,
            PriceFeed {
                price,
                conf: 0,
                expo,
                publish_time,
            },
        );
    }

    pub fn fee_per_update(&self) -> u64 {
        self.fee_per_update
    }

    pub fn collected_fees(&self) -> u64 {
        self.collected_fees.get()
    }
}

impl PriceOracle for PushOracle {
    fn get_update_fee(&self, update_data: &[Vec<u8>]) -> u64 {
        self.fee_per_update.saturating_mul(update_data.len() as u64)
    }

    fn update_price_feeds(&self, update_data: &[Vec<u8>], fee_paid: u64) -> Result<(), LendingError> {
        let required = self.get_update_fee(update_data);
        if fee_paid < required {
            msg!("Oracle fee {} below required {}", fee_paid, required);
            return Err(LendingError::InsufficientOracleFee);
        }

        // Decode everything before touching stored feeds
        let messages = update_data
            .iter()
            .map(|blob| PriceUpdateMessage::decode(blob))
            .collect::<Result<Vec<_>, _>>()?;

        let mut feeds = self.feeds.borrow_mut();
        for message in messages {
            let newer = feeds
                .get(&message.feed_id)
                .map_or(true, |current| message.publish_time > current.publish_time);
            if newer {
                feeds.insert(message.feed_id, message.feed());
            }
        }

        self.collected_fees.set(self.collected_fees.get().saturating_add(fee_paid));
        Ok(())
    }

    fn get_price_unsafe(&self, feed_id: &FeedId) -> Result<PriceFeed, LendingError> {
        self.feeds
            .borrow()
            .get(feed_id)
            .copied()
            .ok_or(LendingError::PriceFeedNotFound)
    }
}
