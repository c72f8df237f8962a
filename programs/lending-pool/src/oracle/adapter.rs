//! Oracle adapter
//!
//! Refreshes and reads oracle prices, rejects stale or malformed ones, and
//! converts token amounts into lending-asset units of USD value.

use std::rc::Rc;

use solana_program::{clock::Clock, msg};

use crate::{
    error::LendingError,
    math::{elapsed_seconds, pow10, to_u64},
};

use super::{FeedId, PriceFeed, PriceOracle};

/// Largest power of ten a u128 can hold
const MAX_POW10: u32 = 38;

pub struct PriceOracleAdapter {
    oracle: Rc<dyn PriceOracle>,
    /// Decimals of the value returned (the lending asset's scale)
    target_decimals: u8,
    /// Maximum accepted price age in seconds
    max_price_age: u64,
}

impl PriceOracleAdapter {
    pub fn new(oracle: Rc<dyn PriceOracle>, target_decimals: u8, max_price_age: u64) -> Self {
        Self {
            oracle,
            target_decimals,
            max_price_age,
        }
    }

    pub fn get_update_fee(&self, update_data: &[Vec<u8>]) -> u64 {
        self.oracle.get_update_fee(update_data)
    }

    /// Submit fresh price data. No-op when there is nothing to submit.
    pub fn refresh(&self, update_data: &[Vec<u8>], fee_paid: u64) -> Result<(), LendingError> {
        if update_data.is_empty() {
            return Ok(());
        }

        let required = self.oracle.get_update_fee(update_data);
        if fee_paid < required {
            msg!("Oracle update fee {} below required {}", fee_paid, required);
            return Err(LendingError::InsufficientOracleFee);
        }

        self.oracle.update_price_feeds(update_data, fee_paid)
    }

    /// Stored price for a feed, checked for sign and freshness
    pub fn get_price(&self, feed_id: &FeedId, clock: &Clock) -> Result<PriceFeed, LendingError> {
        let feed = self.oracle.get_price_unsafe(feed_id)?;

        if feed.price <= 0 {
            msg!("Invalid oracle price: {}", feed.price);
            return Err(LendingError::InvalidOraclePrice);
        }

        if feed.publish_time > clock.unix_timestamp {
            msg!(
                "Oracle price published at {} is ahead of the clock {}",
                feed.publish_time,
                clock.unix_timestamp
            );
            return Err(LendingError::InvalidOraclePrice);
        }

        let age = elapsed_seconds(feed.publish_time, clock.unix_timestamp);
        if age > self.max_price_age {
            msg!("Oracle data is stale: {} seconds old", age);
            return Err(LendingError::StaleOracle);
        }

        Ok(feed)
    }

    /// USD value of `amount` smallest units of a token, expressed in the
    /// lending asset's smallest units. Applies `update_data` first if any.
    pub fn get_value_usd(
        &self,
        feed_id: &FeedId,
        amount: u64,
        token_decimals: u8,
        update_data: &[Vec<u8>],
        fee_paid: u64,
        clock: &Clock,
    ) -> Result<u64, LendingError> {
        self.refresh(update_data, fee_paid)?;
        let feed = self.get_price(feed_id, clock)?;
        Self::convert(&feed, amount, token_decimals, self.target_decimals)
    }

    /// amount * price * 10^expo / 10^token_decimals, rescaled to
    /// `target_decimals`. Rounds toward zero.
    pub fn convert(
        feed: &PriceFeed,
        amount: u64,
        token_decimals: u8,
        target_decimals: u8,
    ) -> Result<u64, LendingError> {
        if feed.price <= 0 {
            return Err(LendingError::InvalidOraclePrice);
        }
        if amount == 0 {
            return Ok(0);
        }

        let product = (amount as u128)
            .checked_mul(feed.price as u128)
            .ok_or(LendingError::ArithmeticOverflow)?;

        let shift = target_decimals as i64 + feed.expo as i64 - token_decimals as i64;
        let value = if shift >= 0 {
            let scale = pow10(u32::try_from(shift).map_err(|_| LendingError::ArithmeticOverflow)?)?;
            product.checked_mul(scale).ok_or(LendingError::ArithmeticOverflow)?
        } else {
            let exp = u32::try_from(-shift).map_err(|_| LendingError::ArithmeticOverflow)?;
            if exp > MAX_POW10 {
                0
            } else {
                product / pow10(exp)?
            }
        };

        to_u64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{PriceUpdateMessage, PushOracle};

    const ETH_FEED: FeedId = [1u8; 32];
    const ETH_PRICE: i64 = 250_000_000_000; // $2,500, expo -8

    fn clock_at(unix_timestamp: i64) -> Clock {
        Clock {
            unix_timestamp,
            ..Clock::default()
        }
    }

    fn setup(now: i64) -> (Rc<PushOracle>, PriceOracleAdapter) {
        let oracle = Rc::new(PushOracle::new(1));
        oracle.set_price(ETH_FEED, ETH_PRICE, -8, now);
        let adapter = PriceOracleAdapter::new(oracle.clone(), 6, 60);
        (oracle, adapter)
    }

    #[test]
    fn test_value_one_eth() {
        let (_, adapter) = setup(1_000);
        // 1 WETH with 8 decimals -> $2,500 in 6-decimal units
        let value = adapter
            .get_value_usd(&ETH_FEED, 100_000_000, 8, &[], 0, &clock_at(1_000))
            .unwrap();
        assert_eq!(value, 2_500_000_000);

        // 18-decimal token, fraction of a unit
        let feed = adapter.get_price(&ETH_FEED, &clock_at(1_000)).unwrap();
        let value = PriceOracleAdapter::convert(&feed, 500_000_000_000_000_000, 18, 6).unwrap();
        assert_eq!(value, 1_250_000_000);
    }

    #[test]
    fn test_positive_shift() {
        let feed = PriceFeed {
            price: 3,
            conf: 0,
            expo: 2,
            publish_time: 0,
        };
        // 5 units (0 decimals) at $300 in 6-decimal units
        assert_eq!(PriceOracleAdapter::convert(&feed, 5, 0, 6).unwrap(), 1_500_000_000);
    }

    #[test]
    fn test_stale_price_rejected() {
        let (_, adapter) = setup(1_000);
        assert!(adapter.get_price(&ETH_FEED, &clock_at(1_060)).is_ok());
        assert_eq!(
            adapter.get_price(&ETH_FEED, &clock_at(1_061)),
            Err(LendingError::StaleOracle)
        );
    }

    #[test]
    fn test_future_publish_time_rejected() {
        let (_, adapter) = setup(1_000);
        assert_eq!(
            adapter.get_price(&ETH_FEED, &clock_at(999)),
            Err(LendingError::InvalidOraclePrice)
        );
        assert_eq!(
            adapter.get_value_usd(&ETH_FEED, 100_000_000, 8, &[], 0, &clock_at(940)),
            Err(LendingError::InvalidOraclePrice)
        );
        assert!(adapter.get_price(&ETH_FEED, &clock_at(1_000)).is_ok());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let (oracle, adapter) = setup(1_000);
        oracle.set_price(ETH_FEED, 0, -8, 1_000);
        assert_eq!(
            adapter.get_price(&ETH_FEED, &clock_at(1_000)),
            Err(LendingError::InvalidOraclePrice)
        );
        oracle.set_price(ETH_FEED, -5, -8, 1_000);
        assert_eq!(
            adapter.get_price(&ETH_FEED, &clock_at(1_000)),
            Err(LendingError::InvalidOraclePrice)
        );
    }

    #[test]
    fn test_missing_feed() {
        let (_, adapter) = setup(1_000);
        assert_eq!(
            adapter.get_price(&[9u8; 32], &clock_at(1_000)),
            Err(LendingError::PriceFeedNotFound)
        );
    }

    #[test]
    fn test_refresh_with_update_data() {
        let (_, adapter) = setup(1_000);
        let update = vec![PriceUpdateMessage::new(ETH_FEED, 200_000_000_000, 0, -8, 2_000).encode()];

        // Stale without the update
        assert_eq!(
            adapter.get_value_usd(&ETH_FEED, 100_000_000, 8, &[], 0, &clock_at(2_000)),
            Err(LendingError::StaleOracle)
        );

        assert_eq!(adapter.get_update_fee(&update), 1);
        assert_eq!(
            adapter.get_value_usd(&ETH_FEED, 100_000_000, 8, &update, 0, &clock_at(2_000)),
            Err(LendingError::InsufficientOracleFee)
        );

        let value = adapter
            .get_value_usd(&ETH_FEED, 100_000_000, 8, &update, 1, &clock_at(2_000))
            .unwrap();
        assert_eq!(value, 2_000_000_000);
    }
}
