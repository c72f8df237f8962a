use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::{
    constants::{MAX_TOKEN_DECIMALS, MIN_LIQUIDATION_THRESHOLD_BPS},
    error::LendingError,
    oracle::FeedId,
};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovedCollateral {
    /// New borrows allowed against this token
    pub is_approved: bool,

    pub price_feed_id: FeedId,

    /// Required collateral-to-debt ratio in bps (15000 = 150%)
    pub liquidation_threshold: u16,

    pub decimals: u8,
}

/// Collateral assets keyed by mint. Removal only revokes approval, the
/// record stays for loans already open against the asset.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CollateralRegistry {
    assets: BTreeMap<Pubkey, ApprovedCollateral>,
}

impl CollateralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Approve `token`, replacing any earlier entry
    pub fn add(
        &mut self,
        token: Pubkey,
        price_feed_id: FeedId,
        liquidation_threshold: u16,
        decimals: u8,
    ) -> Result<ApprovedCollateral, LendingError> {
        if token == Pubkey::default() {
            return Err(LendingError::InvalidAddress);
        }
        if liquidation_threshold < MIN_LIQUIDATION_THRESHOLD_BPS {
            msg!(
                "Liquidation threshold {} below minimum {}",
                liquidation_threshold,
                MIN_LIQUIDATION_THRESHOLD_BPS
            );
            return Err(LendingError::InvalidThreshold);
        }
        if decimals > MAX_TOKEN_DECIMALS {
            msg!("Collateral decimals {} above maximum {}", decimals, MAX_TOKEN_DECIMALS);
            return Err(LendingError::InvalidDecimals);
        }

        let entry = ApprovedCollateral {
            is_approved: true,
            price_feed_id,
            liquidation_threshold,
            decimals,
        };
        self.assets.insert(token, entry);
        Ok(entry)
    }

    pub fn remove(&mut self, token: &Pubkey) -> Result<(), LendingError> {
        let entry = self
            .assets
            .get_mut(token)
            .ok_or(LendingError::UnsupportedCollateral)?;
        entry.is_approved = false;
        Ok(())
    }

    pub fn is_supported(&self, token: &Pubkey) -> bool {
        self.assets.get(token).map_or(false, |entry| entry.is_approved)
    }

    /// Entry regardless of approval, used to value existing loans
    pub fn get(&self, token: &Pubkey) -> Option<&ApprovedCollateral> {
        self.assets.get(token)
    }

    /// Entry for a new borrow; fails unless currently approved
    pub fn require_supported(&self, token: &Pubkey) -> Result<&ApprovedCollateral, LendingError> {
        match self.assets.get(token) {
            Some(entry) if entry.is_approved => Ok(entry),
            _ => {
                msg!("Collateral {} is not supported", token);
                Err(LendingError::UnsupportedCollateral)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
