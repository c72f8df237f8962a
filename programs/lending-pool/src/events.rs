//! Event logging
//!
//! Every committed pool operation appends its events here and logs them in
//! indexer-parsable form. Aborted operations emit nothing.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::oracle::FeedId;

pub const EVENT_LOG_PREFIX: &str = "LENDING_POOL_EVENT";

/// Event type discriminator
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    // Collateral events
    CollateralAdded = 1,
    CollateralRemoved = 2,

    // Liquidity events
    Deposited = 10,
    Withdrawn = 11,

    // Loan events
    LoanCreated = 20,
    LoanRepaid = 21,
    LoanFullyRepaid = 22,
    LoanLiquidated = 23,

    // Fee events
    PlatformFeeCollected = 30,

    // Admin events
    Paused = 40,
    Unpaused = 41,
    OwnershipTransferred = 42,
    TreasuryUpdated = 43,
    PlatformFeeUpdated = 44,
    LiquidationEngineUpdated = 45,
    InterestRateModelUpdated = 46,
    EmergencyWithdrawal = 47,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    CollateralAdded {
        token: Pubkey,
        price_feed_id: FeedId,
        liquidation_threshold: u16,
        decimals: u8,
    },
    CollateralRemoved {
        token: Pubkey,
    },
    Deposited {
        lender: Pubkey,
        amount: u64,
        timestamp: i64,
    },
    Withdrawn {
        lender: Pubkey,
        amount: u64,
        interest: u64,
        timestamp: i64,
    },
    LoanCreated {
        loan_id: u64,
        borrower: Pubkey,
        amount: u64,
        collateral_token: Pubkey,
        collateral_amount: u64,
        interest_rate: u64,
    },
    LoanRepaid {
        loan_id: u64,
        amount: u64,
        remaining_debt: u64,
        timestamp: i64,
    },
    LoanFullyRepaid {
        loan_id: u64,
        total_repaid: u64,
        timestamp: i64,
    },
    LoanLiquidated {
        loan_id: u64,
        liquidator: Pubkey,
        debt_repaid: u64,
        collateral_seized: u64,
        bad_debt: u64,
    },
    PlatformFeeCollected {
        amount: u64,
        treasury: Pubkey,
    },
    Paused {
        by: Pubkey,
    },
    Unpaused {
        by: Pubkey,
    },
    OwnershipTransferred {
        previous_owner: Pubkey,
        new_owner: Pubkey,
    },
    TreasuryUpdated {
        old_treasury: Pubkey,
        new_treasury: Pubkey,
    },
    PlatformFeeUpdated {
        old_fee_bps: u16,
        new_fee_bps: u16,
    },
    LiquidationEngineUpdated {
        engine: Pubkey,
    },
    InterestRateModelUpdated {
        base_rate_bps: u64,
        multiplier_bps: u64,
        jump_multiplier_bps: u64,
        kink_bps: u64,
    },
    EmergencyWithdrawal {
        token: Pubkey,
        amount: u64,
        to: Pubkey,
    },
}

impl PoolEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            PoolEvent::CollateralAdded { .. } => EventType::CollateralAdded,
            PoolEvent::CollateralRemoved { .. } => EventType::CollateralRemoved,
            PoolEvent::Deposited { .. } => EventType::Deposited,
            PoolEvent::Withdrawn { .. } => EventType::Withdrawn,
            PoolEvent::LoanCreated { .. } => EventType::LoanCreated,
            PoolEvent::LoanRepaid { .. } => EventType::LoanRepaid,
            PoolEvent::LoanFullyRepaid { .. } => EventType::LoanFullyRepaid,
            PoolEvent::LoanLiquidated { .. } => EventType::LoanLiquidated,
            PoolEvent::PlatformFeeCollected { .. } => EventType::PlatformFeeCollected,
            PoolEvent::Paused { .. } => EventType::Paused,
            PoolEvent::Unpaused { .. } => EventType::Unpaused,
            PoolEvent::OwnershipTransferred { .. } => EventType::OwnershipTransferred,
            PoolEvent::TreasuryUpdated { .. } => EventType::TreasuryUpdated,
            PoolEvent::PlatformFeeUpdated { .. } => EventType::PlatformFeeUpdated,
            PoolEvent::LiquidationEngineUpdated { .. } => EventType::LiquidationEngineUpdated,
            PoolEvent::InterestRateModelUpdated { .. } => EventType::InterestRateModelUpdated,
            PoolEvent::EmergencyWithdrawal { .. } => EventType::EmergencyWithdrawal,
        }
    }

    pub fn emit(&self) {
        msg!("{}", EVENT_LOG_PREFIX);
        msg!("TYPE:{:?}", self.event_type());

        // Serialize and log event data
        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

/// Decode the `DATA:` line of a logged event
pub fn parse_event_data(line: &str) -> Option<PoolEvent> {
    let encoded = line.trim().strip_prefix("DATA:")?;
    let bytes = bs58::decode(encoded).into_vec().ok()?;
    PoolEvent::try_from_slice(&bytes).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Position in the log, starting at zero
    pub sequence: u64,
    pub event: PoolEvent,
}

/// Append-only log of committed events
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit and append a batch produced by one committed operation
    pub fn append(&mut self, events: Vec<PoolEvent>) {
        for event in events {
            event.emit();
            let sequence = self.records.len() as u64;
            self.records.push(EventRecord { sequence, event });
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn events(&self) -> impl DoubleEndedIterator<Item = &PoolEvent> {
        self.records.iter().map(|record| &record.event)
    }

    pub fn last(&self) -> Option<&PoolEvent> {
        self.records.last().map(|record| &record.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
