use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{error::LendingError, oracle::FeedId};

/// Instruction data: one tag byte followed by the borsh payload. The
/// caller is not part of the data, the host supplies it at dispatch.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum LendingInstruction {
    /// Supply lending asset to the pool
    Deposit { amount: u64 },

    /// Take lending asset (interest first) out of the pool
    Withdraw { amount: u64 },

    /// Open a loan against collateral
    Borrow {
        amount: u64,
        collateral_token: Pubkey,
        collateral_amount: u64,
    },

    /// Repay part or all of a loan
    Repay { loan_id: u64, amount: u64 },

    /// Liquidate an unhealthy loan after refreshing its price feed
    Liquidate {
        loan_id: u64,
        price_update_data: Vec<Vec<u8>>,
        fee_paid: u64,
    },

    /// Owner: approve a collateral token
    AddCollateral {
        token: Pubkey,
        price_feed_id: FeedId,
        liquidation_threshold: u16,
        decimals: u8,
    },

    /// Owner: stop new borrows against a collateral token
    RemoveCollateral { token: Pubkey },

    /// Owner: set the platform fee (bps)
    SetPlatformFee { fee_bps: u16 },

    /// Owner: set the fee recipient
    SetTreasury { treasury: Pubkey },

    /// Owner
    Pause,

    /// Owner
    Unpause,

    /// Owner: enable liquidations
    SetLiquidationEngine { engine: Pubkey },

    /// Owner: replace all rate curve parameters
    UpdateInterestRateModel {
        base_rate_bps: u64,
        multiplier_bps: u64,
        jump_multiplier_bps: u64,
        kink_bps: u64,
    },

    /// Owner
    TransferOwnership { new_owner: Pubkey },

    /// Owner
    RenounceOwnership,

    /// Owner, paused pool only: recover tokens from custody
    EmergencyWithdraw { token: Pubkey, amount: u64 },
}

impl LendingInstruction {
    const MAX_TAG: u8 = 15;

    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, _) = input
            .split_first()
            .ok_or(LendingError::InvalidInstruction)?;

        if tag > Self::MAX_TAG {
            msg!("Unknown instruction tag {}", tag);
            return Err(LendingError::InvalidInstruction.into());
        }

        Self::try_from_slice(input).map_err(|_| LendingError::InvalidInstruction.into())
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|_| ProgramError::InvalidInstructionData)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "Deposit",
            Self::Withdraw { .. } => "Withdraw",
            Self::Borrow { .. } => "Borrow",
            Self::Repay { .. } => "Repay",
            Self::Liquidate { .. } => "Liquidate",
            Self::AddCollateral { .. } => "AddCollateral",
            Self::RemoveCollateral { .. } => "RemoveCollateral",
            Self::SetPlatformFee { .. } => "SetPlatformFee",
            Self::SetTreasury { .. } => "SetTreasury",
            Self::Pause => "Pause",
            Self::Unpause => "Unpause",
            Self::SetLiquidationEngine { .. } => "SetLiquidationEngine",
            Self::UpdateInterestRateModel { .. } => "UpdateInterestRateModel",
            Self::TransferOwnership { .. } => "TransferOwnership",
            Self::RenounceOwnership => "RenounceOwnership",
            Self::EmergencyWithdraw { .. } => "EmergencyWithdraw",
        }
    }
}

pub fn deposit(amount: u64) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Deposit { amount }.pack()
}

pub fn withdraw(amount: u64) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Withdraw { amount }.pack()
}

pub fn borrow(
    amount: u64,
    collateral_token: &Pubkey,
    collateral_amount: u64,
) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Borrow {
        amount,
        collateral_token: *collateral_token,
        collateral_amount,
    }
    .pack()
}

pub fn repay(loan_id: u64, amount: u64) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Repay { loan_id, amount }.pack()
}

pub fn liquidate(
    loan_id: u64,
    price_update_data: Vec<Vec<u8>>,
    fee_paid: u64,
) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Liquidate {
        loan_id,
        price_update_data,
        fee_paid,
    }
    .pack()
}

pub fn add_collateral(
    token: &Pubkey,
    price_feed_id: FeedId,
    liquidation_threshold: u16,
    decimals: u8,
) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::AddCollateral {
        token: *token,
        price_feed_id,
        liquidation_threshold,
        decimals,
    }
    .pack()
}

pub fn remove_collateral(token: &Pubkey) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::RemoveCollateral { token: *token }.pack()
}

pub fn set_platform_fee(fee_bps: u16) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::SetPlatformFee { fee_bps }.pack()
}

pub fn set_treasury(treasury: &Pubkey) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::SetTreasury { treasury: *treasury }.pack()
}

pub fn pause() -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Pause.pack()
}

pub fn unpause() -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::Unpause.pack()
}

pub fn set_liquidation_engine(engine: &Pubkey) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::SetLiquidationEngine { engine: *engine }.pack()
}

pub fn update_interest_rate_model(
    base_rate_bps: u64,
    multiplier_bps: u64,
    jump_multiplier_bps: u64,
    kink_bps: u64,
) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::UpdateInterestRateModel {
        base_rate_bps,
        multiplier_bps,
        jump_multiplier_bps,
        kink_bps,
    }
    .pack()
}

pub fn transfer_ownership(new_owner: &Pubkey) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::TransferOwnership { new_owner: *new_owner }.pack()
}

pub fn renounce_ownership() -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::RenounceOwnership.pack()
}

pub fn emergency_withdraw(token: &Pubkey, amount: u64) -> Result<Vec<u8>, ProgramError> {
    LendingInstruction::EmergencyWithdraw { token: *token, amount }.pack()
}
