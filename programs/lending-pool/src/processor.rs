//! Instruction dispatch
//!
//! In-process decoder: the host authenticates the caller and passes its
//! identity in. The processor trusts `caller` as given and leaves every
//! permission check to the pool operation it dispatches to.

use solana_program::{clock::Clock, entrypoint::ProgramResult, msg, pubkey::Pubkey};

use crate::{instruction::LendingInstruction, pool::LendingPool};

/// Decode `instruction_data` and run it against `pool` on behalf of the
/// already authenticated `caller`
pub fn process_instruction(
    pool: &LendingPool,
    caller: &Pubkey,
    instruction_data: &[u8],
    clock: &Clock,
) -> ProgramResult {
    let caller = *caller;
    let ix = LendingInstruction::unpack(instruction_data)?;
    msg!("Instruction: {} from {}", ix.name(), caller);

    match ix {
        LendingInstruction::Deposit { amount } => pool.deposit(&caller, amount, clock)?,

        LendingInstruction::Withdraw { amount } => pool.withdraw(&caller, amount, clock)?,

        LendingInstruction::Borrow {
            amount,
            collateral_token,
            collateral_amount,
        } => {
            let loan_id = pool.borrow(&caller, amount, &collateral_token, collateral_amount, clock)?;
            msg!("Loan id: {}", loan_id);
        }

        LendingInstruction::Repay { loan_id, amount } => pool.repay(&caller, loan_id, amount, clock)?,

        LendingInstruction::Liquidate {
            loan_id,
            price_update_data,
            fee_paid,
        } => {
            pool.liquidate(&caller, loan_id, &price_update_data, fee_paid, clock)?;
        }

        LendingInstruction::AddCollateral {
            token,
            price_feed_id,
            liquidation_threshold,
            decimals,
        } => pool.add_collateral(&caller, &token, price_feed_id, liquidation_threshold, decimals)?,

        LendingInstruction::RemoveCollateral { token } => pool.remove_collateral(&caller, &token)?,

        LendingInstruction::SetPlatformFee { fee_bps } => pool.set_platform_fee(&caller, fee_bps)?,

        LendingInstruction::SetTreasury { treasury } => pool.set_treasury(&caller, &treasury)?,

        LendingInstruction::Pause => pool.pause(&caller)?,

        LendingInstruction::Unpause => pool.unpause(&caller)?,

        LendingInstruction::SetLiquidationEngine { engine } => {
            pool.set_liquidation_engine(&caller, &engine)?
        }

        LendingInstruction::UpdateInterestRateModel {
            base_rate_bps,
            multiplier_bps,
            jump_multiplier_bps,
            kink_bps,
        } => pool.update_interest_rate_model(
            &caller,
            base_rate_bps,
            multiplier_bps,
            jump_multiplier_bps,
            kink_bps,
        )?,

        LendingInstruction::TransferOwnership { new_owner } => {
            pool.transfer_ownership(&caller, &new_owner)?
        }

        LendingInstruction::RenounceOwnership => pool.renounce_ownership(&caller)?,

        LendingInstruction::EmergencyWithdraw { token, amount } => {
            pool.emergency_withdraw(&caller, &token, amount)?
        }
    }

    Ok(())
}
