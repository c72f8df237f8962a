//! Token transfers
//!
//! SPL-token style interface over every mint the pool touches: balances,
//! delegated transfers and approvals. Each successful transfer hands back a
//! receipt so a failed operation can undo the movements it already made.

use std::{cell::RefCell, collections::BTreeMap};

use solana_program::{msg, pubkey::Pubkey};

use crate::error::LendingError;

/// Record of one completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    pub mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    /// Delegate whose allowance was spent, for `transfer_from`
    pub delegate: Option<Pubkey>,
}

pub trait TokenProgram {
    fn decimals(&self, mint: &Pubkey) -> Result<u8, LendingError>;

    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64;

    fn allowance(&self, mint: &Pubkey, owner: &Pubkey, delegate: &Pubkey) -> u64;

    fn approve(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        delegate: &Pubkey,
        amount: u64,
    ) -> Result<(), LendingError>;

    /// Move tokens out of `from`, signed by `from`
    fn transfer(
        &self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<TransferReceipt, LendingError>;

    /// Move tokens out of `from` using `delegate`'s allowance
    fn transfer_from(
        &self,
        mint: &Pubkey,
        delegate: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<TransferReceipt, LendingError>;

    /// Undo a transfer made earlier in the same operation
    fn rollback(&self, receipt: &TransferReceipt) -> Result<(), LendingError>;
}

#[derive(Debug, Clone, Copy)]
struct MintInfo {
    decimals: u8,
    supply: u64,
}

/// Ledger-backed token program for simulations and tests
#[derive(Debug, Default)]
pub struct InMemoryTokenProgram {
    mints: RefCell<BTreeMap<Pubkey, MintInfo>>,
    balances: RefCell<BTreeMap<(Pubkey, Pubkey), u64>>,
    allowances: RefCell<BTreeMap<(Pubkey, Pubkey, Pubkey), u64>>,
}

impl InMemoryTokenProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_mint(&self, mint: Pubkey, decimals: u8) {
        self.mints
            .borrow_mut()
            .insert(mint, MintInfo { decimals, supply: 0 });
    }

    pub fn mint_to(&self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<(), LendingError> {
        let mut mints = self.mints.borrow_mut();
        let info = mints.get_mut(mint).ok_or(LendingError::InvalidAddress)?;
        info.supply = info
            .supply
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;

        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry((*mint, *owner)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn supply(&self, mint: &Pubkey) -> u64 {
        self.mints.borrow().get(mint).map_or(0, |info| info.supply)
    }

    fn move_balance(
        &self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), LendingError> {
        if !self.mints.borrow().contains_key(mint) {
            msg!("Unknown mint {}", mint);
            return Err(LendingError::InvalidAddress);
        }

        let mut balances = self.balances.borrow_mut();
        let from_balance = balances.get(&(*mint, *from)).copied().unwrap_or(0);
        if from_balance < amount {
            msg!("Insufficient balance: have {}, need {}", from_balance, amount);
            return Err(LendingError::InsufficientBalance);
        }
        if from == to {
            return Ok(());
        }

        let to_balance = balances.get(&(*mint, *to)).copied().unwrap_or(0);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;

        balances.insert((*mint, *from), from_balance - amount);
        balances.insert((*mint, *to), new_to);
        Ok(())
    }
}

impl TokenProgram for InMemoryTokenProgram {
    fn decimals(&self, mint: &Pubkey) -> Result<u8, LendingError> {
        self.mints
            .borrow()
            .get(mint)
            .map(|info| info.decimals)
            .ok_or(LendingError::InvalidAddress)
    }

    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.balances
            .borrow()
            .get(&(*mint, *owner))
            .copied()
            .unwrap_or(0)
    }

    fn allowance(&self, mint: &Pubkey, owner: &Pubkey, delegate: &Pubkey) -> u64 {
        self.allowances
            .borrow()
            .get(&(*mint, *owner, *delegate))
            .copied()
            .unwrap_or(0)
    }

    fn approve(
        &self,
        mint: &Pubkey,
        owner: &Pubkey,
        delegate: &Pubkey,
        amount: u64,
    ) -> Result<(), LendingError> {
        if !self.mints.borrow().contains_key(mint) {
            return Err(LendingError::InvalidAddress);
        }
        self.allowances
            .borrow_mut()
            .insert((*mint, *owner, *delegate), amount);
        Ok(())
    }

    fn transfer(
        &self,
        mint: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<TransferReceipt, LendingError> {
        self.move_balance(mint, from, to, amount)?;
        Ok(TransferReceipt {
            mint: *mint,
            from: *from,
            to: *to,
            amount,
            delegate: None,
        })
    }

    fn transfer_from(
        &self,
        mint: &Pubkey,
        delegate: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<TransferReceipt, LendingError> {
        let allowance = self.allowance(mint, from, delegate);
        if allowance < amount {
            msg!("Insufficient allowance: have {}, need {}", allowance, amount);
            return Err(LendingError::InsufficientAllowance);
        }

        self.move_balance(mint, from, to, amount)?;
        self.allowances
            .borrow_mut()
            .insert((*mint, *from, *delegate), allowance - amount);

        Ok(TransferReceipt {
            mint: *mint,
            from: *from,
            to: *to,
            amount,
            delegate: Some(*delegate),
        })
    }

    fn rollback(&self, receipt: &TransferReceipt) -> Result<(), LendingError> {
        self.move_balance(&receipt.mint, &receipt.to, &receipt.from, receipt.amount)?;

        if let Some(delegate) = receipt.delegate {
            let mut allowances = self.allowances.borrow_mut();
            let allowance = allowances
                .entry((receipt.mint, receipt.from, delegate))
                .or_insert(0);
            *allowance = allowance
                .checked_add(receipt.amount)
                .ok_or(LendingError::ArithmeticOverflow)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (InMemoryTokenProgram, Pubkey, Pubkey, Pubkey) {
        let tokens = InMemoryTokenProgram::new();
        let mint = Pubkey::new_unique();
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        tokens.create_mint(mint, 6);
        tokens.mint_to(&mint, &alice, 1_000).unwrap();
        (tokens, mint, alice, bob)
    }

    #[test]
    fn test_transfer_and_rollback() {
        let (tokens, mint, alice, bob) = setup();

        let receipt = tokens.transfer(&mint, &alice, &bob, 400).unwrap();
        assert_eq!(tokens.balance_of(&mint, &alice), 600);
        assert_eq!(tokens.balance_of(&mint, &bob), 400);

        tokens.rollback(&receipt).unwrap();
        assert_eq!(tokens.balance_of(&mint, &alice), 1_000);
        assert_eq!(tokens.balance_of(&mint, &bob), 0);
        assert_eq!(tokens.supply(&mint), 1_000);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let (tokens, mint, alice, bob) = setup();

        assert_eq!(
            tokens.transfer_from(&mint, &bob, &alice, &bob, 100),
            Err(LendingError::InsufficientAllowance)
        );

        tokens.approve(&mint, &alice, &bob, 300).unwrap();
        let receipt = tokens.transfer_from(&mint, &bob, &alice, &bob, 100).unwrap();
        assert_eq!(tokens.allowance(&mint, &alice, &bob), 200);

        tokens.rollback(&receipt).unwrap();
        assert_eq!(tokens.allowance(&mint, &alice, &bob), 300);
        assert_eq!(tokens.balance_of(&mint, &alice), 1_000);
    }

    #[test]
    fn test_insufficient_balance() {
        let (tokens, mint, alice, bob) = setup();
        assert_eq!(
            tokens.transfer(&mint, &alice, &bob, 1_001),
            Err(LendingError::InsufficientBalance)
        );
        assert_eq!(
            tokens.transfer(&Pubkey::new_unique(), &alice, &bob, 1),
            Err(LendingError::InvalidAddress)
        );
    }
}
