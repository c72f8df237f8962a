use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum LendingError {
    // Validation
    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Amount must be greater than zero")]
    InvalidAmount = 1,

    #[error("Collateral token not supported")]
    UnsupportedCollateral = 2,

    #[error("Invalid liquidation threshold")]
    InvalidThreshold = 3,

    #[error("Invalid token decimals")]
    InvalidDecimals = 4,

    #[error("Invalid interest rate model parameters")]
    InvalidRateModel = 5,

    #[error("Platform fee exceeds maximum")]
    FeeTooHigh = 6,

    #[error("Invalid address")]
    InvalidAddress = 7,

    #[error("Invalid pool configuration")]
    InvalidConfig = 8,

    // Authorization
    #[error("Caller is not the owner")]
    Unauthorized = 20,

    #[error("Caller is not the borrower")]
    NotBorrower = 21,

    // State
    #[error("Loan not found")]
    LoanNotFound = 40,

    #[error("Loan is not active")]
    LoanNotActive = 41,

    #[error("Pool is paused")]
    PoolPaused = 42,

    #[error("Pool is not paused")]
    PoolNotPaused = 43,

    #[error("Reentrant call rejected")]
    ReentrancyDetected = 44,

    #[error("Invalid reentrancy guard state")]
    InvalidGuardState = 45,

    #[error("Liquidation engine not set")]
    LiquidationEngineNotSet = 46,

    // Solvency
    #[error("Borrow amount exceeds collateral allowance")]
    ExceedsMaxBorrow = 60,

    #[error("Insufficient pool liquidity")]
    InsufficientLiquidity = 61,

    #[error("Withdrawal exceeds deposit balance")]
    InsufficientDeposit = 62,

    #[error("Repayment exceeds outstanding debt")]
    ExceedsDebt = 63,

    #[error("Loan is not liquidatable")]
    LoanNotLiquidatable = 64,

    #[error("Insufficient token balance")]
    InsufficientBalance = 65,

    #[error("Insufficient token allowance")]
    InsufficientAllowance = 66,

    #[error("Token transfer failed")]
    TransferFailed = 67,

    // Oracle
    #[error("Price data stale")]
    StaleOracle = 80,

    #[error("Price feed not found")]
    PriceFeedNotFound = 81,

    #[error("Invalid oracle price")]
    InvalidOraclePrice = 82,

    #[error("Insufficient oracle update fee")]
    InsufficientOracleFee = 83,

    #[error("Malformed price update")]
    InvalidPriceUpdate = 84,

    // Arithmetic
    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 100,

    #[error("Division by zero")]
    DivisionByZero = 101,
}

/// Failure classes, in the order a call is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authorization,
    State,
    Solvency,
    Oracle,
    Arithmetic,
}

impl LendingError {
    pub fn category(&self) -> ErrorCategory {
        match *self as u32 {
            0..=19 => ErrorCategory::Validation,
            20..=39 => ErrorCategory::Authorization,
            40..=59 => ErrorCategory::State,
            60..=79 => ErrorCategory::Solvency,
            80..=99 => ErrorCategory::Oracle,
            _ => ErrorCategory::Arithmetic,
        }
    }

    /// Recover the error from a `ProgramError::Custom` code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }
}

impl PrintProgramError for LendingError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("LendingError: {}", self);
    }
}

impl From<LendingError> for ProgramError {
    fn from(e: LendingError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LendingError {
    fn type_of() -> &'static str {
        "LendingError"
    }
}
