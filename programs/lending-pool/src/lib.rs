// Over-collateralized lending pool
// Accounting and risk engine: deposits, loans, interest accrual, oracle
// valuation and liquidation, executed as atomic single-shot operations.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod instruction;
pub mod interest_rate;
pub mod ledger;
pub mod liquidation;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod processor;
pub mod security;
pub mod state;
pub mod token;

pub use config::PoolConfig;
pub use error::{ErrorCategory, LendingError};
pub use events::{EventLog, PoolEvent};
pub use interest_rate::InterestRateModel;
pub use ledger::LoanLedger;
pub use liquidation::LiquidationEngine;
pub use oracle::{PriceOracle, PriceOracleAdapter, PushOracle};
pub use pool::LendingPool;
pub use state::{ApprovedCollateral, CollateralRegistry, Deposit, Loan, LoanStatus};
pub use token::{InMemoryTokenProgram, TokenProgram};

// Declare program ID; also the default custody address of a pool
solana_program::declare_id!("LendPoo111111111111111111111111111111111111");
