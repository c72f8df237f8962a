pub mod collateral;
pub mod deposit;
pub mod loan;

pub use collateral::*;
pub use deposit::*;
pub use loan::*;
