//! Security module
//!
//! Guards shared by every state-mutating entry point

pub mod reentrancy_guard;

pub use reentrancy_guard::*;
