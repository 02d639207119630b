//! Member-fund ledger logic.
//!
//! This module implements the balance-consistency core:
//! - Domain types for members, deposits, withdrawals, and settings
//! - The ledger engine that applies and reverses balance changes
//! - The withdrawal approval workflow
//! - Balance reconciliation against the records
//! - Error types for ledger operations

pub mod balance;
pub mod engine;
pub mod error;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod engine_props;

pub use balance::{BalanceDrift, expected_balance, reconcile};
pub use engine::{DepositReversal, LedgerEngine};
pub use error::LedgerError;
pub use types::{
    Deposit, Member, MemberStatus, MemberUpdate, NewMember, Settings, Withdrawal,
    WithdrawalStatus,
};
pub use workflow::{WithdrawalWorkflow, WorkflowAction};
