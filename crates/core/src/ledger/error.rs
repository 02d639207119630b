//! Ledger error types.
//!
//! Every failed ledger operation leaves stored state unchanged and returns
//! one of these to the caller, which decides how to surface it.

use fundbook_shared::types::{DepositId, MemberId, WithdrawalId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::types::WithdrawalStatus;
use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount cannot be zero.
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Member input failed validation.
    #[error("Invalid member: {0}")]
    InvalidMember(String),

    // ========== Reference Errors ==========
    /// Operation references a member id that does not exist.
    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),

    /// Operation references a deposit or withdrawal that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Record kind (`deposit` or `withdrawal`).
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    // ========== State Errors ==========
    /// Withdrawal status change not permitted from its current state.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: WithdrawalStatus,
        /// The attempted target status.
        to: WithdrawalStatus,
    },

    /// Approval would drive the member's balance below zero.
    #[error("Insufficient balance for member {member_id}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        /// The member being debited.
        member_id: MemberId,
        /// Balance at the time of the check.
        balance: Decimal,
        /// Withdrawal amount.
        requested: Decimal,
    },

    /// Reversing a deposit would leave the member overdrawn.
    #[error("Deleting this deposit would overdraw member {member_id}: balance {balance}, deposit {amount}")]
    ReversalWouldOverdraw {
        /// The member whose balance would go negative.
        member_id: MemberId,
        /// Balance before the reversal.
        balance: Decimal,
        /// Deposit amount being reversed.
        amount: Decimal,
    },

    // ========== Storage Errors ==========
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Create a not-found error for a deposit.
    #[must_use]
    pub fn deposit_not_found(id: DepositId) -> Self {
        Self::NotFound {
            entity: "deposit",
            id: id.to_string(),
        }
    }

    /// Create a not-found error for a withdrawal.
    #[must_use]
    pub fn withdrawal_not_found(id: WithdrawalId) -> Self {
        Self::NotFound {
            entity: "withdrawal",
            id: id.to_string(),
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidMember(_) => "INVALID_MEMBER",
            Self::UnknownMember(_) => "UNKNOWN_MEMBER",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ReversalWouldOverdraw { .. } => "REVERSAL_WOULD_OVERDRAW",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true for errors caused by the caller's input rather than storage.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
