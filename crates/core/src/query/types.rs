//! Read-model types.

use chrono::{DateTime, Utc};
use fundbook_shared::types::MemberId;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::types::{Deposit, Withdrawal, WithdrawalStatus};

/// Kind of a merged transaction entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in.
    Deposit,
    /// Money out (or requested out).
    Withdrawal,
}

impl TransactionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deposit or withdrawal flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    /// Deposit or withdrawal id.
    pub id: Uuid,
    /// Which collection the entry came from.
    pub kind: TransactionKind,
    /// Member the entry belongs to.
    pub member_id: MemberId,
    /// Name snapshot taken when the record was made.
    pub member_name: String,
    /// Amount; negated for withdrawals in the recent-activity feed.
    pub amount: Decimal,
    /// Deposit time or withdrawal request time.
    pub occurred_at: DateTime<Utc>,
    /// Withdrawal status; `None` for deposits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WithdrawalStatus>,
    /// Depositor info or withdrawal reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TransactionEntry {
    /// Sort key in epoch milliseconds.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.occurred_at.timestamp_millis()
    }
}

impl From<&Deposit> for TransactionEntry {
    fn from(deposit: &Deposit) -> Self {
        Self {
            id: deposit.id.into_inner(),
            kind: TransactionKind::Deposit,
            member_id: deposit.member_id,
            member_name: deposit.member_name.clone(),
            amount: deposit.amount,
            occurred_at: DateTime::from_timestamp_millis(deposit.timestamp)
                .unwrap_or(deposit.date),
            status: None,
            detail: Some(deposit.depositor_info.clone()).filter(|s| !s.is_empty()),
        }
    }
}

impl From<&Withdrawal> for TransactionEntry {
    fn from(withdrawal: &Withdrawal) -> Self {
        Self {
            id: withdrawal.id.into_inner(),
            kind: TransactionKind::Withdrawal,
            member_id: withdrawal.member_id,
            member_name: withdrawal.member_name.clone(),
            amount: withdrawal.amount,
            occurred_at: withdrawal.request_date,
            status: Some(withdrawal.status),
            detail: withdrawal.reason.clone(),
        }
    }
}

/// Fund-wide figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Sum of every deposit.
    pub total_deposits: Decimal,
    /// Deposits minus approved withdrawals.
    pub total_funds: Decimal,
    /// Funds available for withdrawal (currently equal to `total_funds`).
    pub available_balance: Decimal,
    /// Advisory per-withdrawal limit.
    pub withdrawal_limit: Decimal,
    /// Number of member records.
    pub total_members: usize,
    /// Members with `active` status.
    pub active_members: usize,
    /// Withdrawals awaiting a decision.
    pub pending_withdrawals: usize,
}
