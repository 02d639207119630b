//! Ledger domain types: members, deposits, withdrawals, settings.
//!
//! Records serialize with camelCase field names, which is the layout the
//! stored collections use.

use chrono::{DateTime, Utc};
use fundbook_shared::types::{DepositId, MemberId, WithdrawalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a member is currently participating in the fund.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Participating member.
    #[default]
    Active,
    /// Member kept on record but not participating.
    Inactive,
}

impl MemberStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked account holder.
///
/// `balance` is stored, but only the ledger engine writes it: it equals the
/// member's deposits minus their approved withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique identifier.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Participation status.
    pub status: MemberStatus,
    /// Running balance.
    pub balance: Decimal,
    /// When the member joined.
    pub joined_date: DateTime<Utc>,
    /// Profile image reference (URL or data URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// Input for creating a member. There is no balance: new members start at zero.
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    /// Display name (required).
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Initial status.
    pub status: MemberStatus,
    /// Profile image reference.
    pub profile_picture: Option<String>,
}

/// Partial update of a member's profile fields.
///
/// The balance is deliberately absent; it moves only through ledger operations.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New status.
    pub status: Option<MemberStatus>,
    /// New profile picture; `Some(None)` clears it.
    pub profile_picture: Option<Option<String>>,
}

impl MemberUpdate {
    /// Applies the update to a member in place.
    pub fn apply_to(self, member: &mut Member) {
        if let Some(name) = self.name {
            member.name = name;
        }
        if let Some(email) = self.email {
            member.email = email;
        }
        if let Some(phone) = self.phone {
            member.phone = phone;
        }
        if let Some(status) = self.status {
            member.status = status;
        }
        if let Some(picture) = self.profile_picture {
            member.profile_picture = picture;
        }
    }
}

/// An immutable record of money paid into a member's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    /// Unique identifier.
    pub id: DepositId,
    /// Member credited. May no longer exist.
    pub member_id: MemberId,
    /// Member name as it was when the deposit was recorded.
    pub member_name: String,
    /// Amount deposited (positive).
    pub amount: Decimal,
    /// Free-text note on who deposited.
    pub depositor_info: String,
    /// When the deposit was recorded.
    pub date: DateTime<Utc>,
    /// `date` as epoch milliseconds, used for ordering.
    pub timestamp: i64,
}

/// Withdrawal approval state. `Approved` and `Denied` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved and deducted from the member's balance.
    Approved,
    /// Denied; no balance effect.
    Denied,
}

impl WithdrawalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    /// Returns true once a decision has been made.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request to take money out of a member's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    /// Unique identifier.
    pub id: WithdrawalId,
    /// Member debited. May no longer exist.
    pub member_id: MemberId,
    /// Member name as it was when the request was made.
    pub member_name: String,
    /// Amount requested (positive).
    pub amount: Decimal,
    /// Approval state.
    pub status: WithdrawalStatus,
    /// When the request was made.
    pub request_date: DateTime<Utc>,
    /// When it was approved or denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_date: Option<DateTime<Utc>>,
    /// Requester's reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Fund-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Advisory withdrawal limit, shown on the dashboard. Not enforced.
    pub withdrawal_limit: Decimal,
}

impl Settings {
    /// Default withdrawal limit.
    pub const DEFAULT_WITHDRAWAL_LIMIT: i64 = 10_000;
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            withdrawal_limit: Decimal::new(Self::DEFAULT_WITHDRAWAL_LIMIT, 0),
        }
    }
}
