//! Pure aggregate functions over loaded collections.
//!
//! Nothing here touches a store; [`super::QueryService`] loads the
//! collections and delegates.

use fundbook_shared::types::MemberId;
use rust_decimal::Decimal;

use super::types::TransactionEntry;
use crate::ledger::types::{Deposit, Member, MemberStatus, Withdrawal, WithdrawalStatus};

/// Display name used for records whose member has been deleted.
pub const UNKNOWN_MEMBER: &str = "Unknown member";

/// Sum of all deposit amounts.
#[must_use]
pub fn total_deposits(deposits: &[Deposit]) -> Decimal {
    deposits.iter().map(|d| d.amount).sum()
}

/// Sum of approved withdrawal amounts.
#[must_use]
pub fn total_approved_withdrawals(withdrawals: &[Withdrawal]) -> Decimal {
    withdrawals
        .iter()
        .filter(|w| w.status == WithdrawalStatus::Approved)
        .map(|w| w.amount)
        .sum()
}

/// Deposits minus approved withdrawals.
#[must_use]
pub fn total_funds(deposits: &[Deposit], withdrawals: &[Withdrawal]) -> Decimal {
    total_deposits(deposits) - total_approved_withdrawals(withdrawals)
}

/// Number of withdrawals awaiting a decision.
#[must_use]
pub fn pending_withdrawal_count(withdrawals: &[Withdrawal]) -> usize {
    withdrawals
        .iter()
        .filter(|w| w.status == WithdrawalStatus::Pending)
        .count()
}

/// Number of members with `active` status.
#[must_use]
pub fn active_member_count(members: &[Member]) -> usize {
    members
        .iter()
        .filter(|m| m.status == MemberStatus::Active)
        .count()
}

/// All of one member's deposits and withdrawals (any status), newest first.
#[must_use]
pub fn member_history(
    member_id: MemberId,
    deposits: &[Deposit],
    withdrawals: &[Withdrawal],
) -> Vec<TransactionEntry> {
    let mut entries: Vec<TransactionEntry> = deposits
        .iter()
        .filter(|d| d.member_id == member_id)
        .map(TransactionEntry::from)
        .chain(
            withdrawals
                .iter()
                .filter(|w| w.member_id == member_id)
                .map(TransactionEntry::from),
        )
        .collect();
    sort_newest_first(&mut entries);
    entries
}

/// The `limit` newest deposits and approved withdrawals across the fund.
///
/// Withdrawal amounts are negated so the feed reads as signed cash flow.
#[must_use]
pub fn recent_transactions(
    deposits: &[Deposit],
    withdrawals: &[Withdrawal],
    limit: usize,
) -> Vec<TransactionEntry> {
    let mut entries: Vec<TransactionEntry> = deposits
        .iter()
        .map(TransactionEntry::from)
        .chain(
            withdrawals
                .iter()
                .filter(|w| w.status == WithdrawalStatus::Approved)
                .map(|w| {
                    let mut entry = TransactionEntry::from(w);
                    entry.amount = -entry.amount;
                    entry
                }),
        )
        .collect();
    sort_newest_first(&mut entries);
    entries.truncate(limit);
    entries
}

/// Stable descending sort; ties keep deposits before withdrawals in record order.
fn sort_newest_first(entries: &mut [TransactionEntry]) {
    entries.sort_by_key(|e| std::cmp::Reverse(e.timestamp()));
}

/// Whether the member's current balance covers `withdrawal`.
///
/// False when the member no longer exists.
#[must_use]
pub fn can_cover(members: &[Member], withdrawal: &Withdrawal) -> bool {
    members
        .iter()
        .find(|m| m.id == withdrawal.member_id)
        .is_some_and(|m| m.balance >= withdrawal.amount)
}

/// Case-insensitive substring match on name, email, or phone.
#[must_use]
pub fn search_members<'a>(members: &'a [Member], query: &str) -> Vec<&'a Member> {
    let needle = query.trim().to_lowercase();
    members
        .iter()
        .filter(|m| {
            needle.is_empty()
                || m.name.to_lowercase().contains(&needle)
                || m.email.to_lowercase().contains(&needle)
                || m.phone.contains(&needle)
        })
        .collect()
}

/// Case-insensitive substring match on member name or depositor info.
#[must_use]
pub fn search_deposits<'a>(deposits: &'a [Deposit], query: &str) -> Vec<&'a Deposit> {
    let needle = query.trim().to_lowercase();
    deposits
        .iter()
        .filter(|d| {
            needle.is_empty()
                || d.member_name.to_lowercase().contains(&needle)
                || d.depositor_info.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Case-insensitive substring match on member name.
#[must_use]
pub fn search_withdrawals<'a>(withdrawals: &'a [Withdrawal], query: &str) -> Vec<&'a Withdrawal> {
    let needle = query.trim().to_lowercase();
    withdrawals
        .iter()
        .filter(|w| needle.is_empty() || w.member_name.to_lowercase().contains(&needle))
        .collect()
}
