//! Ledger consistency: what a member's balance should be.
//!
//! A member's balance equals the sum of their deposits minus the sum of
//! their approved withdrawals. The engine keeps the stored balance in step
//! incrementally; [`reconcile`] recomputes it from the records and reports
//! every member where the two disagree.

use fundbook_shared::types::MemberId;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::types::{Deposit, Member, Withdrawal, WithdrawalStatus};

/// A member whose stored balance differs from the ledger sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    /// The member.
    pub member_id: MemberId,
    /// The member's current name.
    pub member_name: String,
    /// Balance stored on the member record.
    pub stored: Decimal,
    /// Balance implied by the deposit and withdrawal records.
    pub expected: Decimal,
}

impl BalanceDrift {
    /// Stored minus expected.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.stored - self.expected
    }
}

/// Computes the ledger balance for one member.
#[must_use]
pub fn expected_balance(
    member_id: MemberId,
    deposits: &[Deposit],
    withdrawals: &[Withdrawal],
) -> Decimal {
    let credited: Decimal = deposits
        .iter()
        .filter(|d| d.member_id == member_id)
        .map(|d| d.amount)
        .sum();
    let debited: Decimal = withdrawals
        .iter()
        .filter(|w| w.member_id == member_id && w.status == WithdrawalStatus::Approved)
        .map(|w| w.amount)
        .sum();
    credited - debited
}

/// Returns one entry per member whose stored balance is not ledger-consistent.
///
/// Records pointing at deleted members are ignored. Deleting an approved
/// withdrawal is the one operation that legitimately leaves drift behind.
#[must_use]
pub fn reconcile(
    members: &[Member],
    deposits: &[Deposit],
    withdrawals: &[Withdrawal],
) -> Vec<BalanceDrift> {
    members
        .iter()
        .filter_map(|member| {
            let expected = expected_balance(member.id, deposits, withdrawals);
            (expected != member.balance).then(|| BalanceDrift {
                member_id: member.id,
                member_name: member.name.clone(),
                stored: member.balance,
                expected,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fundbook_shared::types::{DepositId, WithdrawalId};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use crate::ledger::types::MemberStatus;

    fn member(id: MemberId, balance: Decimal) -> Member {
        Member {
            id,
            name: "Ram".to_string(),
            email: String::new(),
            phone: String::new(),
            status: MemberStatus::Active,
            balance,
            joined_date: Utc::now(),
            profile_picture: None,
        }
    }

    fn deposit(member_id: MemberId, amount: Decimal) -> Deposit {
        let now = Utc::now();
        Deposit {
            id: DepositId::new(),
            member_id,
            member_name: "Ram".to_string(),
            amount,
            depositor_info: String::new(),
            date: now,
            timestamp: now.timestamp_millis(),
        }
    }

    fn withdrawal(member_id: MemberId, amount: Decimal, status: WithdrawalStatus) -> Withdrawal {
        Withdrawal {
            id: WithdrawalId::new(),
            member_id,
            member_name: "Ram".to_string(),
            amount,
            status,
            request_date: Utc::now(),
            processed_date: None,
            reason: None,
        }
    }

    #[test]
    fn test_expected_balance_counts_only_approved_withdrawals() {
        let id = MemberId::new();
        let other = MemberId::new();
        let deposits = vec![deposit(id, dec!(1000)), deposit(other, dec!(50))];
        let withdrawals = vec![
            withdrawal(id, dec!(400), WithdrawalStatus::Approved),
            withdrawal(id, dec!(100), WithdrawalStatus::Pending),
            withdrawal(id, dec!(200), WithdrawalStatus::Denied),
        ];
        assert_eq!(expected_balance(id, &deposits, &withdrawals), dec!(600));
        assert_eq!(expected_balance(other, &deposits, &withdrawals), dec!(50));
    }

    #[test]
    fn test_reconcile_reports_only_drifting_members() {
        let good = MemberId::new();
        let bad = MemberId::new();
        let members = vec![member(good, dec!(100)), member(bad, dec!(700))];
        let deposits = vec![deposit(good, dec!(100)), deposit(bad, dec!(1000))];
        let withdrawals = vec![withdrawal(bad, dec!(400), WithdrawalStatus::Approved)];

        let drift = reconcile(&members, &deposits, &withdrawals);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].member_id, bad);
        assert_eq!(drift[0].expected, dec!(600));
        assert_eq!(drift[0].difference(), dec!(100));
    }

    #[test]
    fn test_reconcile_ignores_orphans() {
        let members = vec![member(MemberId::new(), Decimal::ZERO)];
        let deposits = vec![deposit(MemberId::new(), dec!(10))];
        assert!(reconcile(&members, &deposits, &[]).is_empty());
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        /// Balance is additive over the deposit list.
        #[test]
        fn prop_expected_balance_is_sum_of_deposits(
            amounts in prop::collection::vec(amount_strategy(), 0..20)
        ) {
            let id = MemberId::new();
            let deposits: Vec<_> = amounts.iter().map(|a| deposit(id, *a)).collect();
            let total: Decimal = amounts.iter().copied().sum();
            prop_assert_eq!(expected_balance(id, &deposits, &[]), total);
        }
    }
}
