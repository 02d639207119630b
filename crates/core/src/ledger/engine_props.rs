//! Property-based tests for LedgerEngine.
//!
//! - Stored balances always equal deposits minus approved withdrawals
//! - Without deposit deletions, approvals never overdraw a member

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::LedgerEngine;
use super::types::{NewMember, WithdrawalStatus};
use crate::store::{Collections, MemoryStore};

const MEMBERS: usize = 3;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, Decimal),
    Request(usize, Decimal),
    Approve(usize),
    Deny(usize),
    DeleteDeposit(usize),
}

/// Strategy to generate positive amounts (0.01 to 2,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..200_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn op(with_deletes: bool) -> BoxedStrategy<Op> {
    let base = prop_oneof![
        3 => (0..MEMBERS, amount()).prop_map(|(m, a)| Op::Deposit(m, a)),
        3 => (0..MEMBERS, amount()).prop_map(|(m, a)| Op::Request(m, a)),
        3 => any::<usize>().prop_map(Op::Approve),
        1 => any::<usize>().prop_map(Op::Deny),
    ];
    if with_deletes {
        prop_oneof![4 => base, 1 => any::<usize>().prop_map(Op::DeleteDeposit)].boxed()
    } else {
        base.boxed()
    }
}

/// Applies the operations, ignoring rejections, and returns the engine.
fn run(ops: &[Op]) -> LedgerEngine<MemoryStore> {
    let engine = LedgerEngine::new(MemoryStore::new());
    let members: Vec<_> = (0..MEMBERS)
        .map(|i| {
            engine
                .add_member(NewMember {
                    name: format!("member-{i}"),
                    ..NewMember::default()
                })
                .unwrap()
                .id
        })
        .collect();

    for op in ops {
        let collections = Collections::new(engine.store());
        match *op {
            Op::Deposit(m, amount) => {
                engine.record_deposit(members[m], amount, "").unwrap();
            }
            Op::Request(m, amount) => {
                engine.request_withdrawal(members[m], amount, None).unwrap();
            }
            Op::Approve(i) => {
                let withdrawals = collections.withdrawals().unwrap();
                if !withdrawals.is_empty() {
                    let _ = engine.approve_withdrawal(withdrawals[i % withdrawals.len()].id);
                }
            }
            Op::Deny(i) => {
                let withdrawals = collections.withdrawals().unwrap();
                if !withdrawals.is_empty() {
                    let _ = engine.deny_withdrawal(withdrawals[i % withdrawals.len()].id);
                }
            }
            Op::DeleteDeposit(i) => {
                let deposits = collections.deposits().unwrap();
                if !deposits.is_empty() {
                    engine
                        .delete_deposit(deposits[i % deposits.len()].id)
                        .unwrap();
                }
            }
        }
    }
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balances_match_records(ops in prop::collection::vec(op(true), 0..40)) {
        let engine = run(&ops);
        prop_assert!(engine.reconcile().unwrap().is_empty());
    }

    #[test]
    fn prop_approvals_never_overdraw(ops in prop::collection::vec(op(false), 0..40)) {
        let engine = run(&ops);
        let collections = Collections::new(engine.store());
        for member in collections.members().unwrap() {
            prop_assert!(member.balance >= Decimal::ZERO);
        }
        for w in collections.withdrawals().unwrap() {
            prop_assert_eq!(w.processed_date.is_some(), w.status != WithdrawalStatus::Pending);
        }
    }
}
