//! Store-backed read service.

use fundbook_shared::types::{MemberId, WithdrawalId};
use rust_decimal::Decimal;

use super::aggregate;
use super::types::{DashboardStats, TransactionEntry};
use crate::ledger::types::{Deposit, Member, Withdrawal, WithdrawalStatus};
use crate::store::{Collections, Store, StoreError};

/// Number of entries the dashboard's recent-activity feed shows.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Answers read-only questions about the fund.
///
/// Every call loads fresh collections from the store, so results always
/// reflect the latest committed mutation.
pub struct QueryService<S> {
    store: S,
}

impl<S: Store> QueryService<S> {
    /// Creates a query service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn collections(&self) -> Collections<'_, S> {
        Collections::new(&self.store)
    }

    /// All members in insertion order.
    pub fn members(&self) -> Result<Vec<Member>, StoreError> {
        self.collections().members()
    }

    /// All deposits in insertion order.
    pub fn deposits(&self) -> Result<Vec<Deposit>, StoreError> {
        self.collections().deposits()
    }

    /// All withdrawals in insertion order.
    pub fn withdrawals(&self) -> Result<Vec<Withdrawal>, StoreError> {
        self.collections().withdrawals()
    }

    /// Looks up one member.
    pub fn member(&self, member_id: MemberId) -> Result<Option<Member>, StoreError> {
        Ok(self.members()?.into_iter().find(|m| m.id == member_id))
    }

    /// The member's current name, or `"Unknown member"` if they were deleted.
    pub fn member_display_name(&self, member_id: MemberId) -> Result<String, StoreError> {
        Ok(self
            .member(member_id)?
            .map_or_else(|| aggregate::UNKNOWN_MEMBER.to_string(), |m| m.name))
    }

    /// Sum of all deposit amounts.
    pub fn total_deposits(&self) -> Result<Decimal, StoreError> {
        Ok(aggregate::total_deposits(&self.deposits()?))
    }

    /// Deposits minus approved withdrawals.
    pub fn total_funds(&self) -> Result<Decimal, StoreError> {
        let collections = self.collections();
        Ok(aggregate::total_funds(
            &collections.deposits()?,
            &collections.withdrawals()?,
        ))
    }

    /// Number of withdrawals awaiting a decision.
    pub fn pending_withdrawal_count(&self) -> Result<usize, StoreError> {
        Ok(aggregate::pending_withdrawal_count(&self.withdrawals()?))
    }

    /// Number of members with `active` status.
    pub fn active_member_count(&self) -> Result<usize, StoreError> {
        Ok(aggregate::active_member_count(&self.members()?))
    }

    /// Number of member records.
    pub fn total_members(&self) -> Result<usize, StoreError> {
        Ok(self.members()?.len())
    }

    /// The advisory withdrawal limit from settings.
    pub fn withdrawal_limit(&self) -> Result<Decimal, StoreError> {
        Ok(self.collections().settings()?.withdrawal_limit)
    }

    /// Everything the dashboard header shows, from one consistent read.
    pub fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let collections = self.collections();
        let members = collections.members()?;
        let deposits = collections.deposits()?;
        let withdrawals = collections.withdrawals()?;
        let total_funds = aggregate::total_funds(&deposits, &withdrawals);

        Ok(DashboardStats {
            total_deposits: aggregate::total_deposits(&deposits),
            total_funds,
            available_balance: total_funds,
            withdrawal_limit: collections.settings()?.withdrawal_limit,
            total_members: members.len(),
            active_members: aggregate::active_member_count(&members),
            pending_withdrawals: aggregate::pending_withdrawal_count(&withdrawals),
        })
    }

    /// One member's deposits and withdrawals, newest first.
    ///
    /// Works for deleted members too: their records are still returned.
    pub fn member_transaction_history(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<TransactionEntry>, StoreError> {
        let collections = self.collections();
        Ok(aggregate::member_history(
            member_id,
            &collections.deposits()?,
            &collections.withdrawals()?,
        ))
    }

    /// The `limit` newest deposits and approved withdrawals.
    pub fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionEntry>, StoreError> {
        let collections = self.collections();
        Ok(aggregate::recent_transactions(
            &collections.deposits()?,
            &collections.withdrawals()?,
            limit,
        ))
    }

    /// Members whose name, email, or phone contains `query`.
    pub fn search_members(&self, query: &str) -> Result<Vec<Member>, StoreError> {
        let members = self.members()?;
        Ok(aggregate::search_members(&members, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Deposits whose member name or depositor info contains `query`.
    pub fn search_deposits(&self, query: &str) -> Result<Vec<Deposit>, StoreError> {
        let deposits = self.deposits()?;
        Ok(aggregate::search_deposits(&deposits, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Withdrawals whose member name contains `query`.
    pub fn search_withdrawals(&self, query: &str) -> Result<Vec<Withdrawal>, StoreError> {
        let withdrawals = self.withdrawals()?;
        Ok(aggregate::search_withdrawals(&withdrawals, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Withdrawals in the given state.
    pub fn withdrawals_by_status(
        &self,
        status: WithdrawalStatus,
    ) -> Result<Vec<Withdrawal>, StoreError> {
        Ok(self
            .withdrawals()?
            .into_iter()
            .filter(|w| w.status == status)
            .collect())
    }

    /// Whether the member's current balance covers the withdrawal.
    ///
    /// A display hint only; approval re-checks under the engine's lock.
    /// `None` when the withdrawal does not exist, `Some(false)` for orphans.
    pub fn can_cover(&self, withdrawal_id: WithdrawalId) -> Result<Option<bool>, StoreError> {
        let collections = self.collections();
        let Some(withdrawal) = collections
            .withdrawals()?
            .into_iter()
            .find(|w| w.id == withdrawal_id)
        else {
            return Ok(None);
        };
        Ok(Some(aggregate::can_cover(&collections.members()?, &withdrawal)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerEngine;
    use crate::ledger::types::{MemberStatus, NewMember, Settings};
    use crate::query::types::TransactionKind;
    use crate::store::MemoryStore;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Fixture {
        engine: LedgerEngine<Arc<MemoryStore>>,
        query: QueryService<Arc<MemoryStore>>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            engine: LedgerEngine::new(Arc::clone(&store)),
            query: QueryService::new(store),
        }
    }

    fn add(engine: &LedgerEngine<Arc<MemoryStore>>, name: &str, status: MemberStatus) -> MemberId {
        engine
            .add_member(NewMember {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: "9800000000".to_string(),
                status,
                profile_picture: None,
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_empty_store() {
        let f = fixture();
        assert_eq!(f.query.total_deposits().unwrap(), Decimal::ZERO);
        assert_eq!(f.query.total_funds().unwrap(), Decimal::ZERO);
        assert!(f.query.recent_transactions(5).unwrap().is_empty());
        assert_eq!(f.query.withdrawal_limit().unwrap(), dec!(10000));
    }

    #[test]
    fn test_dashboard_stats_after_walkthrough() {
        let f = fixture();
        let ram = add(&f.engine, "Ram", MemberStatus::Active);
        add(&f.engine, "Sita", MemberStatus::Inactive);

        f.engine.record_deposit(ram, dec!(1000), "cash").unwrap();
        let w = f.engine.request_withdrawal(ram, dec!(400), None).unwrap();
        f.engine.approve_withdrawal(w.id).unwrap();
        f.engine.request_withdrawal(ram, dec!(700), None).unwrap();
        f.engine
            .save_settings(&Settings {
                withdrawal_limit: dec!(2500),
            })
            .unwrap();

        let stats = f.query.dashboard_stats().unwrap();
        assert_eq!(stats.total_deposits, dec!(1000));
        assert_eq!(stats.total_funds, dec!(600));
        assert_eq!(stats.available_balance, dec!(600));
        assert_eq!(stats.withdrawal_limit, dec!(2500));
        assert_eq!(stats.total_members, 2);
        assert_eq!(stats.active_members, 1);
        assert_eq!(stats.pending_withdrawals, 1);

        let recent = f.query.recent_transactions(DEFAULT_RECENT_LIMIT).unwrap();
        let amounts: Vec<Decimal> = recent.iter().map(|e| e.amount).collect();
        assert!(amounts.contains(&dec!(-400)));
        assert!(amounts.contains(&dec!(1000)));
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn test_history_survives_member_deletion() {
        let f = fixture();
        let ram = add(&f.engine, "Ram", MemberStatus::Active);
        f.engine.record_deposit(ram, dec!(50), "").unwrap();
        f.engine.request_withdrawal(ram, dec!(20), None).unwrap();
        f.engine.delete_member(ram).unwrap();

        assert_eq!(f.query.member_display_name(ram).unwrap(), "Unknown member");
        let history = f.query.member_transaction_history(ram).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|e| e.member_name == "Ram"));
        assert!(history.iter().any(|e| e.kind == TransactionKind::Deposit));
    }

    #[test]
    fn test_can_cover() {
        let f = fixture();
        let ram = add(&f.engine, "Ram", MemberStatus::Active);
        f.engine.record_deposit(ram, dec!(300), "").unwrap();
        let small = f.engine.request_withdrawal(ram, dec!(300), None).unwrap();
        let big = f.engine.request_withdrawal(ram, dec!(500), None).unwrap();

        assert_eq!(f.query.can_cover(small.id).unwrap(), Some(true));
        assert_eq!(f.query.can_cover(big.id).unwrap(), Some(false));
        assert_eq!(f.query.can_cover(WithdrawalId::new()).unwrap(), None);

        f.engine.delete_member(ram).unwrap();
        assert_eq!(f.query.can_cover(small.id).unwrap(), Some(false));
    }

    #[test]
    fn test_search_and_status_filters() {
        let f = fixture();
        let ram = add(&f.engine, "Ram", MemberStatus::Active);
        let sita = add(&f.engine, "Sita", MemberStatus::Active);
        f.engine.record_deposit(ram, dec!(100), "from uncle").unwrap();
        f.engine.record_deposit(sita, dec!(100), "salary").unwrap();
        let w = f.engine.request_withdrawal(sita, dec!(50), None).unwrap();
        f.engine.deny_withdrawal(w.id).unwrap();
        f.engine.request_withdrawal(ram, dec!(10), None).unwrap();

        assert_eq!(f.query.search_members("SITA@").unwrap().len(), 1);
        assert_eq!(f.query.search_members("98000").unwrap().len(), 2);
        assert_eq!(f.query.search_deposits("uncle").unwrap()[0].member_id, ram);
        assert_eq!(f.query.search_withdrawals("ram").unwrap().len(), 1);
        assert_eq!(
            f.query
                .withdrawals_by_status(WithdrawalStatus::Denied)
                .unwrap()
                .len(),
            1
        );
        assert_eq!(f.query.pending_withdrawal_count().unwrap(), 1);
        assert_eq!(f.query.active_member_count().unwrap(), 2);
        assert_eq!(f.query.total_members().unwrap(), 2);
        assert_eq!(f.query.member(sita).unwrap().unwrap().name, "Sita");
    }
}
