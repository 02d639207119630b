//! The ledger engine: every balance mutation goes through here.
//!
//! Each mutating operation holds the engine's write lock for its whole
//! read-modify-write, so two approvals against the same member can never
//! both pass the sufficiency check. Validation happens before the first
//! write; a failed operation leaves the store untouched. Operations that
//! write more than one collection go through [`LedgerEngine::write_together`],
//! which puts back the earlier writes if a later one fails.

use chrono::Utc;
use fundbook_shared::ReversalPolicy;
use fundbook_shared::types::{DepositId, MemberId, WithdrawalId};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::ledger::balance::{self, BalanceDrift};
use crate::ledger::error::LedgerError;
use crate::ledger::types::{
    Deposit, Member, MemberUpdate, NewMember, Settings, Withdrawal, WithdrawalStatus,
};
use crate::ledger::workflow::WithdrawalWorkflow;
use crate::store::{CollectionKey, Collections, Store, StoreError};

/// Outcome of deleting a deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReversal {
    /// The removed deposit.
    pub deposit: Deposit,
    /// The member's balance after reversal; `None` if the member no longer exists.
    pub balance_after: Option<Decimal>,
    /// True when the reversal left the member with a negative balance.
    pub overdrawn: bool,
}

/// Applies and reverses deposits and withdrawals against a [`Store`].
pub struct LedgerEngine<S> {
    store: S,
    reversal_policy: ReversalPolicy,
    write_lock: Mutex<()>,
}

impl<S: Store> LedgerEngine<S> {
    /// Creates an engine with the default reversal policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            reversal_policy: ReversalPolicy::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Sets what happens when a deposit deletion would overdraw a member.
    #[must_use]
    pub fn with_reversal_policy(mut self, policy: ReversalPolicy) -> Self {
        self.reversal_policy = policy;
        self
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn collections(&self) -> Collections<'_, S> {
        Collections::new(&self.store)
    }

    /// Runs `write` against the collections named in `keys` as one unit.
    ///
    /// The raw text under each key is captured first. If `write` fails, every
    /// key is put back to that text (or removed if it was absent) before the
    /// error is returned. Callers must hold the write lock.
    fn write_together<F>(&self, keys: &[CollectionKey], write: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&Collections<'_, S>) -> Result<(), StoreError>,
    {
        let saved = keys
            .iter()
            .map(|&key| Ok((key, self.store.get(key)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;

        let Err(err) = write(&self.collections()) else {
            return Ok(());
        };

        warn!(key = %err.key(), error = %err, "Write failed; restoring collections");
        for (key, text) in &saved {
            let restored = match text {
                Some(text) => self.store.set(*key, text),
                None => self.store.remove(*key),
            };
            if let Err(restore_err) = restored {
                error!(key = %key, error = %restore_err, "Failed to restore collection");
            }
        }
        Err(err.into())
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Creates a member with a zero balance.
    pub fn add_member(&self, input: NewMember) -> Result<Member, LedgerError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidMember("name is required".to_string()));
        }

        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut members = collections.members()?;

        let member = Member {
            id: MemberId::new(),
            name: name.to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            status: input.status,
            balance: Decimal::ZERO,
            joined_date: Utc::now(),
            profile_picture: input.profile_picture,
        };
        members.push(member.clone());
        collections.save_members(&members)?;

        info!(member_id = %member.id, name = %member.name, "Member added");
        Ok(member)
    }

    /// Edits a member's profile fields. The balance is never touched.
    pub fn update_member(
        &self,
        member_id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, LedgerError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(LedgerError::InvalidMember("name is required".to_string()));
        }

        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut members = collections.members()?;
        let member = members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or(LedgerError::UnknownMember(member_id))?;

        update.apply_to(member);
        let updated = member.clone();
        collections.save_members(&members)?;

        info!(member_id = %member_id, "Member updated");
        Ok(updated)
    }

    /// Removes a member record.
    ///
    /// Their deposits and withdrawals stay behind as orphans that still
    /// carry the member's name snapshot.
    pub fn delete_member(&self, member_id: MemberId) -> Result<Member, LedgerError> {
        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut members = collections.members()?;
        let index = members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or(LedgerError::UnknownMember(member_id))?;

        let removed = members.remove(index);
        collections.save_members(&members)?;

        info!(member_id = %member_id, balance = %removed.balance, "Member deleted");
        Ok(removed)
    }

    // ========================================================================
    // Deposits
    // ========================================================================

    /// Records a deposit and credits the member.
    pub fn record_deposit(
        &self,
        member_id: MemberId,
        amount: Decimal,
        depositor_info: impl Into<String>,
    ) -> Result<Deposit, LedgerError> {
        validate_amount(amount)?;

        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut members = collections.members()?;
        let member = members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or(LedgerError::UnknownMember(member_id))?;

        let now = Utc::now();
        let deposit = Deposit {
            id: DepositId::new(),
            member_id,
            member_name: member.name.clone(),
            amount,
            depositor_info: depositor_info.into(),
            date: now,
            timestamp: now.timestamp_millis(),
        };
        member.balance += amount;
        let balance = member.balance;

        let mut deposits = collections.deposits()?;
        deposits.push(deposit.clone());
        self.write_together(&[CollectionKey::Deposits, CollectionKey::Members], |c| {
            c.save_deposits(&deposits)?;
            c.save_members(&members)
        })?;

        info!(
            deposit_id = %deposit.id,
            member_id = %member_id,
            amount = %amount,
            balance = %balance,
            "Deposit recorded"
        );
        Ok(deposit)
    }

    /// Deletes a deposit and reverses its credit.
    ///
    /// If the member was deleted the reversal is skipped and the record is
    /// still removed. The reversal is not re-validated against withdrawals
    /// already approved, so under [`ReversalPolicy::Allow`] the balance can
    /// go negative; [`ReversalPolicy::Reject`] refuses instead.
    pub fn delete_deposit(&self, deposit_id: DepositId) -> Result<DepositReversal, LedgerError> {
        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut deposits = collections.deposits()?;
        let index = deposits
            .iter()
            .position(|d| d.id == deposit_id)
            .ok_or_else(|| LedgerError::deposit_not_found(deposit_id))?;

        let mut members = collections.members()?;
        let member = members.iter_mut().find(|m| m.id == deposits[index].member_id);

        let balance_after = match member {
            Some(member) => {
                let amount = deposits[index].amount;
                let after = member.balance - amount;
                if after < Decimal::ZERO && self.reversal_policy == ReversalPolicy::Reject {
                    return Err(LedgerError::ReversalWouldOverdraw {
                        member_id: member.id,
                        balance: member.balance,
                        amount,
                    });
                }
                member.balance = after;
                Some(after)
            }
            None => None,
        };

        let deposit = deposits.remove(index);
        self.write_together(&[CollectionKey::Members, CollectionKey::Deposits], |c| {
            if balance_after.is_some() {
                c.save_members(&members)?;
            }
            c.save_deposits(&deposits)
        })?;

        let overdrawn = balance_after.is_some_and(|b| b < Decimal::ZERO);
        if overdrawn {
            warn!(
                deposit_id = %deposit_id,
                member_id = %deposit.member_id,
                balance = ?balance_after,
                "Deposit reversal left member overdrawn"
            );
        } else {
            info!(
                deposit_id = %deposit_id,
                member_id = %deposit.member_id,
                amount = %deposit.amount,
                orphaned = balance_after.is_none(),
                "Deposit deleted"
            );
        }

        Ok(DepositReversal {
            deposit,
            balance_after,
            overdrawn,
        })
    }

    // ========================================================================
    // Withdrawals
    // ========================================================================

    /// Files a pending withdrawal request.
    ///
    /// Sufficiency is not checked here; approval is the gate.
    pub fn request_withdrawal(
        &self,
        member_id: MemberId,
        amount: Decimal,
        reason: Option<String>,
    ) -> Result<Withdrawal, LedgerError> {
        validate_amount(amount)?;

        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let member_name = collections
            .members()?
            .into_iter()
            .find(|m| m.id == member_id)
            .map(|m| m.name)
            .ok_or(LedgerError::UnknownMember(member_id))?;

        let withdrawal = Withdrawal {
            id: WithdrawalId::new(),
            member_id,
            member_name,
            amount,
            status: WithdrawalStatus::Pending,
            request_date: Utc::now(),
            processed_date: None,
            reason: reason.filter(|r| !r.trim().is_empty()),
        };

        let mut withdrawals = collections.withdrawals()?;
        withdrawals.push(withdrawal.clone());
        collections.save_withdrawals(&withdrawals)?;

        info!(
            withdrawal_id = %withdrawal.id,
            member_id = %member_id,
            amount = %amount,
            "Withdrawal requested"
        );
        Ok(withdrawal)
    }

    /// Approves a pending withdrawal and debits the member.
    ///
    /// Fails with `InsufficientBalance` when the member's balance does not
    /// cover the amount; the withdrawal then stays pending.
    pub fn approve_withdrawal(
        &self,
        withdrawal_id: WithdrawalId,
    ) -> Result<Withdrawal, LedgerError> {
        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut withdrawals = collections.withdrawals()?;
        let withdrawal = withdrawals
            .iter_mut()
            .find(|w| w.id == withdrawal_id)
            .ok_or_else(|| LedgerError::withdrawal_not_found(withdrawal_id))?;

        let action = WithdrawalWorkflow::approve(withdrawal.status)?;

        let mut members = collections.members()?;
        let member = members
            .iter_mut()
            .find(|m| m.id == withdrawal.member_id)
            .ok_or(LedgerError::UnknownMember(withdrawal.member_id))?;

        if member.balance < withdrawal.amount {
            return Err(LedgerError::InsufficientBalance {
                member_id: member.id,
                balance: member.balance,
                requested: withdrawal.amount,
            });
        }

        member.balance -= withdrawal.amount;
        let balance = member.balance;
        withdrawal.status = action.new_status();
        withdrawal.processed_date = Some(action.processed_at());
        let approved = withdrawal.clone();

        self.write_together(&[CollectionKey::Withdrawals, CollectionKey::Members], |c| {
            c.save_withdrawals(&withdrawals)?;
            c.save_members(&members)
        })?;

        info!(
            withdrawal_id = %withdrawal_id,
            member_id = %approved.member_id,
            amount = %approved.amount,
            balance = %balance,
            "Withdrawal approved"
        );
        Ok(approved)
    }

    /// Denies a pending withdrawal. Denying an already-denied one is a no-op.
    ///
    /// An approved withdrawal cannot be denied: its deduction has already
    /// been applied, so this returns `InvalidTransition`.
    pub fn deny_withdrawal(&self, withdrawal_id: WithdrawalId) -> Result<Withdrawal, LedgerError> {
        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut withdrawals = collections.withdrawals()?;
        let withdrawal = withdrawals
            .iter_mut()
            .find(|w| w.id == withdrawal_id)
            .ok_or_else(|| LedgerError::withdrawal_not_found(withdrawal_id))?;

        let Some(action) = WithdrawalWorkflow::deny(withdrawal.status)? else {
            return Ok(withdrawal.clone());
        };

        withdrawal.status = action.new_status();
        withdrawal.processed_date = Some(action.processed_at());
        let denied = withdrawal.clone();
        collections.save_withdrawals(&withdrawals)?;

        info!(withdrawal_id = %withdrawal_id, member_id = %denied.member_id, "Withdrawal denied");
        Ok(denied)
    }

    /// Removes a withdrawal record in any state.
    ///
    /// No reversal is performed: deleting an approved withdrawal leaves its
    /// deduction on the member's balance. [`LedgerEngine::reconcile`] will
    /// report that member afterwards.
    pub fn delete_withdrawal(&self, withdrawal_id: WithdrawalId) -> Result<Withdrawal, LedgerError> {
        let _guard = self.write_lock.lock();
        let collections = self.collections();
        let mut withdrawals = collections.withdrawals()?;
        let index = withdrawals
            .iter()
            .position(|w| w.id == withdrawal_id)
            .ok_or_else(|| LedgerError::withdrawal_not_found(withdrawal_id))?;

        let removed = withdrawals.remove(index);
        collections.save_withdrawals(&withdrawals)?;

        if removed.status == WithdrawalStatus::Approved {
            warn!(
                withdrawal_id = %withdrawal_id,
                member_id = %removed.member_id,
                amount = %removed.amount,
                "Deleted an approved withdrawal; its deduction stays on the balance"
            );
        } else {
            info!(withdrawal_id = %withdrawal_id, status = %removed.status, "Withdrawal deleted");
        }
        Ok(removed)
    }

    // ========================================================================
    // Settings and consistency
    // ========================================================================

    /// Returns the stored settings.
    pub fn settings(&self) -> Result<Settings, LedgerError> {
        Ok(self.collections().settings()?)
    }

    /// Replaces the stored settings.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), LedgerError> {
        if settings.withdrawal_limit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        let _guard = self.write_lock.lock();
        self.collections().save_settings(settings)?;
        info!(withdrawal_limit = %settings.withdrawal_limit, "Settings saved");
        Ok(())
    }

    /// Lists members whose stored balance disagrees with their records.
    pub fn reconcile(&self) -> Result<Vec<BalanceDrift>, LedgerError> {
        let _guard = self.write_lock.lock();
        let collections = self.collections();
        Ok(balance::reconcile(
            &collections.members()?,
            &collections.deposits()?,
            &collections.withdrawals()?,
        ))
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_zero() {
        Err(LedgerError::ZeroAmount)
    } else if amount.is_sign_negative() {
        Err(LedgerError::NegativeAmount)
    } else {
        Ok(())
    }
}
