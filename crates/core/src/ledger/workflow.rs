//! Withdrawal approval state machine.
//!
//! Valid transitions:
//! - Pending → Approved (approve)
//! - Pending → Denied (deny)
//! - Denied → Denied (deny again, a no-op)
//!
//! Everything else is an `InvalidTransition`. In particular a denied
//! withdrawal can never be approved later, and an approved one cannot be
//! denied, because its deduction has already been applied.

use chrono::{DateTime, Utc};

use crate::ledger::error::LedgerError;
use crate::ledger::types::WithdrawalStatus;

/// A validated status change for a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    /// Approve a pending withdrawal.
    Approve {
        /// The new status (Approved).
        new_status: WithdrawalStatus,
        /// When the decision was made.
        processed_at: DateTime<Utc>,
    },
    /// Deny a pending withdrawal.
    Deny {
        /// The new status (Denied).
        new_status: WithdrawalStatus,
        /// When the decision was made.
        processed_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> WithdrawalStatus {
        match self {
            Self::Approve { new_status, .. } | Self::Deny { new_status, .. } => *new_status,
        }
    }

    /// Returns the processed timestamp to stamp on the record.
    #[must_use]
    pub fn processed_at(&self) -> DateTime<Utc> {
        match self {
            Self::Approve { processed_at, .. } | Self::Deny { processed_at, .. } => *processed_at,
        }
    }
}

/// Stateless service validating withdrawal transitions.
pub struct WithdrawalWorkflow;

impl WithdrawalWorkflow {
    /// Approve a pending withdrawal.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Approve)` if the withdrawal is pending
    /// * `Err(LedgerError::InvalidTransition)` otherwise
    pub fn approve(current_status: WithdrawalStatus) -> Result<WorkflowAction, LedgerError> {
        let to = WithdrawalStatus::Approved;
        if !Self::is_valid_transition(current_status, to) {
            return Err(LedgerError::InvalidTransition {
                from: current_status,
                to,
            });
        }
        Ok(WorkflowAction::Approve {
            new_status: to,
            processed_at: Utc::now(),
        })
    }

    /// Deny a withdrawal.
    ///
    /// # Returns
    /// * `Ok(Some(WorkflowAction::Deny))` if the withdrawal is pending
    /// * `Ok(None)` if it is already denied; nothing should change
    /// * `Err(LedgerError::InvalidTransition)` if it is approved
    pub fn deny(current_status: WithdrawalStatus) -> Result<Option<WorkflowAction>, LedgerError> {
        let to = WithdrawalStatus::Denied;
        if !Self::is_valid_transition(current_status, to) {
            return Err(LedgerError::InvalidTransition {
                from: current_status,
                to,
            });
        }
        if current_status == to {
            return Ok(None);
        }
        Ok(Some(WorkflowAction::Deny {
            new_status: to,
            processed_at: Utc::now(),
        }))
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: WithdrawalStatus, to: WithdrawalStatus) -> bool {
        matches!(
            (from, to),
            (
                WithdrawalStatus::Pending,
                WithdrawalStatus::Approved | WithdrawalStatus::Denied
            ) | (WithdrawalStatus::Denied, WithdrawalStatus::Denied)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_approve_from_pending() {
        let action = WithdrawalWorkflow::approve(WithdrawalStatus::Pending).unwrap();
        assert_eq!(action.new_status(), WithdrawalStatus::Approved);
        assert!(action.processed_at() <= Utc::now());
    }

    #[rstest]
    #[case(WithdrawalStatus::Approved)]
    #[case(WithdrawalStatus::Denied)]
    fn test_approve_from_terminal_fails(#[case] status: WithdrawalStatus) {
        let result = WithdrawalWorkflow::approve(status);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidTransition { from, to: WithdrawalStatus::Approved }) if from == status
        ));
    }

    #[test]
    fn test_deny_from_pending() {
        let action = WithdrawalWorkflow::deny(WithdrawalStatus::Pending)
            .unwrap()
            .unwrap();
        assert_eq!(action.new_status(), WithdrawalStatus::Denied);
    }

    #[test]
    fn test_deny_twice_is_noop() {
        assert!(WithdrawalWorkflow::deny(WithdrawalStatus::Denied)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_deny_approved_fails() {
        assert!(matches!(
            WithdrawalWorkflow::deny(WithdrawalStatus::Approved),
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[rstest]
    #[case(WithdrawalStatus::Pending, WithdrawalStatus::Approved, true)]
    #[case(WithdrawalStatus::Pending, WithdrawalStatus::Denied, true)]
    #[case(WithdrawalStatus::Denied, WithdrawalStatus::Denied, true)]
    #[case(WithdrawalStatus::Pending, WithdrawalStatus::Pending, false)]
    #[case(WithdrawalStatus::Denied, WithdrawalStatus::Approved, false)]
    #[case(WithdrawalStatus::Approved, WithdrawalStatus::Approved, false)]
    #[case(WithdrawalStatus::Approved, WithdrawalStatus::Denied, false)]
    #[case(WithdrawalStatus::Approved, WithdrawalStatus::Pending, false)]
    fn test_transition_table(
        #[case] from: WithdrawalStatus,
        #[case] to: WithdrawalStatus,
        #[case] valid: bool,
    ) {
        assert_eq!(WithdrawalWorkflow::is_valid_transition(from, to), valid);
    }

    #[rstest]
    #[case(WithdrawalStatus::Pending)]
    #[case(WithdrawalStatus::Approved)]
    #[case(WithdrawalStatus::Denied)]
    fn test_service_agrees_with_table(#[case] from: WithdrawalStatus) {
        assert_eq!(
            WithdrawalWorkflow::approve(from).is_ok(),
            WithdrawalWorkflow::is_valid_transition(from, WithdrawalStatus::Approved)
        );
        assert_eq!(
            WithdrawalWorkflow::deny(from).is_ok(),
            WithdrawalWorkflow::is_valid_transition(from, WithdrawalStatus::Denied)
        );
    }
}
