//! Read-only views over the stored collections.
//!
//! This module provides:
//! - Fund totals and dashboard figures
//! - Per-member transaction history and the recent-activity feed
//! - Search filters over members, deposits, and withdrawals

pub mod aggregate;
pub mod service;
pub mod types;

pub use aggregate::UNKNOWN_MEMBER;
pub use service::{DEFAULT_RECENT_LIMIT, QueryService};
pub use types::{DashboardStats, TransactionEntry, TransactionKind};
