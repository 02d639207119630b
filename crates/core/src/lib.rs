//! Core business logic for Fundbook.
//!
//! This crate contains the ledger rules with ZERO filesystem or UI dependencies.
//! All domain types, validation rules, and balance calculations live here.
//!
//! # Modules
//!
//! - `store` - Keyed text storage and typed collection access
//! - `ledger` - Balance-consistency engine and withdrawal workflow
//! - `query` - Read-only totals, histories, and search
//! - `session` - Credential check and current-user marker

pub mod ledger;
pub mod query;
pub mod session;
pub mod store;
