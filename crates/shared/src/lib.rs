//! Shared types and configuration for Fundbook.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for members, deposits, and withdrawals
//! - Currency display and amount parsing
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, ReversalPolicy};
