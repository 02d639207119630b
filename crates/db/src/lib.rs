//! Durable storage for Fundbook.
//!
//! This crate provides:
//! - `FileStore`, a [`Store`](fundbook_core::store::Store) that keeps each
//!   collection as one JSON file under a data directory

pub mod file_store;

pub use file_store::FileStore;
