//! Upasthiti Database — JSON-file record stores and repository
//! implementations.
//!
//! This crate provides:
//! - A single-writer JSON collection ([`JsonStore`])
//! - Store lifecycle ([`DbManager`], [`DbConfig`])
//! - Repository implementations for the `upasthiti-core` traits
//! - Error types ([`DbError`])

mod error;
mod manager;
pub mod repository;
mod store;

pub use error::DbError;
pub use manager::{DbConfig, DbManager};
pub use store::JsonStore;
