//! Domain models for Upasthiti.
//!
//! These are the core types shared across all crates.

pub mod attendance;
pub mod session;
pub mod user;
