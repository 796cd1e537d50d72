//! Upasthiti Core — domain models, geofencing math, repository traits
//! and the shared error type.

pub mod error;
pub mod geo;
pub mod models;
pub mod repository;

pub use error::{UpasthitiError, UpasthitiResult};
