//! Domain layer types and invariants.

pub mod access;
pub mod entities;
pub mod error;
pub mod notices;
pub mod stock;
pub mod types;
pub mod validation;
