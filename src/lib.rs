//! Inventory, event scheduling and notification backend for a tent rental business.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
