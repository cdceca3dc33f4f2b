//! Application services layered over the repository traits.

pub mod admin;
pub mod auth;
pub mod clients;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod fanout;
pub mod inventory;
pub mod notifications;
pub mod profile;
pub mod push;
pub mod repos;
pub mod sketches;
pub mod suppliers;
pub mod visits;

#[cfg(test)]
pub(crate) mod testing;
