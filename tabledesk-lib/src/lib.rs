//! Schema-driven table editing library
//!
//! Loads the rows of one remote table, renders them through a column
//! [`schema`], and lets each row be edited or deleted in place. Changes are
//! written to the cache only after the store confirms them; failures are
//! reported through a shared [`notify::Notifier`].
//!
//! The remote side is a [`gateway::Gateway`]: [`gateway::RestGateway`] for a
//! PostgREST-style HTTP API, [`gateway::MemoryGateway`] for tests and demos.

pub mod display;
pub mod error;
pub mod export;
pub mod gateway;
pub mod model;
pub mod notify;
pub mod schema;
pub mod table;
