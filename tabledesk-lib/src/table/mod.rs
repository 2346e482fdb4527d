//! Table controller and row editors.
//!
//! A [`TableController`] owns the cached rows of one table. Each cached row
//! gets a [`RowEditor`] that runs its edit/delete lifecycle against the
//! gateway and reports confirmed changes back to the controller's cache.
//! Remote failures never escape as errors: they are logged, written to the
//! [`Notifier`](crate::notify::Notifier), and the row returns to the state it
//! was in before the attempt.

mod cache;
mod config;
mod confirm;
mod controller;
mod editor;
mod render;

pub use cache::*;
pub use config::*;
pub use confirm::*;
pub use controller::*;
pub use editor::*;
pub use render::*;
