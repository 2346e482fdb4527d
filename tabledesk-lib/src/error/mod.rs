//! Error types

mod config;
mod field;
mod gateway;
mod table;

pub use config::*;
pub use field::*;
pub use gateway::*;
pub use table::*;

