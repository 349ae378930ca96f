//! # Storage Module
//!
//! Handles all data persistence for the chore tracker.
//!
//! The domain layer only sees the traits in [`traits`]; the SQLite
//! implementation behind them can be swapped without touching services.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: children, chore templates, assignments, daily records
//!   and family membership
//! - **Atomic Writes**: record creation together with its schedule updates, and
//!   approval together with the balance credit
//! - **Optimistic Concurrency**: every daily record write is checked against
//!   the version that was read
//! - **Connection Management**: one shared sqlx pool per process

pub mod sqlite;
pub mod traits;

pub use sqlite::DbConnection;
pub use traits::*;
