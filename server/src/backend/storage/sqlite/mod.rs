//! # SQLite Storage Module
//!
//! SQLite-backed implementations of the storage traits, built on an sqlx pool.
//!
//! ## Components
//!
//! - **connection.rs** - pool setup, schema creation, repository factory
//! - **repositories/** - one repository per aggregate
//!
//! Days are stored as `YYYY-MM-DD` text so they sort chronologically, and
//! timestamps as RFC 3339 text. A daily record's chores and penalties are
//! stored as JSON columns next to its lifecycle columns.

pub mod connection;
pub mod repositories;

pub use connection::DbConnection;
pub use repositories::{
    AssignmentRepository, ChildRepository, ChoreRepository, DailyRecordRepository, MemberRepository,
};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| anyhow!("Invalid stored timestamp '{}': {}", value, e))
}

pub(crate) fn parse_optional_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn interval_from_column(value: Option<i64>) -> Result<Option<u32>> {
    value
        .map(|days| u32::try_from(days).map_err(|_| anyhow!("Invalid stored interval: {}", days)))
        .transpose()
}
