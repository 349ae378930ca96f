//! # Domain Module
//!
//! Business logic of the chore tracker, independent of HTTP and of the
//! storage backend.
//!
//! ## Module Organization
//!
//! - **models**: children, chore templates and assignments, daily records, family members
//! - **calendar**: clock abstraction and day normalization
//! - **payout**: pure payout arithmetic for an approved record
//! - **rollover_service**: builds the chore list of a new day's record
//! - **daily_record_service**: record lifecycle and approval with payout
//! - **chore_service**: chore templates and per-child assignments
//! - **child_service**: children and manual balance adjustments
//! - **family_service**: family membership
//! - **permissions**: role-based authorization
//!
//! ## Business Rules
//!
//! - A child has at most one record per day
//! - A submitted record is read-only for the child
//! - Only submitted records can be approved or rejected, and only once
//! - Net payout is never negative
//! - Balances change only through an atomic increment

pub mod calendar;
pub mod child_service;
pub mod chore_service;
pub mod commands;
pub mod daily_record_service;
pub mod errors;
pub mod family_service;
pub mod models;
pub mod payout;
pub mod permissions;
pub mod rollover_service;

pub use calendar::{Clock, DayBoundary, FixedClock, SystemClock};
pub use child_service::ChildService;
pub use chore_service::ChoreService;
pub use daily_record_service::DailyRecordService;
pub use errors::{DomainError, DomainResult};
pub use family_service::FamilyService;
pub use permissions::{PermissionChecker, RolePermissionChecker};
pub use rollover_service::RolloverService;
