//! Day normalization for daily records.
//!
//! A daily record belongs to one calendar day. Every timestamp that has to be
//! turned into a day goes through a [`DayBoundary`], which cuts days at
//! midnight of a fixed UTC offset taken from configuration. Internally days
//! are plain `NaiveDate`s and never carry a time of day.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::domain::errors::{DomainError, DomainResult};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Where one day ends and the next begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    offset: FixedOffset,
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::utc()
    }
}

impl DayBoundary {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Build a boundary from minutes east of UTC (e.g. -300 for UTC-5)
    pub fn from_offset_minutes(minutes: i32) -> anyhow::Result<Self> {
        if minutes.abs() >= 24 * 60 {
            return Err(anyhow::anyhow!(
                "Day boundary offset must be within one day, got {} minutes",
                minutes
            ));
        }
        let offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| anyhow::anyhow!("Invalid day boundary offset: {} minutes", minutes))?;
        Ok(Self { offset })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// The calendar day an instant falls on
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        self.day_of(clock.now())
    }

    /// Parse an ISO-8601 input into a day.
    ///
    /// Accepts a bare `YYYY-MM-DD` date, or an RFC 3339 timestamp which is
    /// moved into this boundary's offset before its date is taken.
    pub fn parse_day(&self, input: &str) -> DomainResult<NaiveDate> {
        let trimmed = input.trim();
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, DAY_FORMAT) {
            return Ok(day);
        }
        match DateTime::parse_from_rfc3339(trimmed) {
            Ok(instant) => Ok(self.day_of(instant.with_timezone(&Utc))),
            Err(_) => Err(DomainError::validation(format!(
                "'{}' is not an ISO-8601 date or timestamp",
                input
            ))),
        }
    }

    pub fn parse_optional_day(&self, input: Option<&str>, clock: &dyn Clock) -> DomainResult<NaiveDate> {
        match input {
            Some(value) => self.parse_day(value),
            None => Ok(self.today(clock)),
        }
    }
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a day written by [`format_day`]
pub fn parse_stored_day(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid stored day '{}': {}", value, e))
}

pub fn add_days(day: NaiveDate, days: u64) -> DomainResult<NaiveDate> {
    day.checked_add_days(Days::new(days)).ok_or_else(|| {
        DomainError::validation(format!("Cannot move {} forward by {} days", day, days))
    })
}
