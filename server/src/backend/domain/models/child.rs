//! Domain model representing a child's ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A child tracked for chores, with a running cash balance.
///
/// `current_balance` is only ever changed through the storage layer's atomic
/// increment, never by writing back a value read earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildLedger {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub current_balance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChildLedger {
    pub fn generate_id() -> String {
        format!("child::{}", Uuid::new_v4())
    }
}
