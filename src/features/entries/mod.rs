//! # Feature: Reminder Entries
//!
//! Data model of stored reminders and the store boundary they live behind.
//! The store hands the engine an owned snapshot of the full entry set and
//! replaces it wholesale at the end of a run; there are no per-row updates.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::error::StoreError;

pub mod csv_store;

pub use csv_store::CsvEntryStore;

/// The user-facing content of a reminder.
///
/// Two payloads describe the same logical reminder iff all three fields
/// are equal; there is no identity or primary key in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    /// Free-text reminder message
    pub message: String,
    /// Contact phone number, may be empty
    pub phone_number: String,
    /// Recipient address used for grouping and delivery
    pub recipient: String,
}

/// One stored reminder record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEntry {
    pub payload: ReminderPayload,
    /// When the entry was recorded; informational only, never used in logic
    pub created_at: DateTime<Tz>,
    /// When the reminder becomes eligible for dispatch
    pub due_at: DateTime<Tz>,
    /// Set exactly once, when dispatch succeeds; `None` means unprocessed
    pub processed_at: Option<DateTime<Tz>>,
}

impl ReminderEntry {
    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    /// Unprocessed and past its due time as of `now`
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.processed_at.is_none() && self.due_at <= now
    }
}

/// Durable collection of reminder entries.
///
/// `replace_all` must be a single atomic full replacement: a crash mid-run
/// leaves the previously stored set intact. Concurrent writers are the
/// store's concern, not the engine's.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn get_entries(&self) -> Result<Vec<ReminderEntry>, StoreError>;

    async fn replace_all(&self, entries: &[ReminderEntry]) -> Result<(), StoreError>;
}
