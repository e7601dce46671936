//! Retention filtering of processed entries.

use chrono::{DateTime, Duration, Utc};

use crate::features::entries::ReminderEntry;

/// Keep every unprocessed entry, and every processed entry whose age is
/// still within the retention window; drop the rest.
///
/// An entry aged exactly the window survives. Must run after dispatch
/// marking so freshly stamped entries are judged by their new timestamp.
pub fn apply_retention(
    entries: Vec<ReminderEntry>,
    now: DateTime<Utc>,
    retention: Duration,
) -> Vec<ReminderEntry> {
    entries
        .into_iter()
        .filter(|entry| match entry.processed_at {
            None => true,
            Some(processed_at) => now.signed_duration_since(processed_at) <= retention,
        })
        .collect()
}
