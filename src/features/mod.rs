//! # Features
//!
//! Feature modules of the reminder service. Each feature owns its domain
//! types and collaborator traits; the lifecycle engine ties them together.

pub mod entries;
pub mod lifecycle;
pub mod notify;

pub use entries::{CsvEntryStore, EntryStore, ReminderEntry, ReminderPayload};
pub use lifecycle::{Clock, LifecycleEngine, RunReport, Shutdown, SystemClock};
pub use notify::{group_by_recipient, EmailNotifier, MailClient, MailRequest, Notifier};
