// Core layer - configuration and error taxonomy
pub mod core;

// Features layer - all feature modules
pub mod features;

// Application layer - wiring of store, notifier and engine
pub mod app;

// Re-export core config for convenience
pub use core::Config;

// Re-export feature items for convenience
pub use features::{
    // Entries
    CsvEntryStore, EntryStore, ReminderEntry, ReminderPayload,
    // Lifecycle
    Clock, LifecycleEngine, RunReport, Shutdown, SystemClock,
    // Notify
    EmailNotifier, MailClient, MailRequest, Notifier,
};
