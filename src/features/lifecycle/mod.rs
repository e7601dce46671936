//! # Feature: Reminder Lifecycle
//!
//! The reconciliation core. One run reads the full entry set, classifies
//! every entry against the injected clock, dispatches the due-and-unprocessed
//! subset, stamps confirmed deliveries, prunes processed entries past the
//! retention window and writes the surviving set back in due-time order.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod engine;
pub mod retention;

pub use engine::{Clock, LifecycleEngine, RunReport, Shutdown, SystemClock};
pub use retention::apply_retention;
