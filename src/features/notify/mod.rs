//! # Feature: Notification Dispatch
//!
//! The notifier boundary and its email implementation. Eligible payloads
//! are grouped per recipient address so each recipient gets one
//! consolidated message per run; a group that fails to send is simply
//! absent from the returned subset and stays eligible for the next run.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::error::DispatchError;
use crate::features::entries::ReminderPayload;

pub mod email;
pub mod mail_client;
pub mod whatsapp;

pub use email::EmailNotifier;
pub use mail_client::{MailClient, MailRequest, MailResponse, MailTransport};

/// Delivery boundary for a batch of reminder payloads.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt delivery of the batch and return the successfully delivered
    /// subset, by value. Partial failures are not errors; `Err` means the
    /// whole call failed and nothing was delivered.
    async fn dispatch(
        &self,
        payloads: &[ReminderPayload],
    ) -> Result<Vec<ReminderPayload>, DispatchError>;

    /// Health check used by callers before scheduling runs; the engine
    /// itself never probes.
    async fn probe(&self) -> Result<(), DispatchError>;
}

/// Group payloads by recipient address (exact string match).
///
/// All payloads of one recipient end up in one group, in input order;
/// iteration order over groups is unspecified.
pub fn group_by_recipient(
    payloads: &[ReminderPayload],
) -> HashMap<String, Vec<ReminderPayload>> {
    let mut groups: HashMap<String, Vec<ReminderPayload>> = HashMap::new();
    for payload in payloads {
        groups
            .entry(payload.recipient.clone())
            .or_default()
            .push(payload.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(message: &str, recipient: &str) -> ReminderPayload {
        ReminderPayload {
            message: message.to_string(),
            phone_number: String::new(),
            recipient: recipient.to_string(),
        }
    }

    #[test]
    fn test_group_by_recipient() {
        let payloads = vec![
            payload("one", "a"),
            payload("two", "b"),
            payload("three", "b"),
        ];

        let groups = group_by_recipient(&payloads);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["a"].len(), 1);
        assert_eq!(groups["b"].len(), 2);
    }

    #[test]
    fn test_group_preserves_input_order_within_group() {
        let payloads = vec![
            payload("first", "b"),
            payload("skip", "a"),
            payload("second", "b"),
        ];

        let groups = group_by_recipient(&payloads);
        let messages: Vec<&str> = groups["b"].iter().map(|p| p.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_group_key_is_exact_string_match() {
        let payloads = vec![payload("x", "A@mail.com"), payload("y", "a@mail.com")];
        let groups = group_by_recipient(&payloads);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_by_recipient(&[]).is_empty());
    }
}
