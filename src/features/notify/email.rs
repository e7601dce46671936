//! Email delivery of reminder batches.
//!
//! One consolidated HTML mail per recipient group. Each reminder renders
//! as a WhatsApp click-to-chat link so the recipient can jump straight
//! into the conversation.

use async_trait::async_trait;
use log::warn;
use std::sync::Arc;

use super::mail_client::{MailRequest, MailTransport};
use super::{group_by_recipient, whatsapp, Notifier};
use crate::core::error::DispatchError;
use crate::features::entries::ReminderPayload;

// Mail body fragments embedded at compile time
const MAIL_START: &str = include_str!("../../../templates/mail_start.html");
const MAIL_ITEM: &str = include_str!("../../../templates/mail_item.html");
const MAIL_END: &str = include_str!("../../../templates/mail_end.html");

const SUBJECT: &str = "WhatsApp Reminder";

/// Reminder texts longer than this are cut off in the mail body; the
/// full text still travels inside the WhatsApp link.
const MAX_PREVIEW_CHARS: usize = 61;

pub struct EmailNotifier {
    client: Arc<dyn MailTransport>,
    origin_address: String,
    origin_name: String,
}

impl EmailNotifier {
    pub fn new(
        client: Arc<dyn MailTransport>,
        origin_address: String,
        origin_name: String,
    ) -> Self {
        EmailNotifier {
            client,
            origin_address,
            origin_name,
        }
    }

    fn build_request(&self, recipient: &str, group: &[ReminderPayload]) -> MailRequest {
        let mut content = String::from(MAIL_START);
        for payload in group {
            let link = whatsapp::create_link(&payload.phone_number, &payload.message);

            let mut text = html_escape(&payload.message);
            if text.chars().count() > MAX_PREVIEW_CHARS {
                text = text.chars().take(MAX_PREVIEW_CHARS).collect();
                text.push_str("...");
            }

            let number = if payload.phone_number.is_empty() {
                "no number provided"
            } else {
                payload.phone_number.as_str()
            };

            content.push_str(
                &MAIL_ITEM
                    .replace("{{link}}", &link)
                    .replace("{{text}}", &text)
                    .replace("{{number}}", number),
            );
        }
        content.push_str(MAIL_END);

        MailRequest {
            to: recipient.to_string(),
            subject: SUBJECT.to_string(),
            html_content: content,
            from: self.origin_address.clone(),
            from_name: self.origin_name.clone(),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn dispatch(
        &self,
        payloads: &[ReminderPayload],
    ) -> Result<Vec<ReminderPayload>, DispatchError> {
        let mut delivered = Vec::new();

        for (recipient, group) in group_by_recipient(payloads) {
            let request = self.build_request(&recipient, &group);
            match self.client.send_mail(&request).await {
                Ok(_) => delivered.extend(group),
                Err(err) => {
                    warn!("could not deliver reminder batch to {recipient}: {err}");
                }
            }
        }

        Ok(delivered)
    }

    async fn probe(&self) -> Result<(), DispatchError> {
        self.client.health_check().await
    }
}

/// Escape the five characters HTML cares about in text content
fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::super::mail_client::MailResponse;
    use super::*;
    use std::sync::Mutex;

    struct MockTransport {
        sent: Mutex<Vec<MailRequest>>,
        fail_recipient: Option<String>,
    }

    impl MockTransport {
        fn new() -> Arc<Self> {
            Arc::new(MockTransport {
                sent: Mutex::new(Vec::new()),
                fail_recipient: None,
            })
        }

        fn failing_for(recipient: &str) -> Arc<Self> {
            Arc::new(MockTransport {
                sent: Mutex::new(Vec::new()),
                fail_recipient: Some(recipient.to_string()),
            })
        }

        fn sent(&self) -> Vec<MailRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for MockTransport {
        async fn send_mail(&self, request: &MailRequest) -> Result<MailResponse, DispatchError> {
            if self.fail_recipient.as_deref() == Some(request.to.as_str()) {
                return Err(DispatchError::BadResponse {
                    code: 500,
                    message: "mailbox on fire".to_string(),
                });
            }
            self.sent.lock().unwrap().push(request.clone());
            Ok(MailResponse {
                to: request.to.clone(),
                subject: request.subject.clone(),
                message: "Email sent successfully".to_string(),
            })
        }

        async fn health_check(&self) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    fn notifier(client: Arc<MockTransport>) -> EmailNotifier {
        EmailNotifier::new(client, "sender@test.com".to_string(), "Test Sender".to_string())
    }

    fn payload(message: &str, phone_number: &str, recipient: &str) -> ReminderPayload {
        ReminderPayload {
            message: message.to_string(),
            phone_number: phone_number.to_string(),
            recipient: recipient.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_one_mail_per_recipient() {
        let client = MockTransport::new();
        let payloads = vec![
            payload("Text 1", "", "a@mail.com"),
            payload("Text 2", "0123", "a@mail.com"),
            payload("Text 3", "0123", "b@mail.com"),
        ];

        let delivered = notifier(client.clone()).dispatch(&payloads).await.unwrap();

        let sent = client.sent();
        assert_eq!(sent.len(), 2);
        let recipients: Vec<&str> = sent.iter().map(|m| m.to.as_str()).collect();
        assert!(recipients.contains(&"a@mail.com"));
        assert!(recipients.contains(&"b@mail.com"));

        assert_eq!(delivered.len(), 3);
        for p in &payloads {
            assert!(delivered.contains(p));
        }
    }

    #[tokio::test]
    async fn test_failed_group_missing_from_delivered_subset() {
        let client = MockTransport::failing_for("b@mail.com");
        let payloads = vec![
            payload("Text 1", "", "a@mail.com"),
            payload("Text 2", "0123", "b@mail.com"),
        ];

        let delivered = notifier(client.clone()).dispatch(&payloads).await.unwrap();

        assert_eq!(delivered, vec![payloads[0].clone()]);
        assert_eq!(client.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_probe_delegates_to_transport() {
        let client = MockTransport::new();
        assert!(notifier(client).probe().await.is_ok());
    }

    #[test]
    fn test_mail_request_content() {
        let long_message = "b".repeat(99);
        let group = vec![
            payload("a", "012", "test@mail.com"),
            payload(&long_message, "007", "test@mail.com"),
        ];

        let request = notifier(MockTransport::new()).build_request("test@mail.com", &group);

        assert_eq!(request.html_content.matches("<li>").count(), group.len());
        assert_eq!(request.html_content.matches("...").count(), 1);
        assert_eq!(request.to, "test@mail.com");
        assert_eq!(request.subject, SUBJECT);
        assert_eq!(request.from, "sender@test.com");
        assert_eq!(request.from_name, "Test Sender");
    }

    #[test]
    fn test_missing_number_rendered_as_placeholder() {
        let group = vec![payload("call the dentist", "", "test@mail.com")];
        let request = notifier(MockTransport::new()).build_request("test@mail.com", &group);
        assert!(request.html_content.contains("no number provided"));
        assert!(request.html_content.contains("https://wa.me/?text="));
    }

    #[test]
    fn test_message_text_is_html_escaped() {
        let group = vec![payload("<b>5 & 6</b>", "012", "test@mail.com")];
        let request = notifier(MockTransport::new()).build_request("test@mail.com", &group);
        assert!(request.html_content.contains("&lt;b&gt;5 &amp; 6&lt;/b&gt;"));
        assert!(!request.html_content.contains("<b>5"));
    }

    #[test]
    fn test_truncation_counts_escaped_text() {
        assert_eq!(html_escape("it's <fine>"), "it&#39;s &lt;fine&gt;");

        let message = "x".repeat(MAX_PREVIEW_CHARS);
        let group = vec![payload(&message, "012", "test@mail.com")];
        let request = notifier(MockTransport::new()).build_request("test@mail.com", &group);
        assert_eq!(request.html_content.matches("...").count(), 0);
    }
}
