//! Notification dispatcher — texts an announcement to resolved recipients.
//!
//! Every recipient gets an independent send attempt. Attempts run
//! concurrently and the call waits for all of them; a failed send is
//! recorded against that recipient and never aborts the batch.

use std::sync::Arc;

use futures::future::join_all;

use vestry_common::config::{AppConfig, DEFAULT_SMS_SIGNATURE};
use vestry_common::types::{DispatchResult, Member, RecipientOutcome, RecipientResult};
use vestry_notifier::{SmsError, SmsMessage, SmsSender};

use crate::phone;

/// Sender identity and message formatting for a dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub from_number: String,
    pub default_country_code: String,
    pub signature: String,
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            from_number: config.twilio_phone_number.clone().unwrap_or_default(),
            default_country_code: config.sms_default_country_code.clone(),
            signature: config.sms_signature.clone(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            from_number: String::new(),
            default_country_code: phone::DEFAULT_COUNTRY_CODE.to_string(),
            signature: DEFAULT_SMS_SIGNATURE.to_string(),
        }
    }
}

pub struct NotificationDispatcher {
    sender: Arc<dyn SmsSender>,
    settings: DispatchSettings,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn SmsSender>, settings: DispatchSettings) -> Self {
        Self { sender, settings }
    }

    /// Title, blank line, body, blank line, signature.
    pub fn compose_message(&self, title: &str, body: &str) -> String {
        format!("{}\n\n{}\n\n{}", title, body, self.settings.signature)
    }

    /// Send the announcement to every recipient and aggregate the outcomes.
    ///
    /// `per_recipient` follows the order of `recipients`.
    pub async fn dispatch(&self, title: &str, body: &str, recipients: &[Member]) -> DispatchResult {
        if recipients.is_empty() {
            return DispatchResult::empty();
        }

        let text = self.compose_message(title, body);
        let attempts = recipients.iter().map(|m| self.send_one(m, &text));
        let result = DispatchResult::from_results(join_all(attempts).await);

        tracing::info!(
            recipients = recipients.len(),
            sent = result.sent,
            failed = result.failed,
            "SMS dispatch complete"
        );

        result
    }

    async fn send_one(&self, member: &Member, text: &str) -> RecipientResult {
        let raw = member.phone_number.as_deref().unwrap_or_default();

        let Some(to) = phone::normalize(raw, &self.settings.default_country_code) else {
            let err = SmsError::InvalidNumber(raw.to_string());
            tracing::warn!(member = %member.name, error = %err, "Skipping SMS recipient");
            return RecipientResult {
                member_name: member.name.clone(),
                phone_number: raw.to_string(),
                outcome: RecipientOutcome::Failure {
                    reason: err.to_string(),
                },
            };
        };

        let message = SmsMessage {
            from: self.settings.from_number.clone(),
            to: to.clone(),
            body: text.to_string(),
        };

        let outcome = match self.sender.send(&message).await {
            Ok(receipt) => RecipientOutcome::Success {
                message_id: receipt.id,
            },
            Err(e) => {
                tracing::warn!(
                    member = %member.name,
                    to = %to,
                    error = %e,
                    "SMS send failed"
                );
                RecipientOutcome::Failure {
                    reason: e.to_string(),
                }
            }
        };

        RecipientResult {
            member_name: member.name.clone(),
            phone_number: to,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;
    use vestry_common::types::MemberGroups;
    use vestry_notifier::SmsReceipt;

    /// Records every message and fails sends to the listed numbers.
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<SmsMessage>>,
        fail_for: Vec<String>,
    }

    #[async_trait]
    impl SmsSender for RecordingSender {
        async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, SmsError> {
            let index = {
                let mut sent = self.sent.lock().unwrap();
                sent.push(message.clone());
                sent.len()
            };
            if self.fail_for.contains(&message.to) {
                return Err(SmsError::Provider {
                    status: 400,
                    message: "unreachable handset".to_string(),
                });
            }
            Ok(SmsReceipt {
                id: format!("SM{index}"),
            })
        }
    }

    fn member(name: &str, phone: &str) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone_number: Some(phone.to_string()),
            groups: MemberGroups::from(vec!["Choir"]),
            is_approved: true,
        }
    }

    fn dispatcher(sender: Arc<RecordingSender>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            sender,
            DispatchSettings {
                from_number: "+18605550100".to_string(),
                ..DispatchSettings::default()
            },
        )
    }

    #[test]
    fn test_compose_message() {
        let d = dispatcher(Arc::new(RecordingSender::default()));
        assert_eq!(
            d.compose_message("Potluck", "Bring a dish"),
            format!("Potluck\n\nBring a dish\n\n{DEFAULT_SMS_SIGNATURE}")
        );
    }

    #[tokio::test]
    async fn test_empty_recipients_skip_provider() {
        let sender = Arc::new(RecordingSender::default());
        let result = dispatcher(sender.clone()).dispatch("t", "b", &[]).await;

        assert_eq!(result, DispatchResult::empty());
        assert!(result.success);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_others() {
        let sender = Arc::new(RecordingSender {
            fail_for: vec!["+18605550002".to_string()],
            ..Default::default()
        });
        let recipients = vec![
            member("Ann", "(860) 555-0001"),
            member("Bob", "860.555.0002"),
            member("Cy", "+44 20 7946 0958"),
        ];

        let result = dispatcher(sender.clone())
            .dispatch("Potluck", "Bring a dish", &recipients)
            .await;

        assert!(result.success);
        assert_eq!(result.sent, 2);
        assert_eq!(result.failed, 1);

        let names: Vec<&str> = result
            .per_recipient
            .iter()
            .map(|r| r.member_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ann", "Bob", "Cy"]);

        assert!(result.per_recipient[0].outcome.is_success());
        assert_eq!(
            result.per_recipient[1].outcome,
            RecipientOutcome::Failure {
                reason: "SMS provider rejected message (400): unreachable handset".to_string()
            }
        );
        assert!(result.per_recipient[2].outcome.is_success());
        assert_eq!(result.per_recipient[2].phone_number, "+442079460958");

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|m| m.from == "+18605550100"));
        assert!(sent.iter().all(|m| m.body == sent[0].body));
    }

    /// Holds every send until all recipients' sends have started.
    struct BarrierSender {
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl SmsSender for BarrierSender {
        async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, SmsError> {
            self.barrier.wait().await;
            Ok(SmsReceipt {
                id: format!("SM-{}", message.to),
            })
        }
    }

    #[tokio::test]
    async fn test_sends_are_in_flight_together() {
        let recipients = vec![
            member("Ann", "555-0001"),
            member("Bob", "555-0002"),
            member("Cy", "555-0003"),
        ];
        let sender = Arc::new(BarrierSender {
            barrier: tokio::sync::Barrier::new(recipients.len()),
        });
        let d = NotificationDispatcher::new(sender, DispatchSettings::default());

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            d.dispatch("t", "b", &recipients),
        )
        .await
        .expect("sends were issued one at a time");

        assert_eq!(result.sent, 3);
        assert_eq!(result.failed, 0);
    }

    #[tokio::test]
    async fn test_unusable_number_recorded_without_sending() {
        let sender = Arc::new(RecordingSender::default());
        let recipients = vec![member("Dee", "call the office")];

        let result = dispatcher(sender.clone()).dispatch("t", "b", &recipients).await;

        assert_eq!(result.sent, 0);
        assert_eq!(result.failed, 1);
        assert_eq!(result.per_recipient[0].phone_number, "call the office");
        assert!(sender.sent.lock().unwrap().is_empty());
    }
}
