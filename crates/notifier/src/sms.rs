use async_trait::async_trait;
use thiserror::Error;

/// A single outbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub from: String,
    /// E.164-style destination, e.g. `+18605550123`.
    pub to: String,
    pub body: String,
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReceipt {
    pub id: String,
}

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS provider rejected message ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("SMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMS delivery is not configured")]
    NotConfigured,

    #[error("Invalid phone number: {0:?}")]
    InvalidNumber(String),
}

/// Anything that can deliver a text message.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, SmsError>;
}

/// Sender used when no telephony credentials are configured.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredSmsSender;

#[async_trait]
impl SmsSender for UnconfiguredSmsSender {
    async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, SmsError> {
        tracing::warn!(to = %message.to, "Dropping SMS: no provider configured");
        Err(SmsError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_sender_always_fails() {
        let message = SmsMessage {
            from: "+18605550100".to_string(),
            to: "+18605550123".to_string(),
            body: "hello".to_string(),
        };
        let err = UnconfiguredSmsSender.send(&message).await.unwrap_err();
        assert!(matches!(err, SmsError::NotConfigured));
        assert_eq!(err.to_string(), "SMS delivery is not configured");
    }
}
