//! Telephony REST client for the Programmable Messaging API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use vestry_common::config::AppConfig;

use crate::sms::{SmsError, SmsMessage, SmsReceipt, SmsSender};

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Scheme and host only, e.g. `https://api.twilio.com`.
    pub api_base: String,
    /// Upper bound on one request, connect through response body.
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TwilioSmsSender {
    options: TwilioOptions,
    client: Client,
}

/// Subset of the message resource returned on success.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Error body returned on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ErrorResource {
    message: String,
    code: Option<i64>,
}

impl TwilioSmsSender {
    pub fn new(options: TwilioOptions) -> Result<Self, SmsError> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self { options, client })
    }

    /// Build a sender from config; `None` unless SID and auth token are both set.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, SmsError> {
        let (Some(account_sid), Some(auth_token)) = (
            config.twilio_account_sid.clone(),
            config.twilio_auth_token.clone(),
        ) else {
            return Ok(None);
        };

        Self::new(TwilioOptions {
            account_sid,
            auth_token,
            api_base: config.twilio_api_base.clone(),
            request_timeout: Duration::from_secs(config.sms_timeout_secs),
        })
        .map(Some)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.options.api_base.trim_end_matches('/'),
            self.options.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, message: &SmsMessage) -> Result<SmsReceipt, SmsError> {
        if message.to.is_empty() {
            return Err(SmsError::InvalidNumber(message.to.clone()));
        }

        let form = [
            ("To", message.to.as_str()),
            ("From", message.from.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResource>(&text) {
                Ok(err) => match err.code {
                    Some(code) => format!("{} (code {})", err.message, code),
                    None => err.message,
                },
                Err(_) if text.is_empty() => status.to_string(),
                Err(_) => text,
            };

            tracing::debug!(status = status.as_u16(), %message, "SMS provider returned an error");
            return Err(SmsError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let resource: MessageResource = response.json().await?;
        tracing::debug!(sid = %resource.sid, to = %message.to, "SMS accepted by provider");

        Ok(SmsReceipt { id: resource.sid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn sender_with_timeout(server: &MockServer, request_timeout: Duration) -> TwilioSmsSender {
        TwilioSmsSender::new(TwilioOptions {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            api_base: server.base_url(),
            request_timeout,
        })
        .unwrap()
    }

    fn sender(server: &MockServer) -> TwilioSmsSender {
        sender_with_timeout(server, Duration::from_secs(5))
    }

    fn message() -> SmsMessage {
        SmsMessage {
            from: "+18605550100".to_string(),
            to: "+18605550123".to_string(),
            body: "Potluck Sunday".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_returns_message_sid() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/2010-04-01/Accounts/AC123/Messages.json")
                    .header_exists("authorization")
                    .x_www_form_urlencoded_tuple("To", "+18605550123")
                    .x_www_form_urlencoded_tuple("From", "+18605550100")
                    .x_www_form_urlencoded_tuple("Body", "Potluck Sunday");
                then.status(201)
                    .json_body(serde_json::json!({"sid": "SM0001", "status": "queued"}));
            })
            .await;

        let receipt = sender(&server).send(&message()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(receipt.id, "SM0001");
    }

    #[tokio::test]
    async fn test_provider_error_is_described() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400).json_body(serde_json::json!({
                    "code": 21211,
                    "message": "The 'To' number is not a valid phone number.",
                    "status": 400
                }));
            })
            .await;

        let err = sender(&server).send(&message()).await.unwrap_err();
        match err {
            SmsError::Provider { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("not a valid phone number"));
                assert!(message.contains("21211"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_without_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(401);
            })
            .await;

        let err = sender(&server).send(&message()).await.unwrap_err();
        assert!(matches!(err, SmsError::Provider { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(201)
                    .delay(Duration::from_millis(500))
                    .json_body(serde_json::json!({"sid": "SM0001"}));
            })
            .await;

        let err = sender_with_timeout(&server, Duration::from_millis(100))
            .send(&message())
            .await
            .unwrap_err();
        assert!(matches!(err, SmsError::Http(ref e) if e.is_timeout()), "{err}");
    }

    #[tokio::test]
    async fn test_empty_destination_rejected_locally() {
        let server = MockServer::start_async().await;
        let mut msg = message();
        msg.to = String::new();

        let err = sender(&server).send(&msg).await.unwrap_err();
        assert!(matches!(err, SmsError::InvalidNumber(_)));
    }
}
