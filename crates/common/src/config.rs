use serde::Deserialize;

/// Signature line appended to every outbound announcement text.
pub const DEFAULT_SMS_SIGNATURE: &str = "- Sent from your church family";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Port the API server binds to (default: 3000)
    pub api_port: u16,

    /// JWT secret for API authentication
    pub jwt_secret: String,

    /// JWT token expiry in hours
    pub jwt_expiry_hours: u64,

    /// Telephony account SID
    pub twilio_account_sid: Option<String>,

    /// Telephony auth token
    pub twilio_auth_token: Option<String>,

    /// Sender number announcements are texted from
    pub twilio_phone_number: Option<String>,

    /// Base URL of the telephony REST API
    pub twilio_api_base: String,

    /// Per-request timeout for the telephony API, in seconds (default: 10)
    pub sms_timeout_secs: u64,

    /// Prefix added to numbers that were stored without one (default: +1)
    pub sms_default_country_code: String,

    /// Closing line of every announcement text
    pub sms_signature: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a valid u16"))?,
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JWT_EXPIRY_HOURS must be a valid u64"))?,
            twilio_account_sid: non_empty_var("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: non_empty_var("TWILIO_AUTH_TOKEN"),
            twilio_phone_number: non_empty_var("TWILIO_PHONE_NUMBER"),
            twilio_api_base: std::env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            sms_timeout_secs: std::env::var("SMS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SMS_TIMEOUT_SECS must be a valid u64"))?,
            sms_default_country_code: std::env::var("SMS_DEFAULT_COUNTRY_CODE")
                .unwrap_or_else(|_| "+1".to_string()),
            sms_signature: std::env::var("SMS_SIGNATURE")
                .unwrap_or_else(|_| DEFAULT_SMS_SIGNATURE.to_string()),
        })
    }

    /// True when every credential needed to send SMS is present.
    pub fn sms_enabled(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_phone_number.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "unused".to_string(),
            db_max_connections: 5,
            api_port: 3000,
            jwt_secret: "secret".to_string(),
            jwt_expiry_hours: 24,
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("token".to_string()),
            twilio_phone_number: Some("+18605550100".to_string()),
            twilio_api_base: "https://api.twilio.com".to_string(),
            sms_timeout_secs: 10,
            sms_default_country_code: "+1".to_string(),
            sms_signature: DEFAULT_SMS_SIGNATURE.to_string(),
        }
    }

    #[test]
    fn test_sms_enabled_requires_all_credentials() {
        let mut cfg = config();
        assert!(cfg.sms_enabled());

        cfg.twilio_phone_number = None;
        assert!(!cfg.sms_enabled());
    }
}
