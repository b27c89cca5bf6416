//! Mint an admin bearer token.
//!
//! Usage: `vestry-token [ADMIN_UUID]` (a fresh UUID is used when omitted).

use uuid::Uuid;

use vestry_api::middleware::auth::encode_jwt;
use vestry_common::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let admin_id = match std::env::args().nth(1) {
        Some(arg) => Uuid::parse_str(&arg)
            .map_err(|e| anyhow::anyhow!("Invalid admin UUID {:?}: {}", arg, e))?,
        None => Uuid::new_v4(),
    };

    let token = encode_jwt(admin_id, &config.jwt_secret, config.jwt_expiry_hours)?;

    eprintln!(
        "admin {}, token valid for {} hours",
        admin_id, config.jwt_expiry_hours
    );
    println!("{}", token);
    Ok(())
}
