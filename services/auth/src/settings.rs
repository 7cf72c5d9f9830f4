//! Service settings for the authentication service
//!
//! Values come from built-in defaults, then an optional `config.toml` in the
//! working directory, then environment variables (`AUTH_PORT`,
//! `OTP_TTL_SECONDS`, ...). Connection settings for Postgres, Redis and
//! token signing are loaded by their own `from_env` constructors.

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Interface to bind to
    pub auth_host: String,
    /// Port to bind to
    pub auth_port: u16,
    /// Lifetime of a one-time passcode
    pub otp_ttl_seconds: u64,
    /// How long a successful OTP verification counts for registration
    pub otp_verified_ttl_seconds: u64,
    /// Refuse registration for e-mails without a recent OTP verification
    pub require_email_verification: bool,
    /// Honour the `role` field of a registration; off, everyone registers as
    /// a developer
    pub allow_role_selection: bool,
    /// HTTP hook that delivers outgoing mail; mail is only logged when unset
    pub mail_webhook_url: Option<String>,
    /// Sender address for outgoing mail
    pub mail_from: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("auth_host", "0.0.0.0")?
            .set_default("auth_port", 3000)?
            .set_default("otp_ttl_seconds", 600)?
            .set_default("otp_verified_ttl_seconds", 1800)?
            .set_default("require_email_verification", false)?
            .set_default("allow_role_selection", false)?
            .set_default("mail_from", "DevManage999@gmail.com")?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default().try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.auth_host, self.auth_port)
    }
}
