//! One-time passcodes for e-mail verification
//!
//! A code lives in Redis under `otp:<email>` with a TTL equal to its
//! lifetime. The stored record carries its own expiry as well, so an entry
//! that outlives its TTL (clock skew, a persisted snapshot) is still refused
//! and removed on lookup. A successful verification leaves an
//! `otp_verified:<email>` marker that registration can consume.

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mailer::{MailError, Mailer};
use common::cache::RedisPool;

/// Stored form of an issued passcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub code: String,
    /// Unix timestamp (seconds) after which the code is no longer accepted
    pub expires_at: i64,
}

/// Outcome of comparing a submitted code to a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    Expired,
    Mismatch,
}

impl OtpRecord {
    pub fn new(code: String, now: i64, ttl_seconds: u64) -> Self {
        Self {
            code,
            expires_at: now + ttl_seconds as i64,
        }
    }

    pub fn check(&self, submitted: &str, now: i64) -> OtpCheck {
        if now > self.expires_at {
            OtpCheck::Expired
        } else if self.code == submitted.trim() {
            OtpCheck::Valid
        } else {
            OtpCheck::Mismatch
        }
    }
}

/// Generate a 6-digit passcode
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn otp_key(email: &str) -> String {
    format!("otp:{}", email)
}

fn verified_key(email: &str) -> String {
    format!("otp_verified:{}", email)
}

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("OTP storage failed: {0}")]
    Storage(#[from] anyhow::Error),

    #[error(transparent)]
    Delivery(#[from] MailError),
}

#[derive(Clone)]
pub struct OtpService {
    redis_pool: RedisPool,
    mailer: Mailer,
    ttl_seconds: u64,
    verified_ttl_seconds: u64,
}

impl OtpService {
    pub fn new(
        redis_pool: RedisPool,
        mailer: Mailer,
        ttl_seconds: u64,
        verified_ttl_seconds: u64,
    ) -> Self {
        Self {
            redis_pool,
            mailer,
            ttl_seconds,
            verified_ttl_seconds,
        }
    }

    /// Issue a fresh code for `email`, replacing any outstanding one, and
    /// hand it to the mailer
    pub async fn issue(&self, email: &str) -> Result<(), OtpError> {
        let record = OtpRecord::new(generate_code(), Utc::now().timestamp(), self.ttl_seconds);
        let payload = serde_json::to_string(&record).map_err(anyhow::Error::from)?;

        self.redis_pool
            .set(&otp_key(email), &payload, Some(self.ttl_seconds))
            .await?;

        let mail = self.mailer.otp_mail(email, &record.code, self.ttl_seconds);
        self.mailer.send(&mail).await?;

        info!("Issued OTP for {}", email);
        Ok(())
    }

    /// Check `code` for `email`. Valid and expired codes are removed; a
    /// mismatch leaves the code in place for another try.
    pub async fn verify(&self, email: &str, code: &str) -> Result<bool> {
        let key = otp_key(email);
        let Some(payload) = self.redis_pool.get(&key).await? else {
            return Ok(false);
        };

        let record: OtpRecord = match serde_json::from_str(&payload) {
            Ok(record) => record,
            Err(e) => {
                warn!("Discarding unreadable OTP entry for {}: {}", email, e);
                self.redis_pool.delete(&key).await?;
                return Ok(false);
            }
        };

        match record.check(code, Utc::now().timestamp()) {
            OtpCheck::Valid => {
                self.redis_pool.delete(&key).await?;
                self.redis_pool
                    .set(&verified_key(email), "1", Some(self.verified_ttl_seconds))
                    .await?;
                Ok(true)
            }
            OtpCheck::Expired => {
                self.redis_pool.delete(&key).await?;
                Ok(false)
            }
            OtpCheck::Mismatch => Ok(false),
        }
    }

    /// Whether `email` passed verification within the verification window
    pub async fn is_verified(&self, email: &str) -> Result<bool> {
        Ok(self.redis_pool.get(&verified_key(email)).await?.is_some())
    }

    /// Drop the verification marker once it has been used
    pub async fn consume_verification(&self, email: &str) -> Result<()> {
        self.redis_pool.delete(&verified_key(email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_check_outcomes() {
        let record = OtpRecord::new("482913".to_string(), 1_000, 600);
        assert_eq!(record.expires_at, 1_600);

        assert_eq!(record.check("482913", 1_000), OtpCheck::Valid);
        assert_eq!(record.check(" 482913 ", 1_600), OtpCheck::Valid);
        assert_eq!(record.check("000000", 1_100), OtpCheck::Mismatch);
        assert_eq!(record.check("482913", 1_601), OtpCheck::Expired);
    }

    #[test]
    fn test_record_json_shape() {
        let record = OtpRecord::new("123456".to_string(), 0, 600);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["code"], "123456");
        assert_eq!(json["expires_at"], 600);
    }

    #[test]
    fn test_keys_are_namespaced_by_email() {
        assert_eq!(otp_key("dev@example.com"), "otp:dev@example.com");
        assert_eq!(
            verified_key("dev@example.com"),
            "otp_verified:dev@example.com"
        );
    }
}
