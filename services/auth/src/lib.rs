//! DevManage authentication service
//!
//! Public identity endpoints: e-mail one-time passcodes, registration and
//! login. Issued tokens are checked by the API service with the same
//! signing secret.

pub mod error;
pub mod mailer;
pub mod models;
pub mod otp;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod settings;

use std::sync::Arc;

use common::{cache::RedisPool, jwt::JwtService};
use sqlx::PgPool;

use crate::{
    mailer::Mailer,
    otp::OtpService,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
    settings::Settings,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
    pub otp_service: OtpService,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        redis_pool: RedisPool,
        jwt_service: JwtService,
        settings: Settings,
    ) -> Self {
        let mailer = Mailer::new(settings.mail_webhook_url.clone(), settings.mail_from.clone());
        let otp_service = OtpService::new(
            redis_pool,
            mailer,
            settings.otp_ttl_seconds,
            settings.otp_verified_ttl_seconds,
        );

        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
            rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
            otp_service,
            settings: Arc::new(settings),
        }
    }
}
