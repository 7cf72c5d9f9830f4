//! OTP request payloads

use serde::Deserialize;

/// Request for `POST /auth/send-otp`
#[derive(Debug, Clone, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

/// Request for `POST /auth/verify-otp`
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}
