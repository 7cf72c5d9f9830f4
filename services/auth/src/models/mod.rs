//! Authentication service models

pub mod otp;
pub mod user;

pub use otp::{SendOtpRequest, VerifyOtpRequest};
pub use user::{LoginRequest, LoginResponse, LoginUser, NewUser, RegisterRequest, RegisterResponse};
