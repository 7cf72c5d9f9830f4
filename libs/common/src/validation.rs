//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Normalize an e-mail address for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate user name
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("UserName is required".to_string());
    }

    if username.len() < 3 {
        return Err("UserName must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("UserName must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("UserName can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate phone number
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone is required".to_string());
    }

    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9 ()-]{7,20}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone) {
        return Err("Invalid phone number".to_string());
    }

    Ok(())
}

/// Require a non-blank value
pub fn require_non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("dev_one").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("dev@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("dev@example").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("+91 98765-43210").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Dev@Example.COM "), "dev@example.com");
    }

    #[test]
    fn test_require_non_blank() {
        assert_eq!(
            require_non_blank("Name", "   ").unwrap_err(),
            "Name is required"
        );
        assert!(require_non_blank("Name", "Asha").is_ok());
    }
}
