//! Registration and login payloads

use common::{Role, validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for `POST /users/register`
///
/// Every field is optional at the JSON level so that missing fields are
/// reported with a readable message instead of a deserialization error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl RegisterRequest {
    /// Check every field and produce the data to persist. A requested role
    /// is honoured only when `allow_role_selection` is set; otherwise every
    /// account starts as a developer.
    pub fn validate(self, allow_role_selection: bool) -> Result<NewUser, String> {
        let name = self.name.unwrap_or_default().trim().to_string();
        validation::require_non_blank("Name", &name)?;

        let email = validation::normalize_email(&self.email.unwrap_or_default());
        validation::validate_email(&email)?;

        let phone = self.phone.unwrap_or_default().trim().to_string();
        validation::validate_phone(&phone)?;

        let user_name = self.user_name.unwrap_or_default().trim().to_string();
        validation::validate_username(&user_name)?;

        let password = self.password.unwrap_or_default();
        validation::validate_password(&password)?;

        Ok(NewUser {
            name,
            email,
            phone,
            user_name,
            password,
            role: self
                .role
                .filter(|_| allow_role_selection)
                .unwrap_or_default(),
        })
    }
}

/// Validated registration data handed to the repository
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub user_name: String,
    /// Plaintext; the repository hashes it before storage
    pub password: String,
    pub role: Role,
}

/// Response for `POST /users/register`
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub token: String,
}

/// Request for `POST /users/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User summary returned with a login token
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Response for `POST /users/login`
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}
