//! API models for request and response payloads

use chrono::{DateTime, Utc};
use common::{PublicUser, validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod project;

/// Profile of the calling user, with the ids of the projects they belong to
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub projects: Vec<Uuid>,
}

/// Body of `PUT /users/profile`; blank or missing fields keep their value
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub user_name: Option<String>,
}

/// Profile fields to overwrite
#[derive(Debug, Default, PartialEq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub user_name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<ProfileChanges, String> {
        let changes = ProfileChanges {
            name: non_blank(self.name),
            phone: non_blank(self.phone),
            user_name: non_blank(self.user_name),
        };

        if let Some(phone) = &changes.phone {
            validation::validate_phone(phone)?;
        }
        if let Some(user_name) = &changes.user_name {
            validation::validate_username(user_name)?;
        }

        Ok(changes)
    }
}

/// Body of `PUT /users/update-password`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Entry of the developer picker
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperListing {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct DeveloperListResponse {
    pub count: usize,
    pub users: Vec<DeveloperListing>,
}

/// A project as seen by one of its members
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProject {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub project_name: String,
    pub project_desc: String,
    pub project_url: String,
    pub sales: i64,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub user_share: f64,
    pub user_earnings: f64,
}

#[derive(Debug, Serialize)]
pub struct UserProjectsResponse {
    pub count: usize,
    pub projects: Vec<UserProject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalEarningsResponse {
    pub total_earning: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalRevenueResponse {
    pub total_revenue: f64,
}
