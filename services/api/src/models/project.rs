//! Project payloads

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::SalesOverview;

/// Tolerance when checking that shares total at most 100%
const SHARE_EPSILON: f64 = 1e-9;

/// A number that clients send either as a JSON number or as a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlexibleNumber {
    Number(f64),
    Text(String),
}

impl FlexibleNumber {
    /// The finite numeric value, if there is one
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            FlexibleNumber::Number(n) => Some(*n),
            FlexibleNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

/// A labelled API endpoint of a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndPoint {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl EndPoint {
    fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }
}

/// Stored project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub project_name: String,
    pub project_desc: String,
    pub project_url: String,
    pub price: f64,
    pub submission_date: DateTime<Utc>,
    /// Member ids in the order they were selected
    pub selected_developers: Vec<Uuid>,
    pub requirements: Vec<String>,
    pub developer_shares: BTreeMap<String, f64>,
    pub end_points: Vec<EndPoint>,
    pub sales: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public contact card of a project member
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DeveloperSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Project with its members expanded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub project_name: String,
    pub project_desc: String,
    pub project_url: String,
    pub price: f64,
    pub submission_date: DateTime<Utc>,
    pub selected_developers: Vec<DeveloperSummary>,
    pub requirements: Vec<String>,
    pub developer_shares: BTreeMap<String, f64>,
    pub end_points: Vec<EndPoint>,
    pub sales: i64,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectDetail {
    /// Attach member cards to a project. Cards follow the project's member
    /// order; ids without a card are skipped.
    pub fn new(project: Project, mut developers: Vec<DeveloperSummary>) -> Self {
        let selected_developers = project
            .selected_developers
            .iter()
            .filter_map(|id| {
                let index = developers.iter().position(|d| d.id == *id)?;
                Some(developers.swap_remove(index))
            })
            .collect();

        ProjectDetail {
            id: project.id,
            project_name: project.project_name,
            project_desc: project.project_desc,
            project_url: project.project_url,
            price: project.price,
            submission_date: project.submission_date,
            selected_developers,
            requirements: project.requirements,
            developer_shares: project.developer_shares,
            end_points: project.end_points,
            sales: project.sales,
            created_by: project.created_by,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: ProjectDetail,
}

/// Body of `GET /projects/sales/overview`: a single-row table
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOverviewResponse {
    pub sales_data: Vec<SalesOverview>,
}

/// Body of `POST /projects/create`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub project_name: Option<String>,
    pub project_desc: Option<String>,
    pub project_url: Option<String>,
    pub price: Option<FlexibleNumber>,
    pub submission_date: Option<String>,
    #[serde(default)]
    pub selected_developers: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub developer_shares: BTreeMap<String, FlexibleNumber>,
    #[serde(default)]
    pub end_points: Vec<EndPoint>,
}

/// Validated project, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub project_name: String,
    pub project_desc: String,
    pub project_url: String,
    pub price: f64,
    pub submission_date: DateTime<Utc>,
    /// Raw member ids, deduplicated, in request order; resolved against
    /// the users table before insertion
    pub selected_developers: Vec<String>,
    pub requirements: Vec<String>,
    pub developer_shares: BTreeMap<String, f64>,
    pub end_points: Vec<EndPoint>,
}

impl CreateProjectRequest {
    pub fn validate(self) -> Result<NewProject, String> {
        let project_name = self.project_name.unwrap_or_default().trim().to_string();
        if project_name.is_empty() {
            return Err("projectName is required".to_string());
        }

        let price = match self.price {
            None => return Err("price is required".to_string()),
            Some(price) => price
                .value()
                .filter(|p| *p >= 0.0)
                .ok_or_else(|| "price must be a non-negative number".to_string())?,
        };

        let submission_date = self
            .submission_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "submissionDate is required".to_string())?;
        let submission_date = parse_date(submission_date)
            .ok_or_else(|| "submissionDate must be a valid date".to_string())?;

        let mut developer_shares = BTreeMap::new();
        for (developer, share) in self.developer_shares {
            let value = share
                .value()
                .filter(|v| (0.0..=100.0).contains(v))
                .ok_or_else(|| format!("Invalid share for developer {}", developer))?;
            let developer = canonical_id(&developer);
            if developer_shares.insert(developer.clone(), value).is_some() {
                return Err(format!("Duplicate share for developer {}", developer));
            }
        }
        if developer_shares.values().sum::<f64>() > 100.0 + SHARE_EPSILON {
            return Err("Developer shares exceed 100%".to_string());
        }

        let mut selected_developers: Vec<String> = Vec::new();
        for id in self.selected_developers {
            let id = canonical_id(&id);
            if !selected_developers.contains(&id) {
                selected_developers.push(id);
            }
        }

        Ok(NewProject {
            project_name,
            project_desc: self.project_desc.unwrap_or_default().trim().to_string(),
            project_url: self.project_url.unwrap_or_default().trim().to_string(),
            price,
            submission_date,
            selected_developers,
            requirements: self
                .requirements
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            developer_shares,
            end_points: self
                .end_points
                .into_iter()
                .filter(|e| !e.is_blank())
                .collect(),
        })
    }
}

/// Member ids are matched as text in share maps, so every spelling of a
/// UUID (upper case, braced, urn) is folded to its hyphenated lower case
/// form. Anything else is only trimmed.
fn canonical_id(raw: &str) -> String {
    let raw = raw.trim();
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
}

/// Body of `PUT /projects/:id/sales`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSalesRequest {
    pub sales: Option<FlexibleNumber>,
}

impl UpdateSalesRequest {
    /// The new sales count: a non-negative whole number
    pub fn validate(&self) -> Result<i64, String> {
        let invalid = || "sales must be a non-negative integer".to_string();
        let sales = self
            .sales
            .as_ref()
            .ok_or_else(|| "sales is required".to_string())?
            .value()
            .ok_or_else(invalid)?;

        if sales < 0.0 || sales.fract() != 0.0 || sales >= i64::MAX as f64 {
            return Err(invalid());
        }
        Ok(sales as i64)
    }
}
