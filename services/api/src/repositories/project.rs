//! Project repository for database operations

use std::collections::BTreeMap;

use common::error::DatabaseResult;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use crate::{
    analytics::ProjectFigures,
    models::project::{DeveloperSummary, EndPoint, NewProject, Project},
};

/// Project columns plus the ordered member ids
const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.project_name, p.project_desc, p.project_url, p.price,
           p.submission_date, p.requirements, p.developer_shares, p.end_points,
           p.sales, p.created_by, p.created_at, p.updated_at,
           COALESCE(
               (SELECT array_agg(pd.user_id ORDER BY pd.position)
                FROM project_developers pd
                WHERE pd.project_id = p.id),
               '{}'
           ) AS selected_developers
    FROM projects p
"#;

fn project_from_row(row: &PgRow) -> Result<Project, sqlx::Error> {
    let requirements: Json<Vec<String>> = row.try_get("requirements")?;
    let developer_shares: Json<BTreeMap<String, f64>> = row.try_get("developer_shares")?;
    let end_points: Json<Vec<EndPoint>> = row.try_get("end_points")?;

    Ok(Project {
        id: row.try_get("id")?,
        project_name: row.try_get("project_name")?,
        project_desc: row.try_get("project_desc")?,
        project_url: row.try_get("project_url")?,
        price: row.try_get("price")?,
        submission_date: row.try_get("submission_date")?,
        selected_developers: row.try_get("selected_developers")?,
        requirements: requirements.0,
        developer_shares: developer_shares.0,
        end_points: end_points.0,
        sales: row.try_get("sales")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn figures_from_row(row: &PgRow) -> Result<ProjectFigures, sqlx::Error> {
    Ok(ProjectFigures {
        price: row.try_get("price")?,
        sales: row.try_get("sales")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Project repository for database operations
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a project and its membership rows in one transaction.
    /// `developers` must already be resolved to existing users.
    pub async fn create(
        &self,
        project: &NewProject,
        developers: &[Uuid],
        created_by: Uuid,
    ) -> DatabaseResult<Project> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, project_name, project_desc, project_url, price,
                                  submission_date, requirements, developer_shares,
                                  end_points, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&project.project_name)
        .bind(&project.project_desc)
        .bind(&project.project_url)
        .bind(project.price)
        .bind(project.submission_date)
        .bind(Json(&project.requirements))
        .bind(Json(&project.developer_shares))
        .bind(Json(&project.end_points))
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        for (position, developer) in developers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO project_developers (project_id, user_id, position) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(developer)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(&format!("{} WHERE p.id = $1", PROJECT_SELECT))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Created project {} with {} developers",
            id,
            developers.len()
        );
        Ok(project_from_row(&row)?)
    }

    /// Get a project by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Project>> {
        let row = sqlx::query(&format!("{} WHERE p.id = $1", PROJECT_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(project_from_row).transpose()?)
    }

    /// Contact cards of a project's members
    pub async fn developers(&self, project_id: Uuid) -> DatabaseResult<Vec<DeveloperSummary>> {
        let developers = sqlx::query_as::<_, DeveloperSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.phone
            FROM project_developers pd
            JOIN users u ON u.id = pd.user_id
            WHERE pd.project_id = $1
            ORDER BY pd.position
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(developers)
    }

    /// Delete a project; membership rows cascade
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the sales count
    pub async fn update_sales(&self, id: Uuid, sales: i64) -> DatabaseResult<Option<Project>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE projects SET sales = $2, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(sales)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Projects `user_id` is a member of, oldest first
    pub async fn find_for_developer(&self, user_id: Uuid) -> DatabaseResult<Vec<Project>> {
        let rows = sqlx::query(&format!(
            r#"{}
            WHERE EXISTS (
                SELECT 1 FROM project_developers pd
                WHERE pd.project_id = p.id AND pd.user_id = $1
            )
            ORDER BY p.created_at"#,
            PROJECT_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(project_from_row)
            .collect::<Result<_, _>>()?)
    }

    /// Ids of the projects `user_id` is a member of
    pub async fn project_ids_for_developer(&self, user_id: Uuid) -> DatabaseResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT pd.project_id
            FROM project_developers pd
            JOIN projects p ON p.id = pd.project_id
            WHERE pd.user_id = $1
            ORDER BY p.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Price, sales and creation time of the projects `user_id` is a member of
    pub async fn figures_for_developer(&self, user_id: Uuid) -> DatabaseResult<Vec<ProjectFigures>> {
        let rows = sqlx::query(
            r#"
            SELECT p.price, p.sales, p.created_at
            FROM projects p
            JOIN project_developers pd ON pd.project_id = p.id
            WHERE pd.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(figures_from_row)
            .collect::<Result<_, _>>()?)
    }

    /// Price, sales and creation time of every project
    pub async fn all_figures(&self) -> DatabaseResult<Vec<ProjectFigures>> {
        let rows = sqlx::query("SELECT price, sales, created_at FROM projects")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(figures_from_row)
            .collect::<Result<_, _>>()?)
    }
}
