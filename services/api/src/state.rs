//! Application state shared across handlers

use common::jwt::JwtService;
use sqlx::PgPool;

use crate::repositories::{ProjectRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub project_repository: ProjectRepository,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            project_repository: ProjectRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
        }
    }
}
