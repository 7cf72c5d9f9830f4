//! DevManage dashboard API
//!
//! Authenticated endpoints under `/users` and `/projects`: profiles, the
//! developer directory, project lifecycle, revenue-share earnings and sales
//! rollups. Tokens are issued by the authentication service.

pub mod analytics;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod settings;
pub mod state;

pub use state::AppState;
