//! # Backend Module
//!
//! Contains all non-UI logic for the chore tracker.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (daily records, rollover, payouts, permissions)
//!     ↓
//! Storage Layer (SQLite)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_utils;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::config::AppConfig;
use crate::backend::domain::{
    ChildService, ChoreService, Clock, DailyRecordService, DayBoundary, FamilyService, PermissionChecker,
    RolePermissionChecker, SystemClock,
};
use crate::backend::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub child_service: ChildService<DbConnection>,
    pub chore_service: ChoreService<DbConnection>,
    pub daily_record_service: DailyRecordService<DbConnection>,
    pub family_service: FamilyService<DbConnection>,
}

impl AppState {
    /// Wire every service to one connection, permission checker and clock
    pub fn new(connection: DbConnection, clock: Arc<dyn Clock>, day_boundary: DayBoundary) -> Self {
        let connection = Arc::new(connection);
        let permissions: Arc<dyn PermissionChecker> =
            Arc::new(RolePermissionChecker::new(connection.as_ref()));

        Self {
            child_service: ChildService::new(connection.clone(), permissions.clone(), clock.clone()),
            chore_service: ChoreService::new(
                connection.clone(),
                permissions.clone(),
                clock.clone(),
                day_boundary,
            ),
            daily_record_service: DailyRecordService::new(
                connection.clone(),
                permissions.clone(),
                clock,
                day_boundary,
            ),
            family_service: FamilyService::new(connection, permissions),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    if let Some(dir) = &config.data_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    }

    info!("Setting up database");
    let connection = DbConnection::new(&config.database_url, config.db_max_connections).await?;

    info!(
        "Setting up domain services (day boundary UTC{:+} minutes)",
        config.day_boundary.offset_minutes()
    );
    Ok(AppState::new(connection, Arc::new(SystemClock), config.day_boundary))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(Router::new()
        .nest("/api", io::rest::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
