//! # REST API Interface Layer
//!
//! HTTP endpoints for the chore tracker, all nested under `/api`. Every
//! handler identifies the caller with [`auth::AuthenticatedUser`], maps the
//! request DTO into a domain command, and returns either the response DTO or
//! an [`error::ApiError`] carrying the status code for the domain error.

use axum::Router;

use crate::backend::AppState;

pub mod auth;
pub mod child_apis;
pub mod chore_apis;
pub mod daily_record_apis;
pub mod error;
pub mod family_apis;
pub mod mappers;

/// All API routes, ready to be nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(daily_record_apis::router())
        .merge(chore_apis::router())
        .merge(child_apis::router())
        .merge(family_apis::router())
}
