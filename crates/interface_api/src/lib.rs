//! HTTP API Layer
//!
//! This crate provides the claim intake HTTP surface using Axum.
//!
//! # Architecture
//!
//! - **Bootstrap**: secret resolution and adapter wiring
//! - **Handlers**: intake form, multipart claim submission, health checks
//! - **Middleware**: request id tagging and request logging
//! - **DTOs**: response bodies
//! - **Error Handling**: consistent JSON error responses with a selectable
//!   status policy
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(intake, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_claims::ClaimIntakeService;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{claims, form, health};
use crate::middleware::request_logging_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<ClaimIntakeService>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(intake: ClaimIntakeService, config: ApiConfig) -> Self {
        Self {
            intake: Arc::new(intake),
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Intake service and API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/", get(form::intake_form))
        .route("/submit-claim", post(claims::submit_claim))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(request_logging_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
