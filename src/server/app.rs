//! Axum application setup
//!
//! Creates and configures the Axum application with routes and middleware.

use crate::{Result, config::Settings, pipeline::Resolver};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolution pipeline
    pub resolver: Arc<Resolver>,
    /// Application settings
    pub settings: Arc<Settings>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let resolver = Resolver::from_settings(&settings)?;
        Ok(Self {
            resolver: Arc::new(resolver),
            settings: Arc::new(settings),
            start_time: std::time::Instant::now(),
        })
    }

    /// Attribution attached to every body
    pub fn developer(&self) -> &str {
        &self.settings.pipeline.attribution
    }
}

/// Create the main Axum application with routes and middleware
pub fn create_app(settings: Settings) -> Result<Router> {
    Ok(create_app_with_state(AppState::new(settings)?))
}

/// Build the router over prepared state
pub fn create_app_with_state(state: AppState) -> Router {
    use super::handlers;

    let enable_cors = state.settings.server.enable_cors;

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api", get(handlers::legacy_api))
        .route("/search", get(handlers::legacy_api))
        .route("/dl", get(handlers::dl))
        .route("/api/search", get(handlers::api_search))
        .route("/api/info", get(handlers::api_info))
        .route("/api/download", get(handlers::api_download))
        .route("/api/formats", get(handlers::api_formats))
        .route("/api/direct", get(handlers::api_direct))
        .route("/api/quick", get(handlers::api_quick))
        .route("/api/smart", get(handlers::api_smart));

    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
