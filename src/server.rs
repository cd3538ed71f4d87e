use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::SchoolRepository;
use crate::handlers::{self, api, pages};
use crate::services::SchoolService;
use crate::storage::ImageStore;

/// Everything a request handler may touch, built once in `main`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub schools: SchoolService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        schools: Arc<dyn SchoolRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            schools: SchoolService::new(schools, images),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let public_dir = state.config.images.public_dir.clone();
    let body_limit = state.config.api.max_request_size_bytes;

    let mut app = Router::new()
        // Pages
        .route("/", get(pages::home))
        .route(
            "/addSchool",
            get(pages::add_school_form).post(pages::add_school_submit),
        )
        .route("/showSchools", get(pages::show_schools))
        // API
        .route("/api/schools", get(api::schools_get).post(api::schools_post))
        .route("/health", get(handlers::health))
        // Uploaded images and the placeholder live in the public directory
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive());

    if state.config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}
