use axum::{extract::State, http::StatusCode, response::Html};

use crate::server::AppState;
use crate::views::gallery;

/// GET /showSchools - Gallery of every school as a card
pub async fn show_schools(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match state.schools.list().await {
        Ok(schools) => (StatusCode::OK, Html(gallery::render(&schools))),
        Err(e) => {
            tracing::error!("Failed to fetch schools: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(gallery::render_error("Failed to fetch schools")),
            )
        }
    }
}
