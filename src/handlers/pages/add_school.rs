use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::{extract::State, http::StatusCode, response::Html};

use crate::error::ApiError;
use crate::handlers::form::read_submission;
use crate::server::AppState;
use crate::views::school_form::{self, Banner, FormValues};

/// GET /addSchool
pub async fn form() -> Html<String> {
    Html(school_form::render(None, &FormValues::default()))
}

/// POST /addSchool - Same ingestion as POST /api/schools, answered with the
/// form page and a result banner instead of JSON
pub async fn submit(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Html<String>) {
    let mut values = FormValues::default();

    let result: Result<i64, ApiError> = async {
        let submission = read_submission(multipart).await?;
        values = FormValues::from(&submission);
        Ok(state.schools.create(submission).await?)
    }
    .await;

    match result {
        Ok(_) => (
            StatusCode::CREATED,
            Html(school_form::render(
                Some(&Banner::Success("School added successfully! 🎉".to_string())),
                &FormValues::default(),
            )),
        ),
        Err(e) => (
            e.status_code(),
            Html(school_form::render(
                Some(&Banner::Error(format!("Error: {}", e.message()))),
                &values,
            )),
        ),
    }
}
