use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::School;
use crate::error::ApiError;
use crate::handlers::form::read_submission;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SchoolList {
    pub schools: Vec<School>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolCreated {
    pub message: String,
    pub school_id: i64,
}

/// GET /api/schools - Every school, most recently created first
pub async fn get(State(state): State<AppState>) -> ApiResult<SchoolList> {
    let schools = state
        .schools
        .list()
        .await
        .map_err(|e| ApiError::storage("Failed to fetch schools", e))?;

    Ok(ApiResponse::success(SchoolList { schools }))
}

/// POST /api/schools - Create one school from a multipart form
pub async fn post(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<SchoolCreated> {
    let submission = read_submission(multipart).await?;
    let school_id = state.schools.create(submission).await?;

    Ok(ApiResponse::created(SchoolCreated {
        message: "School added successfully".to_string(),
        school_id,
    }))
}
