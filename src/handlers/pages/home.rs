use axum::response::Html;

use crate::views;

/// GET /
pub async fn home() -> Html<String> {
    Html(views::home::render())
}
