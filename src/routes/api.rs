use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::state::AppState;

pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    if filename.contains("..") || filename.contains('/') || filename.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = state.config.results_folder.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&filename)
                .first_raw()
                .unwrap_or("application/octet-stream");
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                content,
            )
                .into_response()
        }
        Err(err) => {
            tracing::debug!("Download of {} failed: {}", path.display(), err);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "findings": state.report.findings.len(),
        "by_contestant": state.report.by_contestant,
        "by_school": state.report.by_school,
    }))
}
