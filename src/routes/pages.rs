use axum::{body::Bytes, extract::State, response::Html};
use std::sync::Arc;

use crate::state::AppState;

pub async fn index(State(state): State<Arc<AppState>>) -> Html<Bytes> {
    Html(state.report_html.clone())
}
