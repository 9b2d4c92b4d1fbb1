use axum::body::Bytes;
use std::sync::Arc;

use crate::config::Config;
use crate::report::ActivityReport;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Rendered once; every response shares this buffer.
    pub report_html: Bytes,
    pub report: Arc<ActivityReport>,
}
