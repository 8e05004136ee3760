pub mod assets;
pub mod crew;
pub mod server;
pub mod widgets;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ShellError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn from_result(result: Result<T, ShellError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(e.code(), &e.to_string()),
        }
    }
}

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/page", get(widgets::get_page))
        .route("/api/crew/search", get(crew::search_crew))
        .route("/api/widgets/:key", get(widgets::get_widget))
        .route("/api/widgets/:key/input", post(widgets::widget_input))
        .route("/api/widgets/:key/select", post(widgets::widget_select))
        .route("/api/widgets/:key/submit", post(widgets::widget_submit))
        .route("/api/widgets/:key/reset", post(widgets::widget_reset))
        // Embedded page
        .fallback(assets::serve_embedded_file)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
