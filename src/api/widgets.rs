use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::shell::{PageSnapshot, SearchOutcome, WidgetSnapshot};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

/// GET /api/page - 页面快照
pub async fn get_page(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PageSnapshot>> {
    Json(ApiResponse::success(state.shell.page()))
}

/// GET /api/widgets/:key
pub async fn get_widget(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<ApiResponse<WidgetSnapshot>> {
    Json(ApiResponse::from_result(state.shell.snapshot(&key)))
}

/// POST /api/widgets/:key/input - 输入变化时查询
pub async fn widget_input(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(req): Json<InputRequest>,
) -> Json<ApiResponse<SearchOutcome>> {
    Json(ApiResponse::from_result(state.shell.search(&key, &req.text).await))
}

/// POST /api/widgets/:key/select - 选择建议项
pub async fn widget_select(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(req): Json<SelectRequest>,
) -> Json<ApiResponse<WidgetSnapshot>> {
    Json(ApiResponse::from_result(state.shell.select(&key, req.index)))
}

/// POST /api/widgets/:key/submit - 提交文本
pub async fn widget_submit(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(req): Json<InputRequest>,
) -> Json<ApiResponse<WidgetSnapshot>> {
    Json(ApiResponse::from_result(state.shell.submit(&key, &req.text)))
}

/// POST /api/widgets/:key/reset
pub async fn widget_reset(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<ApiResponse<WidgetSnapshot>> {
    Json(ApiResponse::from_result(state.shell.reset(&key)))
}
