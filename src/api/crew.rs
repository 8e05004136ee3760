use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::models::CrewRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CrewSearchQuery {
    /// Name fragment; missing means empty (matches everything)
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct CrewSearchResponse {
    pub results: Vec<CrewRecord>,
    pub total: usize,
}

/// GET /api/crew/search?q= - 按名称搜索船员
pub async fn search_crew(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CrewSearchQuery>,
) -> Json<ApiResponse<CrewSearchResponse>> {
    match state.shell.source().search_crew_by_name(&query.q).await {
        Ok(results) => {
            let total = results.len();
            Json(ApiResponse::success(CrewSearchResponse { results, total }))
        }
        Err(e) => {
            tracing::warn!("Crew search failed: {}", e);
            Json(ApiResponse::failure(500, &e.to_string()))
        }
    }
}
