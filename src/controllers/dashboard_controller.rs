use axum::{Json, extract::Query, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::services::stats;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

// GET /api/dashboard/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<Value>, ApiError> {
    let stats = stats::dashboard_stats(&state, params.user_id.as_deref()).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}
