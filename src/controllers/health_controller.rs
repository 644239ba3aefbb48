use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use mongodb::bson::doc;
use serde_json::{Value, json};

use crate::AppState;
use crate::services::db::masked_uri;

// GET /api/health
//
// Always answers 200; a degraded database is reported in the body so the
// frontend's health page can render the failure instead of a blank error.
pub async fn get_health(State(state): State<AppState>) -> Json<Value> {
    let db = &state.db.db;

    let (mongo_status, error) = match db.run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => ("connected", None),
        Err(e) => {
            tracing::error!(error = %e, "health check: mongodb ping failed");
            ("error", Some(e.to_string()))
        }
    };

    let version = match db.run_command(doc! { "buildInfo": 1 }, None).await {
        Ok(info) => info
            .get_str("version")
            .unwrap_or("unknown")
            .to_string(),
        Err(_) => "unknown".to_string(),
    };

    let mut body = json!({
        "status": if error.is_none() { "ok" } else { "error" },
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.settings.environment,
        "mongodb": {
            "status": mongo_status,
            "uri": masked_uri(&state.settings.mongo_uri),
            "db": state.db.db_name,
            "version": version,
        }
    });
    if let Some(error) = error {
        body["error"] = Value::String(error);
    }

    Json(body)
}

// Fallback for unknown API paths.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Not found" })),
    )
}
