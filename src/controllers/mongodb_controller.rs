use axum::{
    Json,
    extract::State,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::bson::Document;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::services::query::{Operation, QueryOutcome, QueryRequest, run_query};

/// The in-browser query tool uses its own `{status: ...}` envelope, so the
/// handlers here translate errors locally instead of going through
/// `ApiError`'s `IntoResponse`.
fn tool_error(err: ApiError) -> Response {
    (
        err.status(),
        Json(json!({ "status": "error", "error": err.to_string() })),
    )
        .into_response()
}

// GET /api/mongodb/collections
pub async fn get_collections(State(state): State<AppState>) -> Response {
    match collect_collection_info(&state).await {
        Ok(collections) => Json(json!({
            "status": "success",
            "collections": collections,
        }))
        .into_response(),
        Err(err) => tool_error(err),
    }
}

async fn collect_collection_info(state: &AppState) -> Result<Vec<Value>, ApiError> {
    let db = &state.db.db;
    let names = db
        .list_collection_names(None)
        .await
        .map_err(|e| ApiError::database("listCollections", e))?;
    tracing::info!(count = names.len(), db = %state.db.db_name, "listing collections");

    let mut collections = Vec::with_capacity(names.len());
    for name in names {
        let col = db.collection::<Document>(&name);
        let count = col
            .count_documents(None, None)
            .await
            .map_err(|e| ApiError::database(format!("{name}.count"), e))?;

        // One sample document gives the query tool a key list to work with.
        let sample = col
            .find_one(None, None)
            .await
            .map_err(|e| ApiError::database(format!("{name}.sample"), e))?;
        let info = match sample {
            Some(doc) => {
                let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
                json!({ "schema": keys, "sampleDocument": doc })
            }
            None => json!({ "schema": [], "sampleDocument": Value::Null }),
        };

        collections.push(json!({ "name": name, "count": count, "info": info }));
    }

    Ok(collections)
}

#[derive(Debug, Deserialize)]
pub struct QueryToolRequest {
    pub collection: Option<String>,
    pub operation: Option<String>,
    pub query: Option<Value>,
    pub sort: Option<Value>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

/// Build the executor request from the tool's wire format. For `aggregate`
/// the `query` value is reinterpreted as the pipeline (an array of stages)
/// rather than a match document.
fn build_request(body: QueryToolRequest) -> Result<QueryRequest, ApiError> {
    let collection = match body.collection {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            return Err(ApiError::Validation(
                "Collection name is required".to_string(),
            ));
        }
    };

    let operation = match body.operation.as_deref() {
        Some(op) => Operation::parse(op)?,
        None => Operation::Find,
    };

    let query = body.query.unwrap_or(Value::Object(Default::default()));

    let mut req = QueryRequest {
        collection,
        operation,
        sort: to_optional_document(body.sort)?,
        limit: Some(body.limit.unwrap_or(100)),
        skip: Some(body.skip.unwrap_or(0)),
        ..Default::default()
    };

    match operation {
        Operation::Aggregate => {
            let stages = match query {
                Value::Array(stages) => stages,
                Value::Object(map) if map.is_empty() => Vec::new(),
                _ => {
                    return Err(ApiError::MalformedInput(
                        "aggregate expects the query to be a pipeline array".to_string(),
                    ));
                }
            };
            req.pipeline = stages
                .into_iter()
                .map(|s| {
                    mongodb::bson::to_document(&s)
                        .map_err(|e| ApiError::MalformedInput(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
        }
        Operation::InsertOne => {
            req.document = Some(to_document(query)?);
        }
        _ => {
            req.filter = to_document(query)?;
        }
    }

    Ok(req)
}

fn to_document(value: Value) -> Result<Document, ApiError> {
    mongodb::bson::to_document(&value).map_err(|e| ApiError::MalformedInput(e.to_string()))
}

fn to_optional_document(value: Option<Value>) -> Result<Option<Document>, ApiError> {
    match value {
        Some(Value::Null) | None => Ok(None),
        Some(v) => to_document(v).map(Some),
    }
}

fn outcome_to_value(outcome: QueryOutcome) -> Value {
    match outcome {
        QueryOutcome::Documents(docs) => serde_json::to_value(docs).unwrap_or(Value::Null),
        QueryOutcome::MaybeDocument(doc) => serde_json::to_value(doc).unwrap_or(Value::Null),
        QueryOutcome::Count(n) => json!(n),
        QueryOutcome::Inserted { id } => {
            json!({ "insertedId": serde_json::to_value(&id).unwrap_or(Value::Null) })
        }
        QueryOutcome::Updated { matched, modified } => {
            json!({ "matchedCount": matched, "modifiedCount": modified })
        }
        QueryOutcome::Deleted { count } => json!({ "deletedCount": count }),
    }
}

// POST /api/mongodb/query — generic passthrough for the in-browser tool.
pub async fn post_query(
    State(state): State<AppState>,
    body: Result<Json<QueryToolRequest>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(e) => return tool_error(ApiError::MalformedInput(e.body_text())),
    };

    let req = match build_request(body) {
        Ok(req) => req,
        Err(e) => return tool_error(e),
    };

    let operation = req.operation.as_str();
    let collection = req.collection.clone();

    match run_query(&state, req).await {
        Ok(outcome) => {
            let result = outcome_to_value(outcome);
            let count = match &result {
                Value::Array(items) => items.len() as u64,
                _ => 1,
            };
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "operation": operation,
                    "collection": collection,
                    "result": result,
                    "count": count,
                })),
            )
                .into_response()
        }
        Err(e) => tool_error(e),
    }
}
