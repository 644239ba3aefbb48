use axum::{
    Json,
    extract::{Query, State},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use mongodb::bson::{Bson, Document, doc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::services::pagination::{page_window, paginate};
use crate::services::query::{Operation, QueryOutcome, QueryRequest, run_query};
use crate::services::shape::transaction_date;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

// GET /api/transactions
pub async fn get_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let (page, limit, _skip) = page_window(params.page, params.limit, state.settings.default_limit);

    let (docs, pagination) = paginate(
        &state,
        "transactions",
        Document::new(),
        doc! { "createdAt": -1 },
        page,
        limit,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "data": docs,
        "pagination": pagination,
    })))
}

// POST /api/transactions
pub async fn post_transaction(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::MalformedInput(e.body_text()))?;

    let has = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    };
    if !has("txid") || !has("account") {
        return Err(ApiError::Validation(
            "Missing required fields: txid and account are required".to_string(),
        ));
    }

    let txid = body["txid"].as_str().unwrap_or_default().to_string();

    // Idempotence by txid: a duplicate insert is a conflict, not a second row.
    let existing = run_query(
        &state,
        QueryRequest {
            collection: "transactions".to_string(),
            operation: Operation::FindOne,
            filter: doc! { "txid": &txid },
            ..Default::default()
        },
    )
    .await?;
    if matches!(existing, QueryOutcome::MaybeDocument(Some(_))) {
        return Err(ApiError::Conflict(
            "Transaction with this txid already exists".to_string(),
        ));
    }

    let mut transaction = mongodb::bson::to_document(&body)
        .map_err(|e| ApiError::MalformedInput(e.to_string()))?;
    let now = Bson::DateTime(mongodb::bson::DateTime::now());
    transaction.insert("createdAt", now.clone());
    transaction.insert("updatedAt", now);

    let inserted = run_query(
        &state,
        QueryRequest {
            collection: "transactions".to_string(),
            operation: Operation::InsertOne,
            document: Some(transaction.clone()),
            ..Default::default()
        },
    )
    .await?;

    if let QueryOutcome::Inserted { id } = inserted {
        transaction.insert("_id", id);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": transaction })),
    ))
}

// GET /api/transactions/date-range
pub async fn get_date_range(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let counted = run_query(
        &state,
        QueryRequest {
            collection: "transactions".to_string(),
            operation: Operation::Count,
            ..Default::default()
        },
    )
    .await?;
    let transaction_count = match counted {
        QueryOutcome::Count(n) => n,
        _ => 0,
    };

    // A handful of documents from each end of the created_date ordering is
    // enough to pin the range without scanning the whole collection.
    let edge = |direction: i32| {
        run_query(
            &state,
            QueryRequest {
                collection: "transactions".to_string(),
                operation: Operation::Find,
                sort: Some(doc! { "created_date": direction }),
                limit: Some(10),
                ..Default::default()
            },
        )
    };

    let oldest = match edge(1).await? {
        QueryOutcome::Documents(docs) => docs,
        _ => Vec::new(),
    };
    let newest = match edge(-1).await? {
        QueryOutcome::Documents(docs) => docs,
        _ => Vec::new(),
    };

    let mut min_date = Utc::now();
    let mut max_date = Utc::now();
    let dates: Vec<_> = oldest
        .iter()
        .chain(newest.iter())
        .map(transaction_date)
        .collect();
    if !dates.is_empty() {
        min_date = dates.iter().min().copied().unwrap_or(min_date);
        max_date = dates.iter().max().copied().unwrap_or(max_date);
    } else {
        tracing::info!("no transactions found, using current date for range");
    }

    Ok(Json(json!({
        "success": true,
        "minDate": min_date.to_rfc3339(),
        "maxDate": max_date.to_rfc3339(),
        "transactionCount": transaction_count,
    })))
}
