use axum::{
    Json,
    extract::{Query, State},
};
use mongodb::bson::{Document, doc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::AppState;
use crate::error::ApiError;
use crate::models::ProcessedOrder;
use crate::services::filters::{
    OrderSources, miner_base_filter, order_history_filter, order_sources, transfers_filter,
};
use crate::services::pagination::{Pagination, page_window, paginate};
use crate::services::query::{Operation, QueryOutcome, QueryRequest, run_query};
use crate::services::shape::{shape_order, shape_transfer};

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "tradingPair")]
    pub trading_pair: Option<String>,
    pub side: Option<String>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

async fn order_page(
    state: &AppState,
    collection: &str,
    filter: Document,
    sort: Document,
    skip: u64,
    limit: i64,
) -> Result<(Vec<ProcessedOrder>, u64), ApiError> {
    let found = run_query(
        state,
        QueryRequest {
            collection: collection.to_string(),
            operation: Operation::Find,
            filter: filter.clone(),
            sort: Some(sort),
            limit: Some(limit),
            skip: Some(skip),
            ..Default::default()
        },
    )
    .await?;
    let counted = run_query(
        state,
        QueryRequest {
            collection: collection.to_string(),
            operation: Operation::Count,
            filter,
            ..Default::default()
        },
    )
    .await?;

    let orders = match found {
        QueryOutcome::Documents(docs) => docs.iter().map(shape_order).collect(),
        _ => Vec::new(),
    };
    let total = match counted {
        QueryOutcome::Count(n) => n,
        _ => 0,
    };
    Ok((orders, total))
}

// GET /api/miners/orders — combined filled + canceled order history.
pub async fn get_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersQuery>,
) -> Result<Json<Value>, ApiError> {
    let (page, limit, skip) = page_window(params.page, params.limit, state.settings.default_limit);

    let filter = order_history_filter(
        params.user_id.as_deref(),
        params.trading_pair.as_deref(),
        params.side.as_deref(),
    );
    let sources = order_sources(params.status.as_deref());

    let (mut orders, mut total_count) = (Vec::new(), 0u64);

    if sources != OrderSources::CanceledOnly {
        let (filled, filled_total) = order_page(
            &state,
            "filled_orders",
            filter.clone(),
            doc! { "resolution_date": -1 },
            skip,
            limit,
        )
        .await?;
        orders.extend(filled);
        total_count += filled_total;
    }

    if sources != OrderSources::FilledOnly {
        let (canceled, canceled_total) = order_page(
            &state,
            "canceled_orders",
            filter,
            doc! { "canceled_date": -1 },
            skip,
            limit,
        )
        .await?;
        orders.extend(canceled);
        total_count += canceled_total;
    }

    // Merge the two sources newest-first and cap at the page size. RFC 3339
    // timestamps in UTC compare correctly as strings.
    orders.sort_by(|a, b| b.date.cmp(&a.date));
    orders.truncate(limit as usize);

    let pagination = Pagination::new(page, limit, total_count);
    tracing::info!(
        returned = orders.len(),
        page,
        total_pages = pagination.total_pages,
        "order history retrieved"
    );

    Ok(Json(json!({
        "success": true,
        "data": orders,
        "pagination": pagination,
    })))
}

#[derive(Debug, Deserialize)]
pub struct OpenOrdersQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "tradingPair")]
    pub trading_pair: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

// GET /api/miners/open-orders
pub async fn get_open_orders(
    State(state): State<AppState>,
    Query(params): Query<OpenOrdersQuery>,
) -> Result<Json<Value>, ApiError> {
    // Open-order tables default to a short page.
    let (page, limit, _skip) = page_window(params.page, params.limit, 15);

    let filter = miner_base_filter(params.user_id.as_deref(), params.trading_pair.as_deref());
    let (docs, pagination) = paginate(
        &state,
        "open_orders",
        filter,
        doc! { "created_date": -1 },
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

#[derive(Debug, Deserialize)]
pub struct TransfersQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

// GET /api/miners/deposits-withdrawals
pub async fn get_transfers(
    State(state): State<AppState>,
    Query(params): Query<TransfersQuery>,
) -> Result<Json<Value>, ApiError> {
    let (page, limit, _skip) = page_window(params.page, params.limit, state.settings.default_limit);

    let filter = transfers_filter(
        params.user_id.as_deref(),
        params.kind.as_deref(),
        params.currency.as_deref(),
        params.from.as_deref(),
        params.to.as_deref(),
    );

    let (docs, pagination) = paginate(
        &state,
        "deposits_withdrawals",
        filter,
        doc! { "timestamp": -1 },
        page,
        limit,
    )
    .await?;

    let transfers: Vec<_> = docs.iter().map(shape_transfer).collect();

    Ok(Json(json!({
        "success": true,
        "data": transfers,
        "pagination": pagination,
    })))
}
