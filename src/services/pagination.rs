use mongodb::bson::Document;
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::services::query::{Operation, QueryOutcome, QueryRequest, run_query};

/// Pagination envelope returned next to every paged `data` array.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: i64,
    pub total_pages: u64,
    pub total_count: u64,
}

impl Pagination {
    /// `total_pages = ceil(total_count / limit)` with the limit floored at 1
    /// so an absurd page size cannot divide by zero.
    pub fn new(page: u64, limit: i64, total_count: u64) -> Pagination {
        let per_page = limit.max(1) as u64;
        Pagination {
            page,
            limit,
            total_pages: total_count.div_ceil(per_page),
            total_count,
        }
    }
}

/// Page/limit query parameters with the 1-based page floor applied.
pub fn page_window(page: Option<u64>, limit: Option<i64>, default_limit: i64) -> (u64, i64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).max(1);
    let skip = (page - 1) * limit as u64;
    (page, limit, skip)
}

/// Fetch one page plus the total count for a filter. Two separate queries,
/// not a snapshot: the count and the page can disagree under concurrent
/// writes, which is acceptable for an analytics dashboard. A page past the
/// end returns an empty list with correct counts.
pub async fn paginate(
    state: &AppState,
    collection: &str,
    filter: Document,
    sort: Document,
    page: u64,
    limit: i64,
) -> Result<(Vec<Document>, Pagination), ApiError> {
    let skip = (page.max(1) - 1) * limit.max(1) as u64;

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

    let docs = match found {
        QueryOutcome::Documents(docs) => docs,
        _ => Vec::new(),
    };
    let total_count = match counted {
        QueryOutcome::Count(n) => n,
        _ => 0,
    };

    Ok((docs, Pagination::new(page, limit, total_count)))
}
