use std::time::Duration;

use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::options::{FindOneOptions, FindOptions};

use crate::AppState;
use crate::error::ApiError;

/// Supported query executor verbs. Wire spelling matches the in-browser
/// query tool ("find", "findOne", "count", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Find,
    FindOne,
    Count,
    Aggregate,
    InsertOne,
    UpdateOne,
    DeleteOne,
}

impl Operation {
    pub fn parse(s: &str) -> Result<Operation, ApiError> {
        match s {
            "find" => Ok(Operation::Find),
            "findOne" => Ok(Operation::FindOne),
            "count" => Ok(Operation::Count),
            "aggregate" => Ok(Operation::Aggregate),
            "insertOne" => Ok(Operation::InsertOne),
            "updateOne" => Ok(Operation::UpdateOne),
            "deleteOne" => Ok(Operation::DeleteOne),
            other => Err(ApiError::UnsupportedOperation(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Find => "find",
            Operation::FindOne => "findOne",
            Operation::Count => "count",
            Operation::Aggregate => "aggregate",
            Operation::InsertOne => "insertOne",
            Operation::UpdateOne => "updateOne",
            Operation::DeleteOne => "deleteOne",
        }
    }
}

/// Declarative request executed against the resolved database. `filter` is
/// the match document for find/findOne/count/updateOne/deleteOne; aggregate
/// reads `pipeline` instead.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub collection: String,
    pub operation: Operation,
    pub filter: Document,
    pub pipeline: Vec<Document>,
    pub sort: Option<Document>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
    pub projection: Option<Document>,
    pub document: Option<Document>,
    pub update: Option<Document>,
}

#[derive(Debug)]
pub enum QueryOutcome {
    Documents(Vec<Document>),
    MaybeDocument(Option<Document>),
    Count(u64),
    Inserted { id: Bson },
    Updated { matched: u64, modified: u64 },
    Deleted { count: u64 },
}

impl QueryOutcome {
    /// Number of rows this outcome represents, for logging and the query
    /// tool's `count` field.
    pub fn size(&self) -> u64 {
        match self {
            QueryOutcome::Documents(docs) => docs.len() as u64,
            QueryOutcome::MaybeDocument(d) => d.is_some() as u64,
            QueryOutcome::Count(n) => *n,
            QueryOutcome::Inserted { .. } => 1,
            QueryOutcome::Updated { modified, .. } => *modified,
            QueryOutcome::Deleted { count } => *count,
        }
    }
}

/// Run a query with the per-request timeout from settings. A slow database
/// fails the request fast instead of hanging it.
pub async fn run_query(state: &AppState, req: QueryRequest) -> Result<QueryOutcome, ApiError> {
    let budget = Duration::from_secs(state.settings.request_timeout_secs);
    let collection = req.collection.clone();
    let operation = req.operation;

    match tokio::time::timeout(budget, execute(state, req)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(ApiError::ConnectionTimeout(format!(
            "{} on {} exceeded {}s",
            operation.as_str(),
            collection,
            state.settings.request_timeout_secs
        ))),
    }
}

async fn execute(state: &AppState, req: QueryRequest) -> Result<QueryOutcome, ApiError> {
    let col = state.db.db.collection::<Document>(&req.collection);
    let context = format!("{}.{}", req.collection, req.operation.as_str());

    let outcome = match req.operation {
        Operation::Find => {
            let options = FindOptions::builder()
                .sort(req.sort)
                .skip(req.skip)
                .limit(req.limit)
                .projection(req.projection)
                .build();
            let cursor = col
                .find(req.filter, options)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            let docs: Vec<Document> = cursor
                .try_collect()
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::Documents(docs)
        }
        Operation::FindOne => {
            let options = FindOneOptions::builder()
                .sort(req.sort)
                .projection(req.projection)
                .build();
            let doc = col
                .find_one(req.filter, options)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::MaybeDocument(doc)
        }
        Operation::Count => {
            let count = col
                .count_documents(req.filter, None)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::Count(count)
        }
        Operation::Aggregate => {
            let cursor = col
                .aggregate(req.pipeline, None)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            let docs: Vec<Document> = cursor
                .try_collect()
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::Documents(docs)
        }
        Operation::InsertOne => {
            let doc = req.document.unwrap_or_default();
            let result = col
                .insert_one(doc, None)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::Inserted {
                id: result.inserted_id,
            }
        }
        Operation::UpdateOne => {
            let update = req
                .update
                .unwrap_or_else(|| mongodb::bson::doc! { "$set": {} });
            let result = col
                .update_one(req.filter, update, None)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::Updated {
                matched: result.matched_count,
                modified: result.modified_count,
            }
        }
        Operation::DeleteOne => {
            let result = col
                .delete_one(req.filter, None)
                .await
                .map_err(|e| ApiError::database(&context, e))?;
            QueryOutcome::Deleted {
                count: result.deleted_count,
            }
        }
    };

    tracing::info!(
        collection = %req.collection,
        operation = %req.operation.as_str(),
        size = outcome.size(),
        "query executed"
    );

    Ok(outcome)
}
