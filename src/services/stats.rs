use std::collections::HashSet;

use mongodb::bson::Document;

use crate::AppState;
use crate::error::ApiError;
use crate::models::{DashboardStats, User};
use crate::services::filters::identity_filter;
use crate::services::query::{Operation, QueryOutcome, QueryRequest, run_query};

async fn fetch_docs(
    state: &AppState,
    collection: &str,
    filter: Document,
    limit: Option<i64>,
) -> Result<Vec<Document>, ApiError> {
    let outcome = run_query(
        state,
        QueryRequest {
            collection: collection.to_string(),
            operation: Operation::Find,
            filter,
            limit,
            ..Default::default()
        },
    )
    .await?;

    Ok(match outcome {
        QueryOutcome::Documents(docs) => docs,
        _ => Vec::new(),
    })
}

/// Headline dashboard numbers. With a user id the counts narrow to that
/// miner via identity alias resolution; without one they cover the whole
/// program.
pub async fn dashboard_stats(
    state: &AppState,
    user_id: Option<&str>,
) -> Result<DashboardStats, ApiError> {
    let scoped = |base: Document| -> Document {
        match user_id {
            Some(id) if !id.trim().is_empty() => {
                let mut f = identity_filter(id);
                f.extend(base);
                f
            }
            _ => base,
        }
    };

    let users = fetch_docs(state, "users", scoped(Document::new()), None).await?;
    let user_count = users.len();

    let mut wallets: HashSet<String> = HashSet::new();
    for doc in &users {
        let user: User = mongodb::bson::from_document(doc.clone()).unwrap_or_default();
        wallets.extend(user.wallets);
    }
    let wallet_count = wallets.len();

    let transactions = fetch_docs(
        state,
        "transactions",
        scoped(Document::new()),
        Some(state.settings.default_limit),
    )
    .await?;
    let transaction_count = transactions.len();

    let trades = fetch_docs(
        state,
        "trades",
        scoped(Document::new()),
        Some(state.settings.default_limit),
    )
    .await?;

    let mut stats = DashboardStats {
        user_count,
        wallet_count,
        transaction_count,
        ..Default::default()
    };

    for trade in &trades {
        let gets = trade.get_document("TakerGets").ok();
        let pays = trade.get_document("TakerPays").ok();

        let leg_value = |leg: Option<&Document>| -> Option<f64> {
            leg.and_then(|l| l.get_str("value").ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
        };
        fn leg_currency(leg: Option<&Document>) -> Option<&str> {
            leg.and_then(|l| l.get_str("currency").ok())
        }

        // Total volume prefers the TakerGets leg, mirroring the ingested
        // trade shape.
        if let Some(v) = leg_value(gets) {
            stats.total_volume += v;
        } else if let Some(v) = leg_value(pays) {
            stats.total_volume += v;
        }

        let asset = leg_currency(gets)
            .or_else(|| leg_currency(pays))
            .unwrap_or("Unknown")
            .to_string();

        let mut added = 0.0;
        if leg_currency(gets) == Some(asset.as_str()) {
            if let Some(v) = leg_value(gets) {
                added += v;
            }
        } else if leg_currency(pays) == Some(asset.as_str()) {
            if let Some(v) = leg_value(pays) {
                added += v;
            }
        }
        *stats.asset_volumes.entry(asset).or_insert(0.0) += added;
    }

    tracing::info!(
        users = user_count,
        wallets = wallet_count,
        transactions = transaction_count,
        volume = stats.total_volume,
        "dashboard stats computed"
    );

    Ok(stats)
}
