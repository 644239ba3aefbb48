//! End-to-end tests against a running MongoDB. They are skipped unless
//! `MONGO_TEST_URI` points at a deployment, e.g.
//!
//!     MONGO_TEST_URI=mongodb://localhost:27017 cargo test

use axum::{
    Router,
    http::{Request, StatusCode, header},
    routing::post,
};
use http_body_util::BodyExt;
use mongodb::Client;
use mongodb::bson::doc;
use serde_json::Value;
use tower::ServiceExt;
use xrpl_miner_dashboard::{
    AppState, config,
    controllers::transactions_controller,
    services::db::Mongo,
    services::query::{Operation, QueryOutcome, QueryRequest, run_query},
};

const TEST_DB: &str = "xrpl_dashboard_tests";

async fn live_state() -> Option<AppState> {
    let uri = std::env::var("MONGO_TEST_URI").ok()?;

    let client = Client::with_uri_str(&uri).await.expect("mongodb client");
    let mut settings = config::load();
    settings.mongo_uri = uri;
    settings.mongo_db = TEST_DB.to_string();

    Some(AppState {
        db: Mongo::with_database(client, TEST_DB),
        settings,
    })
}

fn unique_txid(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

async fn delete_by_txid(state: &AppState, collection: &str, txid: &str) {
    run_query(
        state,
        QueryRequest {
            collection: collection.to_string(),
            operation: Operation::DeleteOne,
            filter: doc! { "txid": txid },
            ..Default::default()
        },
    )
    .await
    .expect("cleanup");
}

#[tokio::test]
async fn executor_insert_then_find_one_round_trips() {
    let Some(state) = live_state().await else {
        return;
    };
    let txid = unique_txid("round-trip");

    let inserted = run_query(
        &state,
        QueryRequest {
            collection: "executor_checks".to_string(),
            operation: Operation::InsertOne,
            document: Some(doc! { "txid": &txid, "amount": "5" }),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(matches!(inserted, QueryOutcome::Inserted { .. }));

    let found = run_query(
        &state,
        QueryRequest {
            collection: "executor_checks".to_string(),
            operation: Operation::FindOne,
            filter: doc! { "txid": &txid },
            ..Default::default()
        },
    )
    .await
    .unwrap();
    match found {
        QueryOutcome::MaybeDocument(Some(doc)) => {
            assert_eq!(doc.get_str("txid"), Ok(txid.as_str()));
            assert_eq!(doc.get_str("amount"), Ok("5"));
        }
        other => panic!("expected the inserted document back, got {other:?}"),
    }

    delete_by_txid(&state, "executor_checks", &txid).await;
}

#[tokio::test]
async fn duplicate_txid_conflicts_without_a_second_row() {
    let Some(state) = live_state().await else {
        return;
    };
    let txid = unique_txid("conflict");

    let app = Router::new()
        .route(
            "/api/transactions",
            post(transactions_controller::post_transaction),
        )
        .with_state(state.clone());

    let request = |txid: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/transactions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(format!(
                r#"{{"txid": "{txid}", "account": "rTester"}}"#
            )))
            .unwrap()
    };

    let res = app.clone().oneshot(request(&txid)).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.oneshot(request(&txid)).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Transaction with this txid already exists");

    let counted = run_query(
        &state,
        QueryRequest {
            collection: "transactions".to_string(),
            operation: Operation::Count,
            filter: doc! { "txid": &txid },
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(matches!(counted, QueryOutcome::Count(1)));

    delete_by_txid(&state, "transactions", &txid).await;
}
