use axum::{
    Router,
    http::{Request, StatusCode, header},
    routing::post,
};
use http_body_util::BodyExt;
use mongodb::Client;
use serde_json::Value;
use tower::ServiceExt;
use xrpl_miner_dashboard::{
    AppState, config,
    controllers::{mongodb_controller, transactions_controller},
    routes,
    services::db::Mongo,
};

// The client is lazy: no connection is made until a query runs, and the
// handlers under test all reject the request before touching the database.
async fn test_state() -> AppState {
    let settings = config::load();

    let client = Client::with_uri_str(&settings.mongo_uri)
        .await
        .expect("mongodb client");
    let db = Mongo::with_database(client, &settings.mongo_db);

    AppState { db, settings }
}

async fn response_body_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

fn json_request(uri: &str, body: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn post_transaction_without_required_fields_is_rejected() {
    let state = test_state().await;
    let app = Router::new()
        .route(
            "/api/transactions",
            post(transactions_controller::post_transaction),
        )
        .with_state(state);

    let res = app
        .oneshot(json_request("/api/transactions", r#"{"txid": "ABC"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Missing required fields: txid and account are required"
    );
}

#[tokio::test]
async fn post_transaction_with_blank_fields_is_rejected() {
    let state = test_state().await;
    let app = Router::new()
        .route(
            "/api/transactions",
            post(transactions_controller::post_transaction),
        )
        .with_state(state);

    let res = app
        .oneshot(json_request(
            "/api/transactions",
            r#"{"txid": "  ", "account": "rAccount"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_transaction_with_malformed_json_is_a_bad_request() {
    let state = test_state().await;
    let app = Router::new()
        .route(
            "/api/transactions",
            post(transactions_controller::post_transaction),
        )
        .with_state(state);

    let res = app
        .oneshot(json_request("/api/transactions", "{not json"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_json(res).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn query_tool_requires_a_collection() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/mongodb/query", post(mongodb_controller::post_query))
        .with_state(state);

    let res = app
        .oneshot(json_request("/api/mongodb/query", r#"{"operation": "find"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_json(res).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Collection name is required");
}

#[tokio::test]
async fn query_tool_rejects_unknown_operations() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/mongodb/query", post(mongodb_controller::post_query))
        .with_state(state);

    let res = app
        .oneshot(json_request(
            "/api/mongodb/query",
            r#"{"collection": "transactions", "operation": "dropDatabase"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response_body_json(res).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"], "Unsupported operation: dropDatabase");
}

#[tokio::test]
async fn aggregate_rejects_a_non_array_query() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/mongodb/query", post(mongodb_controller::post_query))
        .with_state(state);

    let res = app
        .oneshot(json_request(
            "/api/mongodb/query",
            r#"{"collection": "trades", "operation": "aggregate", "query": {"$match": {}}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_json(res).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn unknown_paths_get_a_json_404() {
    let state = test_state().await;
    let app = routes::app(state);

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body = response_body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
}
