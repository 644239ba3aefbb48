use std::net::SocketAddr;

use xrpl_miner_dashboard::{AppState, config, routes, services::db};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();
    tracing::info!(uri = %db::masked_uri(&settings.mongo_uri), "connecting to MongoDB");

    let report = db::initialize_with_retry(&settings).await;
    let mongo = match report.outcome {
        Ok(mongo) => mongo,
        Err(e) => {
            tracing::error!(attempts = report.attempts, error = %e, "could not initialize MongoDB");
            std::process::exit(1);
        }
    };

    let state = AppState {
        db: mongo,
        settings: settings.clone(),
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
