use axum::Router;
use tower_http::cors::CorsLayer;

use crate::{AppState, controllers::health_controller};

pub mod dashboard_routes;
pub mod health_routes;
pub mod miners_routes;
pub mod mongodb_routes;
pub mod transactions_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = dashboard_routes::add_routes(router);
    let router = transactions_routes::add_routes(router);
    let router = miners_routes::add_routes(router);
    let router = mongodb_routes::add_routes(router);
    let router = health_routes::add_routes(router);

    router
        .fallback(health_controller::not_found)
        // The dashboard frontend is served from its own origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
