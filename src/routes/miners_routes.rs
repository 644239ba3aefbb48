use axum::{Router, routing::get};

use crate::{AppState, controllers::miners_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/miners/orders", get(miners_controller::get_orders))
        .route(
            "/api/miners/open-orders",
            get(miners_controller::get_open_orders),
        )
        .route(
            "/api/miners/deposits-withdrawals",
            get(miners_controller::get_transfers),
        )
}
