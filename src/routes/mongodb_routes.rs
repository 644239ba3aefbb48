use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, controllers::mongodb_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/mongodb/collections",
            get(mongodb_controller::get_collections),
        )
        .route("/api/mongodb/query", post(mongodb_controller::post_query))
}
