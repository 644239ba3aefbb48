use axum::{Router, routing::get};

use crate::{AppState, controllers::health_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/health", get(health_controller::get_health))
}
