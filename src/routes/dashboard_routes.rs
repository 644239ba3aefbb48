use axum::{Router, routing::get};

use crate::{AppState, controllers::dashboard_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/api/dashboard/stats", get(dashboard_controller::get_stats))
}
