use axum::{Router, routing::get};

use crate::{AppState, controllers::transactions_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/transactions",
            get(transactions_controller::get_transactions)
                .post(transactions_controller::post_transaction),
        )
        .route(
            "/api/transactions/date-range",
            get(transactions_controller::get_date_range),
        )
}
