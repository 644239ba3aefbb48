pub mod dashboard_controller;
pub mod health_controller;
pub mod miners_controller;
pub mod mongodb_controller;
pub mod transactions_controller;
