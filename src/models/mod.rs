pub mod order;
pub mod stats;
pub mod transfer;
pub mod user;

pub use order::{OrderStatus, ProcessedOrder};
pub use stats::DashboardStats;
pub use transfer::ProcessedTransfer;
pub use user::User;
