use serde::Serialize;

/// Lifecycle state of an exchange order. The upstream store keeps each state
/// in its own collection (`open_orders`, `filled_orders`, `canceled_orders`);
/// application code works with this one sum type and lets the read layer
/// decide which collections to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn from_raw(raw: &str) -> OrderStatus {
        match raw {
            "filled" => OrderStatus::Filled,
            "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "Open",
            OrderStatus::Filled => "Filled",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// Order row as the frontend tables consume it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedOrder {
    pub order_id: String,
    pub account: String,
    pub pair: String,
    pub side: String,
    pub original_amount: String,
    pub price: String,
    pub amount: String,
    pub filled_amount: Option<String>,
    pub executed_price: Option<String>,
    pub status: OrderStatus,
    pub date: String,
    pub fee: String,
    pub raw_data: serde_json::Value,
}
