use serde::Serialize;

/// Deposit or withdrawal row as the frontend consumes it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTransfer {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub fee: String,
    pub from_address: String,
    pub to_address: String,
    pub timestamp: String,
    pub hash: String,
    pub ledger_index: i64,
    pub raw_data: serde_json::Value,
}
