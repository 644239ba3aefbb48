use std::collections::BTreeMap;

use serde::Serialize;

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub user_count: usize,
    pub wallet_count: usize,
    pub transaction_count: usize,
    pub total_volume: f64,
    pub asset_volumes: BTreeMap<String, f64>,
}
