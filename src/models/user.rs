use serde::{Deserialize, Serialize};

/// Miner/user record written by the external ingester. Read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub wallets: Vec<String>,
}
