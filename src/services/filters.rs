use mongodb::bson::{Document, doc};

/// Fields the upstream ingester has been observed to store a user identity
/// under. Casing of the stored value is just as inconsistent, so each field
/// is matched against the literal and the lowercased identifier. This 10-way
/// `$or` is load-bearing compatibility with existing data, not a feature.
/// An `address` alias was considered and excluded: no ingested collection
/// stores identity under it, and the tests pin the list at these five.
const IDENTITY_FIELDS: [&str; 5] = ["user_id", "userId", "id", "account", "Account"];

pub fn identity_filter(user_id: &str) -> Document {
    let lower = user_id.to_lowercase();
    let mut clauses = Vec::with_capacity(IDENTITY_FIELDS.len() * 2);
    for field in IDENTITY_FIELDS {
        clauses.push(doc! { field: user_id });
        clauses.push(doc! { field: &lower });
    }
    doc! { "$or": clauses }
}

/// Base filter shared by the miner endpoints: optional identity match plus
/// an optional trading-pair equality. `ALL` is the frontend's sentinel for
/// "no pair filter".
pub fn miner_base_filter(user_id: Option<&str>, trading_pair: Option<&str>) -> Document {
    let mut filter = match user_id {
        Some(id) if !id.trim().is_empty() => identity_filter(id),
        _ => Document::new(),
    };

    if let Some(pair) = trading_pair {
        if pair != "ALL" {
            filter.insert("trading_pair.id", pair);
        }
    }

    filter
}

/// Which order-history sources a status filter selects. Filled and Cancelled
/// orders live in separate collections, so narrowing by status is a choice
/// of collection rather than a field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSources {
    Both,
    FilledOnly,
    CanceledOnly,
}

pub fn order_sources(status: Option<&str>) -> OrderSources {
    match status {
        Some("Filled") => OrderSources::FilledOnly,
        Some("Cancelled") => OrderSources::CanceledOnly,
        _ => OrderSources::Both,
    }
}

/// Filter for the combined order-history endpoint (applies to either the
/// filled or the canceled collection).
pub fn order_history_filter(
    user_id: Option<&str>,
    trading_pair: Option<&str>,
    side: Option<&str>,
) -> Document {
    let mut filter = miner_base_filter(user_id, trading_pair);

    if let Some(side) = side {
        if !side.is_empty() {
            filter.insert("market_side", side.to_lowercase());
        }
    }

    filter
}

/// Filter for the deposits/withdrawals endpoint: identity, transfer type,
/// currency of the amount leg and an optional timestamp window.
pub fn transfers_filter(
    user_id: Option<&str>,
    kind: Option<&str>,
    currency: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> Document {
    let mut filter = match user_id {
        Some(id) if !id.trim().is_empty() => identity_filter(id),
        _ => Document::new(),
    };

    if let Some(kind) = kind {
        if !kind.is_empty() {
            filter.insert("type", kind.to_lowercase());
        }
    }

    if let Some(currency) = currency {
        if !currency.is_empty() {
            filter.insert("amount.currency", currency);
        }
    }

    let mut window = Document::new();
    if let Some(from) = from {
        if !from.is_empty() {
            window.insert("$gte", from);
        }
    }
    if let Some(to) = to {
        if !to.is_empty() {
            window.insert("$lte", to);
        }
    }
    if !window.is_empty() {
        filter.insert("timestamp", window);
    }

    filter
}
