use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use mongodb::bson::{Bson, Document};

use crate::models::{OrderStatus, ProcessedOrder, ProcessedTransfer};

/// The ledger's native asset.
const XRP: &str = "XRP";

/// RLUSD currency code (hex form). The XRP/RLUSD pair gets a hardcoded
/// special case in the executed-price heuristic below; whether this
/// generalizes to other token pairs is an open product question, so the
/// check is preserved as-is rather than extended.
const RLUSD_HEX: &str = "524C555344000000000000000000000000000000";

// ---------------------------------------------------------------------------
// Date extraction

fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Tolerate timestamps without an offset.
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

/// Extended-JSON style wrapper: `{ "$date": <iso string | millis | datetime> }`.
fn wrapped_date(value: &Bson) -> Option<DateTime<Utc>> {
    let inner = value.as_document()?.get("$date")?;
    match inner {
        Bson::String(s) => parse_date_string(s),
        Bson::DateTime(dt) => millis_to_utc(dt.timestamp_millis()),
        Bson::Int64(ms) => millis_to_utc(*ms),
        Bson::Document(d) => {
            let ms = d.get_str("$numberLong").ok()?.parse::<i64>().ok()?;
            millis_to_utc(ms)
        }
        _ => None,
    }
}

/// Plain date value: a native BSON datetime or an ISO string.
fn plain_date(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => millis_to_utc(dt.timestamp_millis()),
        Bson::String(s) => parse_date_string(s),
        _ => None,
    }
}

/// Best-effort timestamp for a transaction document. The fallback order is
/// part of the contract: reordering changes which timestamp a transaction is
/// attributed to for the min/max date-range computation.
pub fn transaction_date(doc: &Document) -> DateTime<Utc> {
    if let Some(dt) = doc.get("created_date").and_then(wrapped_date) {
        return dt;
    }
    if let Some(dt) = doc.get("resolution_date").and_then(wrapped_date) {
        return dt;
    }
    if let Some(dt) = doc.get("created_date").and_then(plain_date) {
        return dt;
    }
    if let Some(dt) = doc.get("resolution_date").and_then(plain_date) {
        return dt;
    }
    if let Some(ts) = doc
        .get_array("trades")
        .ok()
        .and_then(|trades| trades.first())
        .and_then(|t| t.as_document())
        .and_then(|t| t.get("timestamp"))
    {
        if let Some(dt) = wrapped_date(ts).or_else(|| plain_date(ts)) {
            return dt;
        }
    }
    if let Some(dt) = doc
        .get("close_time_iso")
        .and_then(|v| v.as_str())
        .and_then(parse_date_string)
    {
        return dt;
    }
    if let Some(dt) = doc.get("createdAt").and_then(plain_date) {
        return dt;
    }

    let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
    tracing::warn!(keys = %keys.join(", "), "no valid date field found in transaction");
    Utc::now()
}

// ---------------------------------------------------------------------------
// Field coercion helpers. Shapers never fail on a malformed document; every
// missing field falls back to a typed default.

fn string_or(doc: &Document, key: &str, default: &str) -> String {
    match doc.get(key) {
        Some(Bson::String(s)) => s.clone(),
        Some(b) => display_bson(b).unwrap_or_else(|| default.to_string()),
        None => default.to_string(),
    }
}

fn display_bson(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s.clone()),
        Bson::Double(f) => Some(format!("{}", f)),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Decimal128(d) => Some(d.to_string()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        _ => None,
    }
}

fn numeric_string(doc: &Document, key: &str) -> Option<String> {
    doc.get(key).and_then(display_bson)
}

fn bson_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(f) => Some(*f),
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Executed price

struct AmountLeg {
    currency: String,
    value: Option<f64>,
}

fn amount_leg(doc: &Document, key: &str) -> Option<AmountLeg> {
    let leg = doc.get_document(key).ok()?;
    let currency = leg.get_str("currency").ok()?.to_string();
    let value = leg.get("value").and_then(bson_f64);
    Some(AmountLeg { currency, value })
}

fn safe_div(num: Option<f64>, den: Option<f64>) -> f64 {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => n / d,
        _ => 0.0,
    }
}

/// Price of a filled order from its raw `filled_gets`/`filled_pays` legs.
///
/// Exactly one native (XRP) leg: price = pays/gets. Otherwise the RLUSD
/// pair gets a hardcoded check (quote side over the other), and any
/// remaining pair falls back to the market-side guess: buy = pays/gets,
/// sell = gets/pays. Missing values or a zero denominator yield a zero
/// price, never an error.
pub fn derive_executed_price(doc: &Document) -> Option<String> {
    if doc.get_str("status") != Ok("filled") {
        return None;
    }
    let gets = amount_leg(doc, "filled_gets")?;
    let pays = amount_leg(doc, "filled_pays")?;

    let gets_native = gets.currency == XRP;
    let pays_native = pays.currency == XRP;

    let price = if gets_native != pays_native {
        safe_div(pays.value, gets.value)
    } else if pays.currency == RLUSD_HEX {
        safe_div(pays.value, gets.value)
    } else if gets.currency == RLUSD_HEX {
        safe_div(gets.value, pays.value)
    } else {
        match doc.get_str("market_side") {
            Ok("buy") => safe_div(pays.value, gets.value),
            Ok("sell") => safe_div(gets.value, pays.value),
            _ => 0.0,
        }
    };

    Some(format!("{}", price))
}

// ---------------------------------------------------------------------------
// Row shapers

fn resolution_date_string(doc: &Document) -> String {
    for key in ["resolution_date", "canceled_date", "created_date"] {
        if let Some(value) = doc.get(key) {
            if let Some(dt) = wrapped_date(value).or_else(|| plain_date(value)) {
                return dt.to_rfc3339();
            }
        }
    }
    Utc::now().to_rfc3339()
}

pub fn shape_order(doc: &Document) -> ProcessedOrder {
    let status = OrderStatus::from_raw(doc.get_str("status").unwrap_or_default());

    let pair = doc
        .get_document("trading_pair")
        .ok()
        .and_then(|p| p.get_str("id").ok())
        .unwrap_or("Unknown/Unknown")
        .to_string();

    let original_amount = numeric_string(doc, "original_amount").unwrap_or_else(|| "0".to_string());

    let executed_price = if status == OrderStatus::Filled {
        derive_executed_price(doc).or_else(|| numeric_string(doc, "executed_price"))
    } else {
        numeric_string(doc, "executed_price")
    };

    ProcessedOrder {
        order_id: string_or(doc, "hash", "Unknown"),
        account: string_or(doc, "account", "Unknown"),
        pair,
        side: doc
            .get_str("market_side")
            .unwrap_or("unknown")
            .to_uppercase(),
        original_amount: original_amount.clone(),
        price: numeric_string(doc, "price").unwrap_or_else(|| "0".to_string()),
        amount: original_amount,
        filled_amount: numeric_string(doc, "executed_amount"),
        executed_price,
        status,
        date: resolution_date_string(doc),
        fee: numeric_string(doc, "fee_xrp").unwrap_or_else(|| "0".to_string()),
        raw_data: serde_json::to_value(doc).unwrap_or(serde_json::Value::Null),
    }
}

pub fn shape_transfer(doc: &Document) -> ProcessedTransfer {
    let id = doc
        .get_object_id("_id")
        .map(|oid| oid.to_hex())
        .ok()
        .or_else(|| doc.get_str("hash").ok().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string());

    let (amount, currency) = match doc.get_document("amount") {
        Ok(leg) => (
            leg.get("value")
                .and_then(display_bson)
                .unwrap_or_else(|| "0".to_string()),
            leg.get_str("currency").unwrap_or(XRP).to_string(),
        ),
        Err(_) => ("0".to_string(), XRP.to_string()),
    };

    let timestamp = doc
        .get("timestamp")
        .and_then(|v| wrapped_date(v).or_else(|| plain_date(v)))
        .unwrap_or_else(Utc::now)
        .to_rfc3339();

    ProcessedTransfer {
        id,
        user_id: string_or(doc, "user_id", "Unknown"),
        kind: string_or(doc, "type", "Unknown"),
        amount,
        currency,
        fee: numeric_string(doc, "fee_xrp").unwrap_or_else(|| "0".to_string()),
        from_address: string_or(doc, "from_address", "Unknown"),
        to_address: string_or(doc, "to_address", "Unknown"),
        timestamp,
        hash: string_or(doc, "hash", "Unknown"),
        ledger_index: doc
            .get("ledger_index")
            .and_then(bson_f64)
            .map(|f| f as i64)
            .unwrap_or(0),
        raw_data: serde_json::to_value(doc).unwrap_or(serde_json::Value::Null),
    }
}
