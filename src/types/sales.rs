//! Sales domain records as delivered by the backend API

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Order lifecycle status.
///
/// Unknown literals are preserved verbatim in `Other` so they are still
/// counted by status aggregations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Completed,
    Pending,
    Partial,
    Cancelled,
    Processing,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Pending => "PENDING",
            Self::Partial => "PARTIAL",
            Self::Cancelled => "CANCELLED",
            Self::Processing => "PROCESSING",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" => Self::Completed,
            "PENDING" => Self::Pending,
            "PARTIAL" => Self::Partial,
            "CANCELLED" => Self::Cancelled,
            "PROCESSING" => Self::Processing,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vehicle sale. Read-only snapshot from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// None for manufacturer-to-dealer transfers (not a customer sale)
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub dealer_id: Option<i64>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn has_customer(&self) -> bool {
        self.customer_id.is_some()
    }
}

/// Who owes a debt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtOwner {
    Customer(i64),
    Dealer(i64),
    Unassigned,
}

/// Customer or dealer debt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    pub id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub dealer_id: Option<i64>,
    #[serde(
        default,
        alias = "amountDue",
        alias = "totalAmount",
        deserialize_with = "lenient_amount"
    )]
    pub due_amount: f64,
    #[serde(default, alias = "amountPaid", deserialize_with = "lenient_amount")]
    pub paid_amount: f64,
    /// Trusted over `due - paid` when the backend sends it
    #[serde(default, deserialize_with = "lenient_opt_amount")]
    pub remaining_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl DebtRecord {
    pub fn owner(&self) -> DebtOwner {
        match (self.customer_id, self.dealer_id) {
            (Some(id), _) => DebtOwner::Customer(id),
            (None, Some(id)) => DebtOwner::Dealer(id),
            (None, None) => DebtOwner::Unassigned,
        }
    }

    /// Remaining balance. Negative values (overpayment) are kept as-is.
    pub fn remaining(&self) -> f64 {
        self.remaining_amount
            .unwrap_or(self.due_amount - self.paid_amount)
    }

    pub fn is_overdue(&self, as_of: DateTime<Utc>) -> bool {
        self.remaining() > 0.0 && self.due_date.is_some_and(|due| due < as_of)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dealer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sales_count: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
}

/// Dealer request for vehicles from the manufacturer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    pub id: i64,
    #[serde(default)]
    pub dealer_id: Option<i64>,
    pub status: String,
    #[serde(default, deserialize_with = "lenient_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Per-dealer sales totals, the input for dealer rankings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DealerSales {
    #[serde(default)]
    pub dealer_id: Option<i64>,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub order_count: u64,
}

/// Coerce a JSON value to a finite amount; anything non-numeric becomes 0.0
pub fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

fn lenient_opt_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(coerce_amount(&v)),
    })
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value).max(0.0) as u64)
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and
/// bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

fn lenient_opt_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Epoch numbers and other non-string shapes are treated as absent
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => parse_timestamp(&raw),
        _ => None,
    })
}
