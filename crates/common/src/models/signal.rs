use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub i64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SignalId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Review status of a signal. Statuses the desk does not model
/// (`executed`, `expired`, ...) are carried as `Other` and only displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalStatus {
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl SignalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Other(label) => label,
        }
    }

    /// Approve/reject is only offered while a signal is pending.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl From<String> for SignalStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Other(value),
        }
    }
}

impl From<SignalStatus> for String {
    fn from(value: SignalStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Side {
    Buy,
    Sell,
    Other(String),
}

impl Side {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for Side {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "BUY" | "LONG" => Self::Buy,
            "SELL" | "SHORT" => Self::Sell,
            _ => Self::Other(value),
        }
    }
}

impl From<Side> for String {
    fn from(value: Side) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub symbol: String,
    pub side: Side,
    pub entry: f64,
    pub sl: f64,
    #[serde(default)]
    pub tp: Option<f64>,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub ttl_sec: Option<i64>,
    pub status: SignalStatus,
    #[serde(default, deserialize_with = "deserialize_backend_time")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_backend_time")]
    pub ts: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ctx_json: Option<String>,
}

impl Signal {
    pub fn displayed_time(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.ts)
    }

    /// Parsed context payload. Text that is not JSON comes back as a string value.
    pub fn context(&self) -> Option<Value> {
        let raw = self.ctx_json.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
    }
}

/// The backend emits naive ISO timestamps; anything without an offset is UTC.
fn deserialize_backend_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}
