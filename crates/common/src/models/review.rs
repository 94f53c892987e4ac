use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which backend collection the desk is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Pending,
    Active,
    All,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "all" => Ok(Self::All),
            other => Err(format!(
                "unknown filter {other:?}, expected pending, active or all"
            )),
        }
    }
}

/// Body of an approve/reject call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<bool>,
}

impl ActionPayload {
    /// Blank reasons are dropped so the backend never records an empty note.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            None
        } else {
            Some(reason)
        };
        Self {
            reason,
            execute: None,
        }
    }

    pub fn executing(mut self, execute: bool) -> Self {
        self.execute = Some(execute);
        self
    }
}

/// Optional query filters for `GET /signals`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

/// Acknowledgement of an approve/reject. The shape differs per endpoint, so
/// only the common fields are typed and the rest is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub binance_order_id: Option<Value>,
    #[serde(default)]
    pub position_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
