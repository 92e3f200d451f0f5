//! Wire shapes returned by the cache service.
//!
//! The service serializes maps keyed by stripe id as JSON objects, so ids
//! arrive as strings. Absent or `null` maps and arrays decode as empty.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub type StripeId = u32;

/// TTL marker used by the service for keys without expiry.
pub const NO_EXPIRY: i64 = -1;

/// `(namespace, key)` identity of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyRef {
    pub namespace: String,
    pub key: String,
}

impl KeyRef {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for KeyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub namespace: String,
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default = "no_expiry")]
    pub ttl: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expired: bool,
}

impl KeyRecord {
    pub fn key_ref(&self) -> KeyRef {
        KeyRef::new(self.namespace.clone(), self.key.clone())
    }
}

/// `GET /api/cache/state`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default, deserialize_with = "stripe_map")]
    pub keys: BTreeMap<String, Vec<KeyRecord>>,
    #[serde(default, deserialize_with = "stripe_map")]
    pub lru: BTreeMap<String, Vec<KeyRef>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: u64,
}

/// One `{statistic, value}` sample of an actuator meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(default)]
    pub statistic: String,
    pub value: f64,
}

/// `GET /actuator/metrics/{name}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "baseUnit")]
    pub base_unit: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationData {
    #[serde(default)]
    pub val: Option<String>,
}

/// Body of set/get/del responses. `del` omits `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    #[serde(default)]
    pub hit: bool,
    #[serde(default)]
    pub miss: bool,
    #[serde(default)]
    pub data: Option<OperationData>,
}

impl OperationResponse {
    pub fn value(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.val.as_deref())
    }
}

/// `POST /api/cache/set` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRequest {
    pub namespace: String,
    pub key: String,
    pub value: String,
    pub ttl: i64,
}

/// Error body the service returns with 4xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    #[serde(default)]
    pub message: String,
}

fn no_expiry() -> i64 {
    NO_EXPIRY
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn stripe_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw = Option::<BTreeMap<String, Option<Vec<T>>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(id, items)| (id, items.unwrap_or_default()))
        .collect())
}
