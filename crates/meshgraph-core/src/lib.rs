use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One mesh-state document as exported by the gateway.
///
/// Every field decodes leniently: a field with the wrong shape falls back to
/// its default instead of rejecting the whole snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshState {
    #[serde(deserialize_with = "lenient")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient")]
    pub gateway: GatewayInfo,
    #[serde(deserialize_with = "lenient_nodes")]
    pub nodes: BTreeMap<String, NodeReport>,
    #[serde(deserialize_with = "lenient")]
    pub relay_nodes: u32,
    #[serde(deserialize_with = "lenient")]
    pub sensing_node_count: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub topology: Topology,
    #[serde(deserialize_with = "lenient")]
    pub power_manager: Option<PowerManager>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayInfo {
    pub connected: bool,
    pub device_name: Option<String>,
    pub device_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeReport {
    #[serde(deserialize_with = "lenient")]
    pub role: String,
    #[serde(deserialize_with = "lenient")]
    pub duty: f64,
    #[serde(deserialize_with = "lenient")]
    pub voltage: f64,
    #[serde(deserialize_with = "lenient")]
    pub current: f64, // mA
    #[serde(deserialize_with = "lenient")]
    pub power: f64, // mW
    #[serde(deserialize_with = "lenient_responsive")]
    pub responsive: bool,
    #[serde(deserialize_with = "lenient")]
    pub last_seen: f64, // unix seconds
    #[serde(deserialize_with = "lenient")]
    pub commanded_duty: f64,
    #[serde(deserialize_with = "lenient")]
    pub target_duty: f64,
}

impl Default for NodeReport {
    fn default() -> Self {
        Self {
            role: "sensing".to_string(),
            duty: 0.0,
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            responsive: true,
            last_seen: 0.0,
            commanded_duty: 0.0,
            target_duty: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Topology {
    pub node_roles: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
    #[default]
    Direct,
    Relayed,
}

impl NodeRole {
    /// Anything other than "relayed" routes directly.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("relayed") {
            Self::Relayed
        } else {
            Self::Direct
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Relayed => "relayed",
        }
    }
}

impl Topology {
    pub fn role_of(&self, node: &str) -> NodeRole {
        self.node_roles
            .get(node)
            .map(|r| NodeRole::parse(r))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PowerManager {
    pub active: bool,
    pub threshold_mw: f64,
    pub budget_mw: f64,
    pub priority_node: Option<String>,
    pub total_power_mw: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot root must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

impl MeshState {
    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let v: Value = serde_json::from_slice(bytes)?;
        if !v.is_object() {
            return Err(SnapshotError::NotAnObject(json_kind(&v)));
        }
        Ok(serde_json::from_value(v)?)
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let v = Value::deserialize(d)?;
    Ok(serde_json::from_value(v).unwrap_or_default())
}

// Nodes are assumed responsive unless the gateway says otherwise.
fn lenient_responsive<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(v.as_bool().unwrap_or(true))
}

// Only entries that are not objects are skipped; bad fields inside an entry
// fall back to their defaults.
fn lenient_nodes<'de, D>(d: D) -> Result<BTreeMap<String, NodeReport>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(d)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter(|(_, v)| v.is_object())
        .filter_map(|(id, v)| serde_json::from_value(v).ok().map(|n| (id, n)))
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Msg {
    Hello { version: String },
    RequestSnapshot,
    Snapshot { state: MeshState },
    Error { message: String },
    Ping,
    Pong,
}
