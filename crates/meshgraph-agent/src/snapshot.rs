use anyhow::{Context, Result};
use meshgraph_core::{GatewayInfo, MeshState, NodeReport, PowerManager, Topology};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::SourceMode;

pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl SourceMode {
    pub fn load(&self) -> Result<MeshState> {
        match self {
            SourceMode::StateFile(path) => load_state_file(path),
            SourceMode::Mock => Ok(mock_state(unix_now())),
        }
    }
}

pub fn load_state_file(path: &Path) -> Result<MeshState> {
    let bytes = fs::read(path)
        .with_context(|| format!("{} not found (is the gateway running?)", path.display()))?;
    MeshState::from_json(&bytes).with_context(|| format!("{} is malformed", path.display()))
}

fn round_to(v: f64, places: i32) -> f64 {
    let m = 10f64.powi(places);
    (v * m).round() / m
}

// Two sensing nodes behind one relay; readings drift with wall-clock time.
pub fn mock_state(now: f64) -> MeshState {
    let mut nodes = BTreeMap::new();

    let v1 = round_to(12.2 + 0.1 * (now / 5.0).sin(), 3);
    let i1 = round_to(1.2 + 0.05 * (now / 3.0).cos().abs(), 2);
    nodes.insert(
        "1".to_string(),
        NodeReport {
            duty: 100.0,
            voltage: v1,
            current: i1,
            power: round_to(v1 * i1, 1),
            last_seen: now,
            commanded_duty: 100.0,
            target_duty: 100.0,
            ..NodeReport::default()
        },
    );

    let v2 = round_to(11.7 + 0.05 * (now / 7.0).sin(), 3);
    let i2 = round_to(500.0 + 10.0 * (now / 11.0).cos().abs(), 1);
    nodes.insert(
        "2".to_string(),
        NodeReport {
            duty: 0.0,
            voltage: v2,
            current: i2,
            power: round_to(v2 * i2, 1),
            last_seen: now,
            ..NodeReport::default()
        },
    );

    let total = nodes.values().map(|n| n.power).sum::<f64>().round();
    let node_roles = nodes
        .keys()
        .map(|id| (id.clone(), "direct".to_string()))
        .collect();

    MeshState {
        timestamp: format!("{now:.3}"),
        gateway: GatewayInfo {
            connected: true,
            device_name: Some("ESP-BLE-MESH".to_string()),
            device_address: Some("98:A3:16:B1:C9:8A".to_string()),
        },
        nodes,
        relay_nodes: 1,
        sensing_node_count: Some(3),
        topology: Topology { node_roles },
        power_manager: Some(PowerManager {
            active: true,
            threshold_mw: 5000.0,
            budget_mw: 4500.0,
            priority_node: Some("2".to_string()),
            total_power_mw: total,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mock_power_is_voltage_times_current() {
        let st = mock_state(1_700_000_000.0);
        assert_eq!(st.nodes.len(), 2);
        for n in st.nodes.values() {
            assert!((n.power - n.voltage * n.current).abs() < 0.1);
            assert_eq!(n.last_seen, 1_700_000_000.0);
        }
        let pm = st.power_manager.expect("power manager");
        let sum: f64 = st.nodes.values().map(|n| n.power).sum();
        assert!((pm.total_power_mw - sum).abs() <= 0.5);
    }

    #[test]
    fn missing_state_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_state_file(&dir.path().join("mesh_state.json")).unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }

    #[test]
    fn loads_state_file() {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        write!(f, r#"{{"relay_nodes": 2, "nodes": {{"7": {{"last_seen": 5.0}}}}}}"#).expect("write");
        let st = load_state_file(f.path()).expect("load");
        assert_eq!(st.relay_nodes, 2);
        assert!(st.nodes.contains_key("7"));
    }

    #[test]
    fn malformed_state_file_is_an_error() {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile");
        write!(f, "{{ truncated").expect("write");
        let err = load_state_file(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("malformed"));
    }
}
