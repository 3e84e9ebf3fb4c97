use meshgraph_core::{GatewayInfo, MeshState, NodeReport, NodeRole, PowerManager};

use crate::util::ids::cmp_raw_ids;

/// Read-only typed view over one mesh-state snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotModel {
    state: MeshState,
    sensing_order: Vec<String>,
}

impl SnapshotModel {
    pub fn new(state: MeshState) -> Self {
        let mut sensing_order: Vec<String> = state.nodes.keys().cloned().collect();
        sensing_order.sort_by(|a, b| cmp_raw_ids(a, b));
        Self {
            state,
            sensing_order,
        }
    }

    pub fn state(&self) -> &MeshState {
        &self.state
    }

    pub fn timestamp(&self) -> &str {
        &self.state.timestamp
    }

    pub fn gateway(&self) -> &GatewayInfo {
        &self.state.gateway
    }

    pub fn relay_count(&self) -> u32 {
        self.state.relay_nodes
    }

    pub fn role_of(&self, raw_id: &str) -> NodeRole {
        self.state.topology.role_of(raw_id)
    }

    /// Sensing nodes in display order (numeric ids ascending).
    pub fn sensing_nodes(&self) -> impl Iterator<Item = (&str, &NodeReport)> + '_ {
        self.sensing_order
            .iter()
            .filter_map(|id| self.state.nodes.get(id).map(|r| (id.as_str(), r)))
    }

    pub fn sensing_count(&self) -> usize {
        self.sensing_order.len()
    }

    pub fn power_manager(&self) -> Option<&PowerManager> {
        self.state.power_manager.as_ref()
    }
}
