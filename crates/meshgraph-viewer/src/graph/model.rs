use meshgraph_core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Online,
    Stale,
    Offline,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Stale => "stale",
            Self::Offline => "offline",
        }
    }
}

/// Age cutoffs in seconds. An age exactly on a cutoff keeps the milder status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusThresholds {
    pub stale_after: f64,
    pub offline_after: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            stale_after: 12.0,
            offline_after: 20.0,
        }
    }
}

impl StatusThresholds {
    pub fn status_for_age(&self, age: f64) -> NodeStatus {
        if age > self.offline_after {
            NodeStatus::Offline
        } else if age > self.stale_after {
            NodeStatus::Stale
        } else {
            NodeStatus::Online
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorMetrics {
    pub duty: f64,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub target_duty: f64,
    pub commanded_duty: f64,
    pub responsive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    HostAnchor,
    GatewayAnchor {
        connected: bool,
        address: Option<String>,
    },
    Sensing {
        raw_id: String,
        status: NodeStatus,
        age_secs: f64,
        metrics: SensorMetrics,
    },
    Relay {
        index: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn status(&self) -> Option<NodeStatus> {
        match &self.kind {
            NodeKind::Sensing { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Relays only exist as a count in the snapshot.
    pub fn is_synthetic(&self) -> bool {
        matches!(self.kind, NodeKind::Relay { .. })
    }

    pub fn raw_sensing_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Sensing { raw_id, .. } => Some(raw_id),
            _ => None,
        }
    }
}

pub fn node_kind_name(k: &NodeKind) -> &'static str {
    match k {
        NodeKind::HostAnchor => "host",
        NodeKind::GatewayAnchor { .. } => "gateway",
        NodeKind::Sensing { .. } => "sensing node",
        NodeKind::Relay { .. } => "relay node",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    WirelessDirect,
    MeshDirect,
    MeshRelayed,
}

pub fn link_kind_name(k: LinkKind) -> &'static str {
    match k {
        LinkKind::WirelessDirect => "wireless-direct",
        LinkKind::MeshDirect => "mesh-direct",
        LinkKind::MeshRelayed => "mesh-relayed",
    }
}

pub type LinkKey = (NodeId, NodeId);

/// `source` is the parent side: host for the gateway, gateway or relay below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: LinkKind,
}

impl Link {
    pub fn new(source: NodeId, target: NodeId, kind: LinkKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    pub fn key(&self) -> LinkKey {
        (self.source.clone(), self.target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries_favor_lower_severity() {
        let t = StatusThresholds::default();
        assert_eq!(t.status_for_age(0.0), NodeStatus::Online);
        assert_eq!(t.status_for_age(12.0), NodeStatus::Online);
        assert_eq!(t.status_for_age(12.01), NodeStatus::Stale);
        assert_eq!(t.status_for_age(20.0), NodeStatus::Stale);
        assert_eq!(t.status_for_age(20.01), NodeStatus::Offline);
    }
}
