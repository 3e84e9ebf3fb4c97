use meshgraph_core::NodeId;

use crate::graph::model::{node_kind_name, Node, NodeKind};
use crate::graph::reconcile::LiveGraph;

/// What the detail panel should show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Inspector {
    #[default]
    Placeholder,
    /// `resolved` is false once the entity has left the live graph; the
    /// last-known descriptor is kept on screen.
    Entity { node: Node, resolved: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Stop,
    Continue,
}

#[derive(Debug, Default)]
pub struct SelectionController {
    inspected: Option<NodeId>,
    view: Inspector,
}

impl SelectionController {
    pub fn inspected(&self) -> Option<&NodeId> {
        self.inspected.as_ref()
    }

    pub fn inspector(&self) -> &Inspector {
        &self.view
    }

    /// Current descriptor for the inspected entity, if any.
    pub fn detail(&self) -> Option<&Node> {
        match &self.view {
            Inspector::Entity { node, .. } => Some(node),
            Inspector::Placeholder => None,
        }
    }

    /// Raw snapshot id of the inspected sensing node. Relays and anchors
    /// have no history, so they never chart.
    pub fn charted_node(&self) -> Option<&str> {
        self.detail().and_then(Node::raw_sensing_id)
    }

    pub fn on_entity_click(&mut self, node: &Node) -> Propagation {
        self.inspected = Some(node.id.clone());
        self.view = Inspector::Entity {
            node: node.clone(),
            resolved: true,
        };
        Propagation::Stop
    }

    pub fn on_background_click(&mut self) {
        self.inspected = None;
        self.view = Inspector::Placeholder;
    }

    /// Re-derives the inspected descriptor from a new generation.
    pub fn on_generation(&mut self, live: &LiveGraph) {
        let Some(id) = &self.inspected else {
            return;
        };
        match live.node(id) {
            Some(node) => {
                self.view = Inspector::Entity {
                    node: node.clone(),
                    resolved: true,
                };
            }
            None => {
                if let Inspector::Entity { resolved, .. } = &mut self.view {
                    *resolved = false;
                }
            }
        }
    }
}

pub fn detail_rows(node: &Node) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("id", node.id.0.clone()),
        ("kind", node_kind_name(&node.kind).to_string()),
    ];
    match &node.kind {
        NodeKind::HostAnchor => {}
        NodeKind::GatewayAnchor { connected, address } => {
            rows.push(("connected", if *connected { "yes" } else { "no" }.to_string()));
            if let Some(a) = address {
                rows.push(("address", a.clone()));
            }
        }
        NodeKind::Sensing {
            status,
            age_secs,
            metrics,
            ..
        } => {
            rows.push(("status", status.as_str().to_string()));
            rows.push(("last seen", format!("{age_secs:.1}s ago")));
            rows.push(("duty", format!("{:.0}%", metrics.duty)));
            rows.push(("target duty", format!("{:.0}%", metrics.target_duty)));
            rows.push(("commanded duty", format!("{:.0}%", metrics.commanded_duty)));
            rows.push(("voltage", format!("{:.3} V", metrics.voltage)));
            rows.push(("current", format!("{:.2} mA", metrics.current)));
            rows.push(("power", format!("{:.1} mW", metrics.power)));
            rows.push((
                "responsive",
                if metrics.responsive { "yes" } else { "no" }.to_string(),
            ));
        }
        NodeKind::Relay { index } => {
            rows.push(("relay index", index.to_string()));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{NodeStatus, SensorMetrics};
    use crate::graph::topology::Inferred;
    use crate::util::ids::{relay_id, sensing_id};

    fn sensing(raw: &str, voltage: f64) -> Node {
        Node {
            id: sensing_id(raw),
            label: format!("Node {raw}"),
            kind: NodeKind::Sensing {
                raw_id: raw.to_string(),
                status: NodeStatus::Online,
                age_secs: 1.0,
                metrics: SensorMetrics {
                    duty: 50.0,
                    voltage,
                    current: 2.0,
                    power: voltage * 2.0,
                    target_duty: 50.0,
                    commanded_duty: 50.0,
                    responsive: true,
                },
            },
        }
    }

    fn relay(index: u32) -> Node {
        Node {
            id: relay_id(index),
            label: format!("Relay {index}"),
            kind: NodeKind::Relay { index },
        }
    }

    fn live(nodes: Vec<Node>) -> LiveGraph {
        let mut g = LiveGraph::default();
        g.reconcile(Inferred {
            nodes,
            links: Vec::new(),
        });
        g
    }

    #[test]
    fn click_inspects_immediately_and_stops_propagation() {
        let mut sel = SelectionController::default();
        let n = sensing("1", 12.0);
        assert_eq!(sel.on_entity_click(&n), Propagation::Stop);
        assert_eq!(sel.inspected(), Some(&sensing_id("1")));
        assert_eq!(sel.detail(), Some(&n));
        assert_eq!(sel.charted_node(), Some("1"));
    }

    #[test]
    fn new_generation_refreshes_detail() {
        let mut sel = SelectionController::default();
        sel.on_entity_click(&sensing("1", 12.0));
        sel.on_generation(&live(vec![sensing("1", 11.5)]));
        match sel.inspector() {
            Inspector::Entity { node, resolved } => {
                assert!(*resolved);
                assert_eq!(node, &sensing("1", 11.5));
            }
            other => panic!("unexpected inspector: {other:?}"),
        }
    }

    #[test]
    fn vanished_entity_keeps_last_known_detail() {
        let mut sel = SelectionController::default();
        sel.on_entity_click(&relay(2));
        sel.on_generation(&live(vec![relay(1)]));
        assert_eq!(
            sel.inspector(),
            &Inspector::Entity {
                node: relay(2),
                resolved: false
            }
        );
        assert_eq!(sel.charted_node(), None);

        // relay 2 is back by index
        sel.on_generation(&live(vec![relay(1), relay(2)]));
        assert!(matches!(
            sel.inspector(),
            Inspector::Entity { resolved: true, .. }
        ));
    }

    #[test]
    fn background_click_clears() {
        let mut sel = SelectionController::default();
        sel.on_entity_click(&sensing("1", 12.0));
        sel.on_background_click();
        assert_eq!(sel.inspected(), None);
        assert_eq!(sel.inspector(), &Inspector::Placeholder);
        sel.on_generation(&live(vec![sensing("1", 12.0)]));
        assert_eq!(sel.inspector(), &Inspector::Placeholder);
    }

    #[test]
    fn rows_describe_sensing_node() {
        let rows = detail_rows(&sensing("1", 12.294));
        assert!(rows.contains(&("status", "online".to_string())));
        assert!(rows.contains(&("voltage", "12.294 V".to_string())));
        let rows = detail_rows(&relay(3));
        assert!(rows.contains(&("relay index", "3".to_string())));
    }
}
