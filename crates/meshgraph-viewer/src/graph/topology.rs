use meshgraph_core::NodeRole;
use std::collections::BTreeMap;

use crate::graph::model::{Link, LinkKind, Node, NodeKind, SensorMetrics, StatusThresholds};
use crate::graph::snapshot::SnapshotModel;
use crate::util::ids::{gateway_id, host_id, relay_id, sensing_id};

// Guards against a corrupt relay count exploding the entity set.
pub const MAX_RELAYS: u32 = 256;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inferred {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

pub struct InferOptions<'a> {
    /// Unix seconds used to age `last_seen`.
    pub now: f64,
    pub thresholds: StatusThresholds,
    pub aliases: &'a BTreeMap<String, String>,
}

pub fn sensing_label(raw_id: &str, aliases: &BTreeMap<String, String>) -> String {
    aliases
        .get(raw_id)
        .cloned()
        .unwrap_or_else(|| format!("Node {raw_id}"))
}

/// Derives the entity and link lists for one snapshot.
///
/// Output order is host, gateway, sensing nodes, relays; links follow the same
/// order with the host-gateway link first. Relayed nodes all hang off relay 1.
pub fn infer(snap: &SnapshotModel, opts: &InferOptions<'_>) -> Inferred {
    let gw = snap.gateway();
    if snap.relay_count() > MAX_RELAYS {
        tracing::warn!(
            declared = snap.relay_count(),
            cap = MAX_RELAYS,
            "relay count exceeds cap, truncating"
        );
    }
    let relay_count = snap.relay_count().min(MAX_RELAYS);

    let mut nodes = Vec::with_capacity(2 + snap.sensing_count() + relay_count as usize);
    let mut links = Vec::with_capacity(1 + snap.sensing_count() + relay_count as usize);

    nodes.push(Node {
        id: host_id(),
        label: "Host".to_string(),
        kind: NodeKind::HostAnchor,
    });
    nodes.push(Node {
        id: gateway_id(),
        label: gw
            .device_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Gateway".to_string()),
        kind: NodeKind::GatewayAnchor {
            connected: gw.connected,
            address: gw.device_address.clone(),
        },
    });
    links.push(Link::new(host_id(), gateway_id(), LinkKind::WirelessDirect));

    let mut sensing_links = Vec::with_capacity(snap.sensing_count());
    for (raw_id, report) in snap.sensing_nodes() {
        let age = opts.now - report.last_seen;
        let id = sensing_id(raw_id);
        nodes.push(Node {
            id: id.clone(),
            label: sensing_label(raw_id, opts.aliases),
            kind: NodeKind::Sensing {
                raw_id: raw_id.to_string(),
                status: opts.thresholds.status_for_age(age),
                age_secs: age,
                metrics: SensorMetrics {
                    duty: report.duty,
                    voltage: report.voltage,
                    current: report.current,
                    power: report.power,
                    target_duty: report.target_duty,
                    commanded_duty: report.commanded_duty,
                    responsive: report.responsive,
                },
            },
        });

        let link = match snap.role_of(raw_id) {
            NodeRole::Relayed if relay_count > 0 => {
                Link::new(relay_id(1), id, LinkKind::MeshRelayed)
            }
            _ => Link::new(gateway_id(), id, LinkKind::MeshDirect),
        };
        sensing_links.push(link);
    }

    for index in 1..=relay_count {
        nodes.push(Node {
            id: relay_id(index),
            label: format!("Relay {index}"),
            kind: NodeKind::Relay { index },
        });
        links.push(Link::new(gateway_id(), relay_id(index), LinkKind::MeshDirect));
    }
    links.extend(sensing_links);

    Inferred { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::NodeStatus;
    use crate::util::ids::GATEWAY_ID;
    use meshgraph_core::{MeshState, NodeReport, Topology};
    use proptest::prelude::*;
    use std::collections::HashMap;

    const NOW: f64 = 1_700_000_000.0;

    fn snapshot(nodes: &[(&str, f64)], relays: u32, roles: &[(&str, &str)]) -> SnapshotModel {
        SnapshotModel::new(MeshState {
            nodes: nodes
                .iter()
                .map(|(id, age)| {
                    (
                        id.to_string(),
                        NodeReport {
                            last_seen: NOW - age,
                            ..NodeReport::default()
                        },
                    )
                })
                .collect(),
            relay_nodes: relays,
            topology: Topology {
                node_roles: roles
                    .iter()
                    .map(|(id, r)| (id.to_string(), r.to_string()))
                    .collect(),
            },
            ..MeshState::default()
        })
    }

    fn run(snap: &SnapshotModel) -> Inferred {
        let aliases = BTreeMap::new();
        infer(
            snap,
            &InferOptions {
                now: NOW,
                thresholds: StatusThresholds::default(),
                aliases: &aliases,
            },
        )
    }

    fn link_tuples(inf: &Inferred) -> Vec<(&str, &str, LinkKind)> {
        inf.links
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str(), l.kind))
            .collect()
    }

    #[test]
    fn relayed_node_hangs_off_first_relay() {
        let inf = run(&snapshot(&[("1", 5.0)], 1, &[("1", "relayed")]));
        assert_eq!(
            link_tuples(&inf),
            vec![
                ("host", "gateway", LinkKind::WirelessDirect),
                ("gateway", "relay-1", LinkKind::MeshDirect),
                ("relay-1", "node-1", LinkKind::MeshRelayed),
            ]
        );
        let node = inf
            .nodes
            .iter()
            .find(|n| n.id.as_str() == "node-1")
            .expect("node-1");
        assert_eq!(node.status(), Some(NodeStatus::Online));
    }

    #[test]
    fn relayed_without_relays_falls_back_to_gateway() {
        let inf = run(&snapshot(&[("1", 1.0)], 0, &[("1", "relayed")]));
        assert_eq!(
            link_tuples(&inf),
            vec![
                ("host", "gateway", LinkKind::WirelessDirect),
                ("gateway", "node-1", LinkKind::MeshDirect),
            ]
        );
    }

    #[test]
    fn multiple_relays_still_route_through_relay_one() {
        let inf = run(&snapshot(
            &[("1", 1.0), ("2", 1.0)],
            3,
            &[("1", "relayed"), ("2", "relayed")],
        ));
        let relayed: Vec<_> = inf
            .links
            .iter()
            .filter(|l| l.kind == LinkKind::MeshRelayed)
            .map(|l| l.source.as_str())
            .collect();
        assert_eq!(relayed, vec!["relay-1", "relay-1"]);
        assert_eq!(
            inf.nodes.iter().filter(|n| n.is_synthetic()).count(),
            3
        );
    }

    #[test]
    fn status_follows_age_thresholds() {
        let inf = run(&snapshot(
            &[("a", 12.0), ("b", 12.5), ("c", 20.5), ("d", 0.0)],
            0,
            &[],
        ));
        let status: HashMap<&str, NodeStatus> = inf
            .nodes
            .iter()
            .filter_map(|n| n.status().map(|s| (n.id.as_str(), s)))
            .collect();
        assert_eq!(status["node-a"], NodeStatus::Online);
        assert_eq!(status["node-b"], NodeStatus::Stale);
        assert_eq!(status["node-c"], NodeStatus::Offline);
        assert_eq!(status["node-d"], NodeStatus::Online);
    }

    #[test]
    fn oversized_relay_count_is_capped() {
        let inf = run(&snapshot(&[("1", 5.0)], 10_000, &[("1", "relayed")]));
        let relays = inf.nodes.iter().filter(|n| n.is_synthetic()).count();
        assert_eq!(relays, MAX_RELAYS as usize);
        let last = relay_id(MAX_RELAYS);
        assert!(inf.nodes.iter().any(|n| n.id == last));
        assert!(!inf.nodes.iter().any(|n| n.id == relay_id(MAX_RELAYS + 1)));
    }

    #[test]
    fn anchors_always_present() {
        let inf = run(&SnapshotModel::default());
        assert_eq!(inf.nodes.len(), 2);
        assert_eq!(inf.nodes[1].id.as_str(), GATEWAY_ID);
        assert_eq!(link_tuples(&inf), vec![("host", "gateway", LinkKind::WirelessDirect)]);
    }

    #[test]
    fn alias_replaces_default_label() {
        let snap = snapshot(&[("1", 0.0), ("2", 0.0)], 0, &[]);
        let mut aliases = BTreeMap::new();
        aliases.insert("2".to_string(), "Pump".to_string());
        let inf = infer(
            &snap,
            &InferOptions {
                now: NOW,
                thresholds: StatusThresholds::default(),
                aliases: &aliases,
            },
        );
        let labels: Vec<&str> = inf.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Host", "Gateway", "Node 1", "Pump"]);
    }

    fn arb_snapshot() -> impl Strategy<Value = SnapshotModel> {
        let node = (0u32..40, 0.0f64..40.0, prop::sample::select(vec!["direct", "relayed", "??"]));
        (prop::collection::vec(node, 0..12), 0u32..4).prop_map(|(nodes, relays)| {
            let mut state = MeshState {
                relay_nodes: relays,
                ..MeshState::default()
            };
            for (id, age, role) in nodes {
                let id = id.to_string();
                state.nodes.insert(
                    id.clone(),
                    NodeReport {
                        last_seen: NOW - age,
                        ..NodeReport::default()
                    },
                );
                state.topology.node_roles.insert(id, role.to_string());
            }
            SnapshotModel::new(state)
        })
    }

    proptest! {
        #[test]
        fn inference_is_idempotent(snap in arb_snapshot()) {
            prop_assert_eq!(run(&snap), run(&snap));
        }

        #[test]
        fn sensing_nodes_form_a_shallow_tree(snap in arb_snapshot()) {
            let inf = run(&snap);
            let mut parent: HashMap<&str, &str> = HashMap::new();
            for l in &inf.links {
                prop_assert!(parent.insert(l.target.as_str(), l.source.as_str()).is_none());
            }
            for n in inf.nodes.iter().filter(|n| n.raw_sensing_id().is_some()) {
                let mut cur = n.id.as_str();
                let mut hops = 0;
                while cur != GATEWAY_ID {
                    cur = parent.get(cur).copied().ok_or_else(|| {
                        TestCaseError::fail(format!("{cur} has no inbound link"))
                    })?;
                    hops += 1;
                    prop_assert!(hops <= 2);
                }
            }
            let keys: std::collections::HashSet<_> = inf.links.iter().map(|l| l.key()).collect();
            prop_assert_eq!(keys.len(), inf.links.len());
        }
    }
}
