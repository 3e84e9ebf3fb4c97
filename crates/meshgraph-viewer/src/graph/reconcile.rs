use meshgraph_core::NodeId;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

use crate::graph::model::{Link, LinkKey, Node};
use crate::graph::topology::Inferred;

/// The entity and link sets currently on screen.
#[derive(Debug, Default)]
pub struct LiveGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub generation: u64,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub updated: usize,
    pub links_added: usize,
    pub links_removed: usize,
    /// Node count differs from the previous generation.
    pub count_changed: bool,
}

impl LiveGraph {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.links.iter().find(|l| &l.target == id).map(|l| &l.source)
    }

    pub fn neighbors(&self, id: &NodeId) -> SmallVec<[&NodeId; 4]> {
        self.links
            .iter()
            .filter_map(|l| {
                if &l.source == id {
                    Some(&l.target)
                } else if &l.target == id {
                    Some(&l.source)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Merges a freshly inferred generation into the live sets.
    ///
    /// Survivors stay where they were in the list and are updated in place;
    /// newcomers are appended in inferred order; everything else is dropped.
    /// Nodes are keyed by id, links by their ordered (source, target) pair.
    pub fn reconcile(&mut self, next: Inferred) -> ReconcileOutcome {
        let prev_count = self.nodes.len();
        let mut out = ReconcileOutcome::default();

        let next_order: Vec<NodeId> = next.nodes.iter().map(|n| n.id.clone()).collect();
        let mut incoming: HashMap<NodeId, Node> =
            next.nodes.into_iter().map(|n| (n.id.clone(), n)).collect();

        let mut nodes = Vec::with_capacity(next_order.len());
        for old in self.nodes.drain(..) {
            match incoming.remove(&old.id) {
                Some(fresh) => {
                    if fresh != old {
                        out.updated += 1;
                    }
                    nodes.push(fresh);
                }
                None => out.removed.push(old.id),
            }
        }
        for id in next_order {
            if let Some(fresh) = incoming.remove(&id) {
                out.added.push(id);
                nodes.push(fresh);
            }
        }
        self.nodes = nodes;

        let next_link_order: Vec<LinkKey> = next.links.iter().map(Link::key).collect();
        let mut incoming_links: HashMap<LinkKey, Link> =
            next.links.into_iter().map(|l| (l.key(), l)).collect();

        let mut links = Vec::with_capacity(next_link_order.len());
        for old in self.links.drain(..) {
            match incoming_links.remove(&old.key()) {
                Some(fresh) => links.push(fresh),
                None => out.links_removed += 1,
            }
        }
        for key in next_link_order {
            if let Some(fresh) = incoming_links.remove(&key) {
                out.links_added += 1;
                links.push(fresh);
            }
        }
        self.links = links;

        self.generation += 1;
        out.generation = self.generation;
        out.count_changed = self.nodes.len() != prev_count;
        out
    }

    pub fn ids(&self) -> HashSet<&NodeId> {
        self.nodes.iter().map(|n| &n.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{LinkKind, NodeKind};
    use crate::util::ids::{gateway_id, host_id, sensing_id};

    fn anchor(id: NodeId, label: &str) -> Node {
        Node {
            id,
            label: label.to_string(),
            kind: NodeKind::HostAnchor,
        }
    }

    fn generation(ids: &[&str]) -> Inferred {
        let mut nodes = vec![anchor(host_id(), "Host"), anchor(gateway_id(), "Gateway")];
        let mut links = vec![Link::new(host_id(), gateway_id(), LinkKind::WirelessDirect)];
        for raw in ids {
            nodes.push(anchor(sensing_id(raw), &format!("Node {raw}")));
            links.push(Link::new(gateway_id(), sensing_id(raw), LinkKind::MeshDirect));
        }
        Inferred { nodes, links }
    }

    fn order(g: &LiveGraph) -> Vec<&str> {
        g.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn first_generation_adds_everything() {
        let mut g = LiveGraph::default();
        let out = g.reconcile(generation(&["1", "2"]));
        assert_eq!(out.added.len(), 4);
        assert!(out.count_changed);
        assert_eq!(out.links_added, 3);
        assert_eq!(g.generation, 1);
    }

    #[test]
    fn survivors_keep_their_slot_and_newcomers_append() {
        let mut g = LiveGraph::default();
        g.reconcile(generation(&["2", "3"]));
        let out = g.reconcile(generation(&["1", "2", "3"]));
        assert_eq!(order(&g), vec!["host", "gateway", "node-2", "node-3", "node-1"]);
        assert_eq!(out.added, vec![sensing_id("1")]);
        assert!(out.removed.is_empty());
        assert!(out.count_changed);
    }

    #[test]
    fn removal_drops_node_and_its_link() {
        let mut g = LiveGraph::default();
        g.reconcile(generation(&["1", "2"]));
        let out = g.reconcile(generation(&["2"]));
        assert_eq!(out.removed, vec![sensing_id("1")]);
        assert_eq!(out.links_removed, 1);
        assert!(!g.contains(&sensing_id("1")));
        assert!(g.links.iter().all(|l| l.target != sensing_id("1")));
    }

    #[test]
    fn relabel_is_an_in_place_update() {
        let mut g = LiveGraph::default();
        g.reconcile(generation(&["1", "2"]));
        let mut next = generation(&["1", "2"]);
        next.nodes[2].label = "Pump".to_string();
        let out = g.reconcile(next);
        assert!(out.added.is_empty() && out.removed.is_empty());
        assert_eq!(out.updated, 1);
        assert!(!out.count_changed);
        assert_eq!(g.nodes[2].label, "Pump");
    }

    #[test]
    fn rerouted_node_swaps_link_key() {
        let mut g = LiveGraph::default();
        g.reconcile(generation(&["1"]));
        let mut next = generation(&["1"]);
        next.links[1] = Link::new(
            NodeId::new("relay-1"),
            sensing_id("1"),
            LinkKind::MeshRelayed,
        );
        let out = g.reconcile(next);
        assert_eq!((out.links_added, out.links_removed), (1, 1));
        assert_eq!(g.parent_of(&sensing_id("1")), Some(&NodeId::new("relay-1")));
        assert_eq!(g.neighbors(&gateway_id()).len(), 1);
    }
}
