use bevy::prelude::Vec2;
use meshgraph_core::NodeId;

use crate::graph::layout::LayoutEngine;
use crate::graph::reconcile::LiveGraph;

pub type PointerId = u64;

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    pointer: PointerId,
    node: NodeId,
}

/// Pointer-driven pinning. Writes straight into layout bodies.
#[derive(Debug, Default)]
pub struct InteractionController {
    drags: Vec<Drag>,
}

impl InteractionController {
    pub fn is_dragging(&self) -> bool {
        !self.drags.is_empty()
    }

    pub fn dragged_by(&self, pointer: PointerId) -> Option<&NodeId> {
        self.drags
            .iter()
            .find(|d| d.pointer == pointer)
            .map(|d| &d.node)
    }

    pub fn pointer_down(&mut self, pointer: PointerId, node: &NodeId, layout: &mut LayoutEngine) -> bool {
        let Some(at) = layout.position(node) else {
            return false;
        };
        // A pointer can only hold one node.
        self.release(pointer, layout);
        if self.drags.is_empty() {
            let drag_energy = layout.params.drag_energy;
            layout.set_energy_target(drag_energy);
        }
        layout.pin(node, at);
        self.drags.push(Drag {
            pointer,
            node: node.clone(),
        });
        true
    }

    pub fn pointer_move(&mut self, pointer: PointerId, at: Vec2, layout: &mut LayoutEngine) {
        if let Some(d) = self.drags.iter().find(|d| d.pointer == pointer) {
            layout.pin(&d.node, at);
        }
    }

    pub fn pointer_up(&mut self, pointer: PointerId, layout: &mut LayoutEngine) {
        self.release(pointer, layout);
    }

    fn release(&mut self, pointer: PointerId, layout: &mut LayoutEngine) {
        let Some(i) = self.drags.iter().position(|d| d.pointer == pointer) else {
            return;
        };
        let drag = self.drags.remove(i);
        layout.unpin(&drag.node);
        if self.drags.is_empty() {
            layout.set_energy_target(0.0);
        }
    }

    /// Ends drags whose node left the live graph.
    pub fn retain_live(&mut self, live: &LiveGraph, layout: &mut LayoutEngine) {
        let gone: Vec<PointerId> = self
            .drags
            .iter()
            .filter(|d| !live.contains(&d.node))
            .map(|d| d.pointer)
            .collect();
        for pointer in gone {
            self.release(pointer, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Link, LinkKind, Node, NodeKind};
    use crate::graph::topology::Inferred;
    use crate::util::ids::{gateway_id, host_id};

    fn setup() -> (LiveGraph, LayoutEngine) {
        let mut live = LiveGraph::default();
        let mut layout = LayoutEngine::default();
        let out = live.reconcile(Inferred {
            nodes: vec![
                Node {
                    id: host_id(),
                    label: "Host".into(),
                    kind: NodeKind::HostAnchor,
                },
                Node {
                    id: gateway_id(),
                    label: "Gateway".into(),
                    kind: NodeKind::GatewayAnchor {
                        connected: true,
                        address: None,
                    },
                },
            ],
            links: vec![Link::new(host_id(), gateway_id(), LinkKind::WirelessDirect)],
        });
        layout.sync(&live, &out);
        for _ in 0..1000 {
            if !layout.step(&live) {
                break;
            }
        }
        (live, layout)
    }

    #[test]
    fn drag_pins_follows_pointer_and_releases() {
        let (live, mut layout) = setup();
        let mut ix = InteractionController::default();
        assert!(layout.is_settled());

        let start = layout.position(&gateway_id()).expect("gateway");
        assert!(ix.pointer_down(0, &gateway_id(), &mut layout));
        assert_eq!(layout.body(&gateway_id()).and_then(|b| b.pin), Some(start));
        assert_eq!(layout.energy_target(), layout.params.drag_energy);
        assert!(!layout.is_settled());

        let to = start + Vec2::new(120.0, -40.0);
        ix.pointer_move(0, to, &mut layout);
        for _ in 0..20 {
            layout.step(&live);
        }
        assert_eq!(layout.position(&gateway_id()), Some(to));
        assert!(layout.energy() > layout.params.energy_min);

        ix.pointer_up(0, &mut layout);
        assert!(!ix.is_dragging());
        assert_eq!(layout.body(&gateway_id()).and_then(|b| b.pin), None);
        assert_eq!(layout.energy_target(), 0.0);
    }

    #[test]
    fn energy_target_held_while_any_drag_remains() {
        let (_live, mut layout) = setup();
        let mut ix = InteractionController::default();
        ix.pointer_down(1, &host_id(), &mut layout);
        ix.pointer_down(2, &gateway_id(), &mut layout);
        ix.pointer_up(1, &mut layout);
        assert_eq!(layout.energy_target(), layout.params.drag_energy);
        assert_eq!(ix.dragged_by(2), Some(&gateway_id()));
        ix.pointer_up(2, &mut layout);
        assert_eq!(layout.energy_target(), 0.0);
    }

    #[test]
    fn down_on_unknown_node_is_ignored() {
        let (_live, mut layout) = setup();
        let mut ix = InteractionController::default();
        assert!(!ix.pointer_down(0, &NodeId::new("node-9"), &mut layout));
        assert!(!ix.is_dragging());
        assert_eq!(layout.energy_target(), 0.0);
    }
}
