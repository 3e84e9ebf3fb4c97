use bevy::prelude::*;
use bevy_egui::EguiContexts;
use meshgraph_core::NodeId;

use crate::graph::interaction::PointerId;
use crate::graph::model::{LinkKind, Node, NodeKind, NodeStatus};
use crate::graph::tick::FrameTick;
use crate::graph::GraphState;

pub const NODE_RADIUS: f32 = 10.0;
const MOUSE: PointerId = 0;

pub fn pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    mut st: ResMut<GraphState>,
) {
    if buttons.just_released(MouseButton::Left) {
        st.pointer_up(MOUSE);
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        if !st.interaction.is_dragging() {
            st.pointer_left();
        }
        return;
    };

    // A drag keeps the pointer even when it crosses a panel.
    let over_ui = contexts.ctx_mut().wants_pointer_input();
    if over_ui && !st.interaction.is_dragging() {
        st.ui.hovered = None;
        return;
    }

    if buttons.just_pressed(MouseButton::Left) {
        st.pointer_down(MOUSE, cursor);
        if buttons.just_released(MouseButton::Left) {
            st.pointer_up(MOUSE);
        }
    }
    st.pointer_move(MOUSE, cursor);
}

pub fn step_layout(time: Res<Time>, mut st: ResMut<GraphState>) {
    st.advance(&mut FrameTick::new(time.delta_seconds()));
}

pub fn draw_graph(
    st: Res<GraphState>,
    cam_q: Query<(&Camera, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    let Ok((camera, cam_tf)) = cam_q.get_single() else {
        return;
    };
    let to_world = |id: &NodeId| {
        st.layout
            .position(id)
            .and_then(|p| camera.viewport_to_world_2d(cam_tf, p))
    };

    if st.cfg.show_links {
        for link in &st.live.links {
            let (Some(a), Some(b)) = (to_world(&link.source), to_world(&link.target)) else {
                continue;
            };
            gizmos.line_2d(a, b, link_color(link.kind));
        }
    }

    let selected = st.selection.inspected();
    for node in &st.live.nodes {
        let Some(p) = to_world(&node.id) else {
            continue;
        };
        gizmos.circle_2d(p, NODE_RADIUS, node_color(node));
        if selected == Some(&node.id) {
            gizmos.circle_2d(p, NODE_RADIUS + 4.0, Color::WHITE);
        }
        if st.layout.body(&node.id).is_some_and(|b| b.pin.is_some()) {
            gizmos.circle_2d(p, NODE_RADIUS * 0.4, Color::WHITE);
        }
        if st.ui.hovered.as_ref() == Some(&node.id) {
            gizmos.circle_2d(p, NODE_RADIUS + 2.0, Color::srgb(0.8, 0.8, 0.8));
        }
    }
}

fn link_color(kind: LinkKind) -> Color {
    match kind {
        LinkKind::WirelessDirect => Color::srgb(0.35, 0.6, 0.95),
        LinkKind::MeshDirect => Color::srgb(0.55, 0.55, 0.6),
        LinkKind::MeshRelayed => Color::srgb(0.7, 0.45, 0.9),
    }
}

fn node_color(node: &Node) -> Color {
    match &node.kind {
        NodeKind::HostAnchor => Color::srgb(0.35, 0.6, 0.95),
        NodeKind::GatewayAnchor { connected: true, .. } => Color::srgb(0.3, 0.8, 0.45),
        NodeKind::GatewayAnchor { connected: false, .. } => Color::srgb(0.9, 0.3, 0.3),
        NodeKind::Relay { .. } => Color::srgb(0.7, 0.45, 0.9),
        NodeKind::Sensing { status, .. } => match status {
            NodeStatus::Online => Color::srgb(0.3, 0.8, 0.45),
            NodeStatus::Stale => Color::srgb(0.95, 0.7, 0.25),
            NodeStatus::Offline => Color::srgb(0.9, 0.3, 0.3),
        },
    }
}
