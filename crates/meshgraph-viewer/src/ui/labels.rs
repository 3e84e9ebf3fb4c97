use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::GraphState;
use crate::render::NODE_RADIUS;

/// Node captions, painted in screen space under each body.
pub fn draw_labels(mut contexts: EguiContexts, st: Res<GraphState>) {
    if !st.cfg.show_labels {
        return;
    }
    let ctx = contexts.ctx_mut();
    let mut clip = ctx.screen_rect();
    clip.min.x += super::PANEL_W;
    let painter = ctx
        .layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("node_labels"),
        ))
        .with_clip_rect(clip);
    let selected = st.selection.inspected();
    for node in &st.live.nodes {
        let Some(pos) = st.layout.position(&node.id) else {
            continue;
        };
        let color = if selected == Some(&node.id) {
            egui::Color32::WHITE
        } else {
            egui::Color32::from_gray(190)
        };
        painter.text(
            egui::pos2(pos.x, pos.y + NODE_RADIUS + 4.0),
            egui::Align2::CENTER_TOP,
            &node.label,
            egui::FontId::proportional(12.0),
            color,
        );
    }
}
