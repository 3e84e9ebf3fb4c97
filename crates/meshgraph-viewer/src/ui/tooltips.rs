use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::graph::model::{link_kind_name, node_kind_name};
use crate::graph::GraphState;

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

pub fn hover_tooltip(mut contexts: EguiContexts, st: Res<GraphState>) {
    let (Some(id), Some(cursor)) = (&st.ui.hovered, st.ui.cursor) else {
        return;
    };
    let Some(node) = st.live.node(id) else {
        return;
    };
    let mut lines = vec![node.label.clone(), node_kind_name(&node.kind).to_string()];
    if let Some(status) = node.status() {
        lines.push(format!("status: {}", status.as_str()));
    }
    if let (Some(raw), Some(snap)) = (node.raw_sensing_id(), &st.snapshot) {
        lines.push(format!("role: {}", snap.role_of(raw).as_str()));
    }
    if node.is_synthetic() {
        lines.push("inferred from relay count".to_string());
    }
    if let Some(up) = st.live.links.iter().find(|l| l.target == node.id) {
        let parent = st
            .live
            .node(&up.source)
            .map(|p| p.label.as_str())
            .unwrap_or(up.source.as_str());
        lines.push(format!("uplink: {} via {parent}", link_kind_name(up.kind)));
    }
    lines.push(format!("links: {}", st.live.neighbors(&node.id).len()));
    render_tooltip(
        contexts.ctx_mut(),
        "node_tooltip",
        egui::pos2(cursor.x + 16.0, cursor.y + 16.0),
        lines,
    );
}
