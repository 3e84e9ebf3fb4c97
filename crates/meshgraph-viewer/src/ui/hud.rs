use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};
use std::time::Instant;

use crate::graph::GraphState;
use crate::ui::{HUD_EDGE_PADDING, HUD_PANEL_GAP, PANEL_W};

pub fn hud_overlay(mut contexts: EguiContexts, st: Res<GraphState>) {
    let ctx = contexts.ctx_mut();
    let screen = ctx.screen_rect();
    let x = screen.min.x + PANEL_W + HUD_PANEL_GAP;
    let y = screen.min.y + HUD_EDGE_PADDING;

    egui::Area::new("hud".into())
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(x, y))
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(format!("FPS: {:.0}", st.perf.fps));
                ui.label(format!(
                    "Live: {} nodes / {} links (gen {})",
                    st.live.nodes.len(),
                    st.live.links.len(),
                    st.live.generation
                ));
                ui.label(format!(
                    "Layout energy: {:.3}{}",
                    st.layout.energy(),
                    if st.layout.is_settled() { " (settled)" } else { "" }
                ));

                if let Some(snap) = &st.snapshot {
                    let gw = snap.gateway();
                    ui.label(format!(
                        "Gateway: {}",
                        if gw.connected { "connected" } else { "disconnected" }
                    ));
                    let declared = snap
                        .state()
                        .sensing_node_count
                        .map(|n| format!(" (gateway reports {n})"))
                        .unwrap_or_default();
                    ui.label(format!(
                        "Sensing: {}{} / relays: {}",
                        snap.sensing_count(),
                        declared,
                        snap.relay_count()
                    ));
                    if let Some(pm) = snap.power_manager() {
                        ui.label(format!(
                            "Power manager: {}",
                            if pm.active { "active" } else { "idle" }
                        ));
                        ui.label(format!(
                            "  total {:.0} / budget {:.0} / threshold {:.0} mW",
                            pm.total_power_mw, pm.budget_mw, pm.threshold_mw
                        ));
                        if let Some(p) = &pm.priority_node {
                            ui.label(format!("  priority node: {p}"));
                        }
                    }
                    if !snap.timestamp().is_empty() {
                        ui.label(format!("Snapshot: {}", snap.timestamp()));
                    }
                }

                ui.label(format!(
                    "Polls: {} ok / {} failed",
                    st.perf.snapshots_applied, st.perf.fetch_failures
                ));
                if st.is_feed_stale(Instant::now()) {
                    let why = st
                        .perf
                        .last_fetch_error
                        .as_deref()
                        .unwrap_or("waiting for first snapshot");
                    ui.colored_label(egui::Color32::from_rgb(230, 170, 60), format!("Feed: {why}"));
                }
            });
        });
}
