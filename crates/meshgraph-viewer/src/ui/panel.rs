use bevy::prelude::ResMut;
use bevy_egui::{egui, EguiContexts};

use crate::graph::model::NodeKind;
use crate::graph::selection::{detail_rows, Inspector};
use crate::graph::GraphState;
use crate::util::config::{self, MAX_ALIAS_LEN};

pub fn ui_panel(mut contexts: EguiContexts, mut st: ResMut<GraphState>) {
    let st = &mut *st;
    egui::SidePanel::left("left")
        .exact_width(super::PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Mesh topology");
            ui.label(format!("nodes: {}", st.live.nodes.len()));
            ui.label(format!("links: {}", st.live.links.len()));
            ui.horizontal(|ui| {
                ui.checkbox(&mut st.cfg.show_links, "Links");
                ui.checkbox(&mut st.cfg.show_labels, "Labels");
            });

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Inspector");
            inspector_section(ui, st);

            ui.add_space(8.0);
            ui.separator();
            egui::CollapsingHeader::new("Layout")
                .default_open(false)
                .show(ui, |ui| layout_section(ui, st));

            egui::CollapsingHeader::new("Status thresholds")
                .default_open(false)
                .show(ui, |ui| {
                    ui.add(
                        egui::Slider::new(&mut st.cfg.stale_after_secs, 1.0..=120.0)
                            .text("stale after (s)"),
                    );
                    ui.add(
                        egui::Slider::new(&mut st.cfg.offline_after_secs, 1.0..=300.0)
                            .text("offline after (s)"),
                    );
                    ui.label("Applied from the next poll.");
                });

            ui.add_space(8.0);
            if ui.button("Save settings").clicked() {
                persist(st);
            }
        });
}

fn inspector_section(ui: &mut egui::Ui, st: &mut GraphState) {
    let (node, resolved) = match st.selection.inspector() {
        Inspector::Placeholder => {
            ui.label("Click a node to inspect it.");
            return;
        }
        Inspector::Entity { node, resolved } => (node.clone(), *resolved),
    };

    ui.label(egui::RichText::new(&node.label).strong());
    if !resolved {
        ui.colored_label(
            egui::Color32::from_rgb(230, 170, 60),
            "No longer in the latest snapshot; showing last known data.",
        );
    }
    egui::Grid::new("inspector_rows")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for (k, v) in detail_rows(&node) {
                ui.label(k);
                ui.label(v);
                ui.end_row();
            }
        });

    let NodeKind::Sensing { raw_id, .. } = &node.kind else {
        return;
    };
    if let Some(charted) = st.charted_node() {
        ui.label(format!("History chart: node {charted}"));
    }

    ui.add_space(6.0);
    ui.label(format!("Alias (max {MAX_ALIAS_LEN} chars):"));
    ui.text_edit_singleline(&mut st.ui.alias_draft);
    ui.horizontal(|ui| {
        if ui.button("Set alias").clicked() {
            let draft = st.ui.alias_draft.clone();
            match st.set_alias(raw_id, &draft) {
                Ok(()) => {
                    st.ui.alias_error = None;
                    persist(st);
                }
                Err(e) => {
                    tracing::warn!(node = %raw_id, error = %e, "rejected alias");
                    st.ui.alias_error = Some(e.to_string());
                }
            }
        }
        if st.cfg.aliases.contains_key(raw_id.as_str()) && ui.button("Clear").clicked() {
            st.clear_alias(raw_id);
            st.ui.alias_error = None;
            persist(st);
        }
    });
    if let Some(err) = &st.ui.alias_error {
        ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err.as_str());
    }
}

fn layout_section(ui: &mut egui::Ui, st: &mut GraphState) {
    let before = st.cfg.layout.clone();
    let l = &mut st.cfg.layout;
    ui.add(egui::Slider::new(&mut l.wireless_distance, 10.0..=300.0).text("wireless link"));
    ui.add(egui::Slider::new(&mut l.mesh_distance, 10.0..=300.0).text("mesh link"));
    ui.add(egui::Slider::new(&mut l.relayed_distance, 10.0..=400.0).text("relayed link"));
    ui.add(egui::Slider::new(&mut l.charge, -1000.0..=0.0).text("charge"));
    ui.add(egui::Slider::new(&mut l.collide_radius, 0.0..=80.0).text("collide radius"));
    ui.add(egui::Slider::new(&mut l.velocity_decay, 0.05..=0.95).text("velocity decay"));
    if st.cfg.layout != before {
        st.apply_layout_config();
    }

    ui.label(format!(
        "energy: {:.3} (target {:.2}){}",
        st.layout.energy(),
        st.layout.energy_target(),
        if st.layout.is_settled() { ", settled" } else { "" }
    ));
    if ui.button("Re-layout").clicked() {
        st.layout.reheat();
    }
}

fn persist(st: &GraphState) {
    if let Err(e) = config::save(&st.cfg) {
        tracing::warn!(error = %format!("{e:#}"), "failed to save viewer config");
    }
}
