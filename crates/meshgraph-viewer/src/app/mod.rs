use bevy::prelude::*;

use crate::app::resources::NetRx;
use crate::graph::state::unix_now;
use crate::graph::GraphState;
use crate::util::config::ViewerConfig;

pub mod resources;

pub struct MeshGraphViewerPlugin {
    pub cfg: ViewerConfig,
}

impl Plugin for MeshGraphViewerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GraphState::from_config(self.cfg.clone()))
            .add_systems(Startup, crate::render::setup_scene)
            .add_systems(
                Update,
                (
                    // a generation is fully applied before this frame's layout step
                    (
                        pump_network,
                        crate::render::window_resized,
                        crate::render::pointer_input,
                        crate::render::step_layout,
                        crate::render::draw_graph,
                    )
                        .chain(),
                    (
                        crate::ui::ui_panel,
                        crate::ui::hud_overlay,
                        crate::ui::draw_labels,
                        crate::ui::hover_tooltip,
                    )
                        .chain()
                        .after(crate::render::step_layout),
                    crate::graph::tick_housekeeping,
                ),
            );
    }
}

fn pump_network(mut st: ResMut<GraphState>, rx: Res<NetRx>) {
    for inc in rx.0.try_iter().take(64) {
        st.apply(inc, unix_now());
    }
}
