use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::graph::GraphState;

pub fn setup_scene(mut commands: Commands, windows: Query<&Window>, mut st: ResMut<GraphState>) {
    commands.spawn(Camera2dBundle::default());

    if let Ok(window) = windows.get_single() {
        st.resize(Vec2::new(window.width(), window.height()));
    }
}

/// Re-centers the layout on the new viewport with a mild bump.
pub fn window_resized(mut ev: EventReader<WindowResized>, mut st: ResMut<GraphState>) {
    if let Some(last) = ev.read().last() {
        st.resize(Vec2::new(last.width, last.height));
    }
}
