mod app;
mod graph;
mod net;
mod render;
mod ui;
mod util;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::app::resources::NetRx;
use crate::app::MeshGraphViewerPlugin;
use crate::util::config;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_tracing();

    let cfg = config::load_or_default();
    tracing::info!(socket = %cfg.sock_path, interval_ms = cfg.poll_interval_ms, "polling agent");

    let (tx, rx) = crossbeam_channel::unbounded();
    net::spawn_poller(
        cfg.sock_path.clone(),
        Duration::from_millis(cfg.poll_interval_ms.max(100)),
        tx,
    );

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "MeshGraph".into(),
                        ..default()
                    }),
                    ..default()
                })
                .disable::<bevy::log::LogPlugin>(),
        )
        .add_plugins(EguiPlugin)
        .insert_resource(NetRx(rx))
        .add_plugins(MeshGraphViewerPlugin { cfg })
        .run();
}
