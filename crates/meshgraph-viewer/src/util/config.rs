use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::graph::layout::LayoutParams;
use crate::graph::model::StatusThresholds;

pub const MAX_ALIAS_LEN: usize = 50;
// Lowest energy decay accepted from the config file.
const MIN_ENERGY_DECAY: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub wireless_distance: f32,
    pub mesh_distance: f32,
    pub relayed_distance: f32,
    pub charge: f32,
    pub collide_radius: f32,
    pub velocity_decay: f32,
    pub energy_min: f32,
    pub energy_decay: f32,
    pub nudge_energy: f32,
    pub resize_energy: f32,
    pub drag_energy: f32,
    pub steps_per_second: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let p = LayoutParams::default();
        Self {
            wireless_distance: p.wireless_distance,
            mesh_distance: p.mesh_distance,
            relayed_distance: p.relayed_distance,
            charge: p.charge,
            collide_radius: p.collide_radius,
            velocity_decay: p.velocity_decay,
            energy_min: p.energy_min,
            energy_decay: p.energy_decay,
            nudge_energy: p.nudge_energy,
            resize_energy: p.resize_energy,
            drag_energy: p.drag_energy,
            steps_per_second: p.steps_per_second,
        }
    }
}

impl LayoutConfig {
    pub fn to_params(&self) -> LayoutParams {
        LayoutParams {
            wireless_distance: self.wireless_distance.max(1.0),
            mesh_distance: self.mesh_distance.max(1.0),
            relayed_distance: self.relayed_distance.max(1.0),
            charge: self.charge,
            collide_radius: self.collide_radius.max(0.0),
            velocity_decay: self.velocity_decay.clamp(0.0, 1.0),
            energy_min: self.energy_min.max(0.0),
            energy_decay: self.energy_decay.clamp(MIN_ENERGY_DECAY, 1.0),
            nudge_energy: self.nudge_energy.clamp(0.0, 1.0),
            resize_energy: self.resize_energy.clamp(0.0, 1.0),
            drag_energy: self.drag_energy.clamp(0.0, 1.0),
            steps_per_second: self.steps_per_second.max(1.0),
            ..LayoutParams::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub sock_path: String,
    pub poll_interval_ms: u64,
    pub stale_after_secs: f64,
    pub offline_after_secs: f64,
    pub show_links: bool,
    pub show_labels: bool,
    pub layout: LayoutConfig,
    /// Raw snapshot node id -> display name.
    pub aliases: BTreeMap<String, String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let t = StatusThresholds::default();
        Self {
            sock_path: default_uds_path(),
            poll_interval_ms: 2000,
            stale_after_secs: t.stale_after,
            offline_after_secs: t.offline_after,
            show_links: true,
            show_labels: true,
            layout: LayoutConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

impl ViewerConfig {
    pub fn thresholds(&self) -> StatusThresholds {
        StatusThresholds {
            stale_after: self.stale_after_secs,
            offline_after: self.offline_after_secs.max(self.stale_after_secs),
        }
    }
}

pub fn validate_alias(alias: &str) -> anyhow::Result<String> {
    let alias = alias.trim();
    if alias.is_empty() {
        anyhow::bail!("alias is required");
    }
    if alias.chars().count() > MAX_ALIAS_LEN {
        anyhow::bail!("alias must be {MAX_ALIAS_LEN} chars or less");
    }
    Ok(alias.to_string())
}

fn default_uds_path() -> String {
    static CACHED: OnceLock<String> = OnceLock::new();
    CACHED
        .get_or_init(|| {
            if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
                format!("{dir}/meshgraph.sock")
            } else {
                "/tmp/meshgraph.sock".to_string()
            }
        })
        .clone()
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "meshgraph")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable viewer config");
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        let mut cfg = ViewerConfig::default();
        cfg.aliases.insert("2".to_string(), "Pump".to_string());

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "poll_interval_ms = 500\n[aliases]\n\"1\" = \"Roof\"\n").expect("write");

        let cfg = load_or_default_from_path(&path);
        assert_eq!(cfg.poll_interval_ms, 500);
        assert_eq!(cfg.aliases.get("1").map(String::as_str), Some("Roof"));
        assert_eq!(cfg.stale_after_secs, 12.0);
        assert_eq!(cfg.layout, LayoutConfig::default());
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "poll_interval_ms = \"often\"").expect("write");
        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }

    #[test]
    fn zero_energy_decay_is_raised_to_floor() {
        let layout = LayoutConfig {
            energy_decay: 0.0,
            ..LayoutConfig::default()
        };
        assert_eq!(layout.to_params().energy_decay, MIN_ENERGY_DECAY);

        let layout = LayoutConfig {
            energy_decay: 2.0,
            ..LayoutConfig::default()
        };
        assert_eq!(layout.to_params().energy_decay, 1.0);
        assert_eq!(
            LayoutConfig::default().to_params().energy_decay,
            LayoutParams::default().energy_decay
        );
    }

    #[test]
    fn alias_validation() {
        assert_eq!(validate_alias("  Pump  ").expect("valid"), "Pump");
        assert!(validate_alias("   ").is_err());
        assert!(validate_alias(&"x".repeat(MAX_ALIAS_LEN + 1)).is_err());
        assert!(validate_alias(&"x".repeat(MAX_ALIAS_LEN)).is_ok());
    }
}
