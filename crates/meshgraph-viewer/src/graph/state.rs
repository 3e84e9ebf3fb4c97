use bevy::prelude::{Resource, Vec2};
use meshgraph_core::{MeshState, NodeId};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::graph::interaction::{InteractionController, PointerId};
use crate::graph::layout::LayoutEngine;
use crate::graph::model::NodeKind;
use crate::graph::reconcile::{LiveGraph, ReconcileOutcome};
use crate::graph::selection::{Propagation, SelectionController};
use crate::graph::snapshot::SnapshotModel;
use crate::graph::tick::TickSource;
use crate::graph::topology::{infer, sensing_label, InferOptions};
use crate::net::Incoming;
use crate::util::config::{validate_alias, ViewerConfig};
use crate::util::ids::sensing_id;

/// Screen-space distance within which a pointer hits a node.
pub const PICK_RADIUS: f32 = 14.0;

#[derive(Default)]
pub struct UiState {
    pub hovered: Option<NodeId>,
    pub cursor: Option<Vec2>,
    pub alias_draft: String,
    pub alias_error: Option<String>,
}

pub struct PerfState {
    pub fps: f32,
    pub snapshots_applied: u64,
    pub fetch_failures: u64,
    pub last_fetch_error: Option<String>,
    pub last_outcome: ReconcileOutcome,
    pub last_snapshot_at: Option<Instant>,
    pub layout_steps_last_frame: usize,
}

impl Default for PerfState {
    fn default() -> Self {
        Self {
            fps: 0.0,
            snapshots_applied: 0,
            fetch_failures: 0,
            last_fetch_error: None,
            last_outcome: ReconcileOutcome::default(),
            last_snapshot_at: None,
            layout_steps_last_frame: 0,
        }
    }
}

/// Everything the frame loop mutates, owned in one place.
#[derive(Resource)]
pub struct GraphState {
    pub snapshot: Option<SnapshotModel>,
    pub live: LiveGraph,
    pub layout: LayoutEngine,
    pub selection: SelectionController,
    pub interaction: InteractionController,
    pub cfg: ViewerConfig,
    pub ui: UiState,
    pub perf: PerfState,
}

impl Default for GraphState {
    fn default() -> Self {
        Self::from_config(ViewerConfig::default())
    }
}

pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl GraphState {
    pub fn from_config(cfg: ViewerConfig) -> Self {
        Self {
            snapshot: None,
            live: LiveGraph::default(),
            layout: LayoutEngine::new(cfg.layout.to_params(), Vec2::ZERO),
            selection: SelectionController::default(),
            interaction: InteractionController::default(),
            cfg,
            ui: UiState::default(),
            perf: PerfState::default(),
        }
    }

    pub fn apply(&mut self, inc: Incoming, now: f64) {
        match inc {
            Incoming::Snapshot(state) => {
                self.apply_snapshot(state, now);
            }
            Incoming::FetchFailed(reason) => {
                // prior generation stays authoritative
                self.perf.fetch_failures += 1;
                self.perf.last_fetch_error = Some(reason);
            }
        }
    }

    /// Runs one full generation: inference, reconciliation, layout carry-over
    /// and re-energize, then selection refresh.
    pub fn apply_snapshot(&mut self, state: MeshState, now: f64) -> ReconcileOutcome {
        let snap = SnapshotModel::new(state);
        let inferred = infer(
            &snap,
            &InferOptions {
                now,
                thresholds: self.cfg.thresholds(),
                aliases: &self.cfg.aliases,
            },
        );
        let outcome = self.live.reconcile(inferred);
        self.layout.sync(&self.live, &outcome);
        self.interaction.retain_live(&self.live, &mut self.layout);
        self.selection.on_generation(&self.live);
        if let Some(h) = &self.ui.hovered {
            if !self.live.contains(h) {
                self.ui.hovered = None;
            }
        }

        tracing::debug!(
            generation = outcome.generation,
            added = outcome.added.len(),
            removed = outcome.removed.len(),
            updated = outcome.updated,
            reheat = outcome.count_changed,
            "applied snapshot"
        );

        self.snapshot = Some(snap);
        self.perf.snapshots_applied += 1;
        self.perf.last_snapshot_at = Some(Instant::now());
        self.perf.last_fetch_error = None;
        self.perf.last_outcome = outcome.clone();
        outcome
    }

    pub fn advance<T: TickSource>(&mut self, ticks: &mut T) -> usize {
        let n = self.layout.run(ticks, &self.live);
        self.perf.layout_steps_last_frame = n;
        n
    }

    pub fn resize(&mut self, size: Vec2) {
        self.layout.resize(size);
    }

    pub fn pick(&self, at: Vec2) -> Option<NodeId> {
        self.layout.pick(at, PICK_RADIUS)
    }

    /// Routes a click to the entity under the pointer, or to the background.
    pub fn handle_click(&mut self, hit: Option<&NodeId>) -> Propagation {
        if let Some(node) = hit.and_then(|id| self.live.node(id)) {
            let p = self.selection.on_entity_click(node);
            self.ui.alias_draft = node.label.clone();
            self.ui.alias_error = None;
            if p == Propagation::Stop {
                return p;
            }
        }
        self.selection.on_background_click();
        self.ui.alias_draft.clear();
        self.ui.alias_error = None;
        Propagation::Continue
    }

    /// Returns the node the pointer landed on, if any.
    pub fn pointer_down(&mut self, pointer: PointerId, at: Vec2) -> Option<NodeId> {
        let hit = self.pick(at);
        self.handle_click(hit.as_ref());
        let id = hit?;
        self.interaction.pointer_down(pointer, &id, &mut self.layout);
        Some(id)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, at: Vec2) {
        self.ui.cursor = Some(at);
        self.interaction.pointer_move(pointer, at, &mut self.layout);
        self.ui.hovered = match self.interaction.dragged_by(pointer) {
            Some(id) => Some(id.clone()),
            None => self.pick(at),
        };
    }

    pub fn pointer_up(&mut self, pointer: PointerId) {
        self.interaction.pointer_up(pointer, &mut self.layout);
    }

    pub fn pointer_left(&mut self) {
        self.ui.cursor = None;
        self.ui.hovered = None;
    }

    /// Raw snapshot id of the inspected sensing node, for the history chart.
    pub fn charted_node(&self) -> Option<&str> {
        self.selection.charted_node()
    }

    /// Sets a display alias for a sensing node and relabels it in place.
    pub fn set_alias(&mut self, raw_id: &str, alias: &str) -> anyhow::Result<()> {
        let alias = validate_alias(alias)?;
        self.cfg.aliases.insert(raw_id.to_string(), alias);
        self.relabel(raw_id);
        Ok(())
    }

    pub fn clear_alias(&mut self, raw_id: &str) {
        if self.cfg.aliases.remove(raw_id).is_some() {
            self.relabel(raw_id);
        }
    }

    fn relabel(&mut self, raw_id: &str) {
        let label = sensing_label(raw_id, &self.cfg.aliases);
        if let Some(node) = self.live.node_mut(&sensing_id(raw_id)) {
            if matches!(node.kind, NodeKind::Sensing { .. }) {
                node.label = label.clone();
            }
        }
        self.selection.on_generation(&self.live);
        if self.charted_node() == Some(raw_id) {
            self.ui.alias_draft = label;
        }
    }

    pub fn apply_layout_config(&mut self) {
        self.layout.params = self.cfg.layout.to_params();
        let nudge = self.layout.params.nudge_energy;
        self.layout.nudge(nudge);
    }
}
