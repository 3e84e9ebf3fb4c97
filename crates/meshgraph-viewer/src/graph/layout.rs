use bevy::prelude::Vec2;
use meshgraph_core::NodeId;
use std::collections::HashMap;

use crate::graph::model::LinkKind;
use crate::graph::reconcile::{LiveGraph, ReconcileOutcome};
use crate::graph::tick::TickSource;
use crate::util::ids::stable_u32;

const INITIAL_RADIUS: f32 = 10.0;
const MIN_DISTANCE2: f32 = 1.0;

/// Layout-owned attributes of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub pin: Option<Vec2>,
}

impl Body {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            pin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub wireless_distance: f32,
    pub mesh_distance: f32,
    pub relayed_distance: f32,
    pub link_strength: f32,
    pub charge: f32,
    pub collide_radius: f32,
    pub collide_strength: f32,
    pub center_strength: f32,
    pub velocity_decay: f32,
    pub energy_min: f32,
    pub energy_decay: f32,
    pub nudge_energy: f32,
    pub resize_energy: f32,
    pub drag_energy: f32,
    pub seed_radius: f32,
    pub steps_per_second: f32,
    pub max_steps_per_tick: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            wireless_distance: 60.0,
            mesh_distance: 110.0,
            relayed_distance: 160.0,
            link_strength: 1.0,
            charge: -300.0,
            collide_radius: 28.0,
            collide_strength: 0.7,
            center_strength: 0.1,
            velocity_decay: 0.4,
            energy_min: 0.001,
            // reaches energy_min from 1.0 in ~300 steps
            energy_decay: 1.0 - 0.001f32.powf(1.0 / 300.0),
            nudge_energy: 0.1,
            resize_energy: 0.3,
            drag_energy: 0.3,
            seed_radius: 40.0,
            steps_per_second: 60.0,
            max_steps_per_tick: 4,
        }
    }
}

impl LayoutParams {
    pub fn rest_length(&self, kind: LinkKind) -> f32 {
        match kind {
            LinkKind::WirelessDirect => self.wireless_distance,
            LinkKind::MeshDirect => self.mesh_distance,
            LinkKind::MeshRelayed => self.relayed_distance,
        }
    }
}

/// Continuous force simulation over the live graph.
///
/// Bodies are keyed by node id and outlive generations for as long as the id
/// does. `energy` scales every force and relaxes toward `energy_target` each
/// step; once both are under `energy_min` the engine stops stepping.
pub struct LayoutEngine {
    pub params: LayoutParams,
    bodies: HashMap<NodeId, Body>,
    energy: f32,
    energy_target: f32,
    center: Vec2,
    accumulator: f32,
    jiggle_state: u32,
    steps: u64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutParams::default(), Vec2::ZERO)
    }
}

impl LayoutEngine {
    pub fn new(params: LayoutParams, center: Vec2) -> Self {
        Self {
            params,
            bodies: HashMap::new(),
            energy: 1.0,
            energy_target: 0.0,
            center,
            accumulator: 0.0,
            jiggle_state: 1,
            steps: 0,
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn energy_target(&self) -> f32 {
        self.energy_target
    }

    pub fn set_energy_target(&mut self, target: f32) {
        self.energy_target = target.clamp(0.0, 1.0);
    }

    pub fn is_settled(&self) -> bool {
        self.energy < self.params.energy_min && self.energy_target < self.params.energy_min
    }

    /// Full re-layout, as on a cold start.
    pub fn reheat(&mut self) {
        self.energy = 1.0;
    }

    /// Raises energy to at least `amount`; never lowers it.
    pub fn nudge(&mut self, amount: f32) {
        self.energy = self.energy.max(amount.clamp(0.0, 1.0));
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn resize(&mut self, size: Vec2) {
        self.center = size * 0.5;
        self.nudge(self.params.resize_energy);
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn body(&self, id: &NodeId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn position(&self, id: &NodeId) -> Option<Vec2> {
        self.bodies.get(id).map(|b| b.pos)
    }

    pub fn pin(&mut self, id: &NodeId, at: Vec2) -> bool {
        let Some(b) = self.bodies.get_mut(id) else {
            return false;
        };
        b.pin = Some(at);
        b.pos = at;
        b.vel = Vec2::ZERO;
        true
    }

    pub fn unpin(&mut self, id: &NodeId) {
        if let Some(b) = self.bodies.get_mut(id) {
            b.pin = None;
        }
    }

    /// Nearest body within `radius` of `at`.
    pub fn pick(&self, at: Vec2, radius: f32) -> Option<NodeId> {
        let mut best: Option<(f32, &NodeId)> = None;
        for (id, b) in self.bodies.iter() {
            let d = b.pos.distance(at);
            if d < radius && best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, id));
            }
        }
        best.map(|(_, id)| id.clone())
    }

    /// Brings bodies in line with a freshly reconciled generation.
    ///
    /// Bodies of removed nodes are dropped, new nodes get a seeded position
    /// next to their parent, and energy is reset or nudged depending on
    /// whether the node count changed.
    pub fn sync(&mut self, live: &LiveGraph, outcome: &ReconcileOutcome) {
        let ids = live.ids();
        self.bodies.retain(|id, _| ids.contains(id));

        let mut missing: Vec<(usize, usize, &NodeId)> = live
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !self.bodies.contains_key(&n.id))
            .map(|(i, n)| (depth(live, &n.id), i, &n.id))
            .collect();
        missing.sort();
        for (_, i, id) in missing {
            let pos = self.seed_position(live, id, i);
            self.bodies.insert(id.clone(), Body::at(pos));
        }

        if outcome.count_changed {
            self.reheat();
        } else {
            self.nudge(self.params.nudge_energy);
        }
    }

    fn seed_position(&self, live: &LiveGraph, id: &NodeId, index: usize) -> Vec2 {
        let angle = stable_u32(id.as_str()) as f32 / u32::MAX as f32 * std::f32::consts::TAU;
        if let Some(parent) = live.parent_of(id).and_then(|p| self.bodies.get(p)) {
            return parent.pos + Vec2::from_angle(angle) * self.params.seed_radius;
        }
        // phyllotaxis arrangement around the center
        let golden = std::f32::consts::PI * (3.0 - 5f32.sqrt());
        let r = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
        let a = index as f32 * golden;
        self.center + Vec2::new(r * a.cos(), r * a.sin())
    }

    /// Drains `ticks`, stepping at a fixed rate. Returns the number of steps taken.
    pub fn run<T: TickSource>(&mut self, ticks: &mut T, live: &LiveGraph) -> usize {
        let step_dt = 1.0 / self.params.steps_per_second.max(1.0);
        let max_steps = self.params.max_steps_per_tick.max(1);
        let mut total = 0;

        while let Some(tick) = ticks.next_tick() {
            if self.is_settled() {
                self.accumulator = 0.0;
                continue;
            }
            self.accumulator += tick.dt.max(0.0);
            let mut n = 0;
            while self.accumulator >= step_dt && n < max_steps {
                self.accumulator -= step_dt;
                if !self.step(live) {
                    break;
                }
                n += 1;
            }
            // Drop the backlog after a long frame instead of spiralling.
            self.accumulator = self.accumulator.min(step_dt);
            total += n;
        }
        total
    }

    /// Advances the simulation by one increment. Returns false when settled.
    pub fn step(&mut self, live: &LiveGraph) -> bool {
        if self.is_settled() {
            return false;
        }
        self.energy += (self.energy_target - self.energy) * self.params.energy_decay;

        let ids: Vec<&NodeId> = live
            .nodes
            .iter()
            .map(|n| &n.id)
            .filter(|id| self.bodies.contains_key(*id))
            .collect();
        if ids.is_empty() {
            return true;
        }
        let index: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut pos: Vec<Vec2> = ids.iter().map(|id| self.bodies[*id].pos).collect();
        let mut vel: Vec<Vec2> = ids.iter().map(|id| self.bodies[*id].vel).collect();
        let pins: Vec<Option<Vec2>> = ids.iter().map(|id| self.bodies[*id].pin).collect();
        let energy = self.energy;

        // springs
        let mut degree = vec![0usize; ids.len()];
        let links: Vec<(usize, usize, f32)> = live
            .links
            .iter()
            .filter_map(|l| {
                let s = *index.get(&l.source)?;
                let t = *index.get(&l.target)?;
                Some((s, t, self.params.rest_length(l.kind)))
            })
            .collect();
        for &(s, t, _) in &links {
            degree[s] += 1;
            degree[t] += 1;
        }
        for &(s, t, rest) in &links {
            let mut d = (pos[t] + vel[t]) - (pos[s] + vel[s]);
            if d == Vec2::ZERO {
                d = self.jiggle_vec();
            }
            let len = d.length();
            let strength = self.params.link_strength / degree[s].min(degree[t]) as f32;
            let k = (len - rest) / len * energy * strength;
            let d = d * k;
            let bias = degree[s] as f32 / (degree[s] + degree[t]) as f32;
            vel[t] -= d * bias;
            vel[s] += d * (1.0 - bias);
        }

        // charge and collision
        let r = self.params.collide_radius;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let mut d = pos[j] - pos[i];
                let mut l2 = d.length_squared();
                if l2 == 0.0 {
                    d = self.jiggle_vec();
                    l2 = d.length_squared();
                }
                if l2 < MIN_DISTANCE2 {
                    l2 = (MIN_DISTANCE2 * l2).sqrt();
                }
                let w = self.params.charge * energy / l2;
                vel[i] += d * w;
                vel[j] -= d * w;

                let mut c = (pos[i] + vel[i]) - (pos[j] + vel[j]);
                let min_sep = 2.0 * r;
                let cl2 = c.length_squared();
                if cl2 < min_sep * min_sep {
                    if cl2 == 0.0 {
                        c = self.jiggle_vec();
                    }
                    let cl = c.length();
                    let push = c * ((min_sep - cl) / cl * self.params.collide_strength * 0.5);
                    vel[i] += push;
                    vel[j] -= push;
                }
            }
        }

        // centering
        let free: Vec<usize> = (0..ids.len()).filter(|&i| pins[i].is_none()).collect();
        if !free.is_empty() {
            let mean = pos.iter().copied().sum::<Vec2>() / ids.len() as f32;
            let shift = (self.center - mean) * self.params.center_strength;
            for &i in &free {
                pos[i] += shift;
            }
        }

        let keep = 1.0 - self.params.velocity_decay;
        for (i, id) in ids.iter().enumerate() {
            let Some(b) = self.bodies.get_mut(*id) else {
                continue;
            };
            match pins[i] {
                Some(p) => {
                    b.pos = p;
                    b.vel = Vec2::ZERO;
                }
                None => {
                    b.vel = vel[i] * keep;
                    b.pos = pos[i] + b.vel;
                }
            }
        }

        self.steps += 1;
        true
    }

    // Deterministic tiny displacement for coincident points.
    fn jiggle_vec(&mut self) -> Vec2 {
        Vec2::new(self.jiggle(), self.jiggle())
    }

    fn jiggle(&mut self) -> f32 {
        self.jiggle_state = self.jiggle_state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((self.jiggle_state >> 8) as f32 / (1u32 << 24) as f32 - 0.5) * 1e-3
    }
}

fn depth(live: &LiveGraph, id: &NodeId) -> usize {
    let mut cur = id;
    let mut d = 0;
    while let Some(p) = live.parent_of(cur) {
        d += 1;
        if d > 8 {
            break;
        }
        cur = p;
    }
    d
}
