use bevy::prelude::{Res, ResMut, Time};
use std::time::{Duration, Instant};

use crate::graph::state::GraphState;

pub fn tick_housekeeping(time: Res<Time>, mut st: ResMut<GraphState>) {
    let dt = time.delta_seconds().max(0.0001);
    st.perf.fps = 1.0 / dt;
}

impl GraphState {
    /// Time since the last applied snapshot.
    pub fn snapshot_age(&self, now: Instant) -> Option<Duration> {
        self.perf
            .last_snapshot_at
            .map(|t| now.saturating_duration_since(t))
    }

    /// True once no snapshot has landed for two poll intervals.
    pub fn is_feed_stale(&self, now: Instant) -> bool {
        let limit = Duration::from_millis(self.cfg.poll_interval_ms.saturating_mul(2));
        match self.snapshot_age(now) {
            Some(age) => age > limit,
            None => true,
        }
    }
}
