pub mod interaction;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod reconcile;
pub mod selection;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod topology;

pub use metrics::tick_housekeeping;
pub use state::GraphState;
