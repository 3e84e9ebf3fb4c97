pub mod camera;
pub mod spatial;

pub use camera::{setup_scene, window_resized};
pub use spatial::{draw_graph, pointer_input, step_layout, NODE_RADIUS};
