//! Animated path through one case's sentence embeddings.

pub mod animator;
pub mod overlay;
pub mod path;

pub use animator::{ease_in_out, TrajectoryAnimator, TrajectoryEvent, PLAY_DURATION};
pub use overlay::paint_trajectory;
pub use path::{arc_length_fractions, Trajectory, Vertex};
