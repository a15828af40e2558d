//! Point-cloud canvas: scales, pan/zoom, picking and layered painting.

pub mod palette;
pub mod query;
pub mod render;
pub mod scale;
pub mod schedule;
pub mod surface;
pub mod transform;
pub mod view;

pub use palette::Palette;
pub use schedule::RedrawReason;
pub use view::{PointCloudView, PointerInput, Scene, TrajectoryLayer, ViewEvent, ViewScales};
