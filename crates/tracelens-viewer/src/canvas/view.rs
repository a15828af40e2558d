use std::sync::Arc;

use bevy::math::{UVec2, Vec2};
use smallvec::SmallVec;
use tracelens_core::{ColorMode, Point};

use super::palette::Palette;
use super::query::{effective_hover, nearest_point, HIT_RADIUS};
use super::render::{render_points, FrameStats, RenderParams};
use super::scale::Scales;
use super::schedule::{RedrawReason, RedrawScheduler};
use super::surface::{DisplayList, Surface};
use super::transform::{wheel_factor, ZoomTransform};
use crate::trajectory::{paint_trajectory, Trajectory};

/// Pointer and gesture input, positions in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Move(Vec2),
    Leave,
    Click(Vec2),
    Drag(Vec2),
    Wheel { anchor: Vec2, delta_y: f32 },
    Pinch { anchor: Vec2, factor: f32 },
}

/// Base scales plus the current pan/zoom, as handed to listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewScales {
    pub scales: Scales,
    pub transform: ZoomTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    Hover(Option<usize>),
    Click { case: u32, sentence: u32 },
    ScalesChanged(ViewScales),
}

pub type ViewEvents = SmallVec<[ViewEvent; 2]>;

/// Trajectory overlay for one paint.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryLayer<'a> {
    pub path: &'a Trajectory,
    pub reveal: f32,
    pub marker: Option<usize>,
}

/// Externally owned state a paint reads.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub palette: &'a Palette,
    pub color_mode: ColorMode,
    pub active_case: Option<u32>,
    pub hovered_sentence: Option<usize>,
    pub trajectory: Option<TrajectoryLayer<'a>>,
}

/// Interactive point-cloud view: owns the transform, the fitted scales, the
/// redraw scheduler and the retained frame.
#[derive(Debug)]
pub struct PointCloudView {
    points: Arc<[Point]>,
    scales: Scales,
    transform: ZoomTransform,
    container: Vec2,
    dpr: f32,
    hit_radius: f32,
    hover: Option<usize>,
    scheduler: RedrawScheduler,
    frame: DisplayList,
    stats: FrameStats,
    closed: bool,
}

impl Default for PointCloudView {
    fn default() -> Self {
        Self::new(HIT_RADIUS)
    }
}

impl PointCloudView {
    pub fn new(hit_radius: f32) -> Self {
        Self {
            points: Arc::from(Vec::new()),
            scales: Scales::IDENTITY,
            transform: ZoomTransform::IDENTITY,
            container: Vec2::ZERO,
            dpr: 1.0,
            hit_radius: if hit_radius > 0.0 { hit_radius } else { HIT_RADIUS },
            hover: None,
            scheduler: RedrawScheduler::default(),
            frame: DisplayList::default(),
            stats: FrameStats::default(),
            closed: false,
        }
    }

    pub fn points(&self) -> &Arc<[Point]> {
        &self.points
    }

    pub fn scales(&self) -> &Scales {
        &self.scales
    }

    pub fn transform(&self) -> &ZoomTransform {
        &self.transform
    }

    pub fn view_scales(&self) -> ViewScales {
        ViewScales {
            scales: self.scales,
            transform: self.transform,
        }
    }

    pub fn container(&self) -> Vec2 {
        self.container
    }

    pub fn dpr(&self) -> f32 {
        self.dpr
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hover
    }

    pub fn frame(&self) -> &DisplayList {
        &self.frame
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn scheduler(&self) -> &RedrawScheduler {
        &self.scheduler
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Swap in a new point set. Held indices are dropped and the scales are
    /// refit; the transform is kept.
    pub fn set_points(&mut self, points: Arc<[Point]>) -> ViewEvents {
        let mut events = ViewEvents::new();
        if Arc::ptr_eq(&self.points, &points) {
            return events;
        }
        self.points = points;
        self.closed = false;
        if self.hover.take().is_some() {
            events.push(ViewEvent::Hover(None));
        }
        self.refit();
        self.scheduler.request(RedrawReason::Points);
        events.push(ViewEvent::ScalesChanged(self.view_scales()));
        events
    }

    /// Container size in logical pixels and the device pixel ratio. The
    /// surface is resized at the start of the next paint.
    pub fn resize(&mut self, container: Vec2, dpr: f32) -> Option<ViewEvent> {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        if container == self.container && dpr == self.dpr {
            return None;
        }
        let refit = container != self.container;
        self.container = container;
        self.dpr = dpr;
        self.scheduler.request_resize(device_size(container, dpr));
        if !refit {
            return None;
        }
        self.refit();
        self.scheduler.request(RedrawReason::Scales);
        Some(ViewEvent::ScalesChanged(self.view_scales()))
    }

    /// Apply one input synchronously. Transform changes are visible to the
    /// next hit test at once; the repaint is only scheduled.
    pub fn handle(&mut self, input: PointerInput) -> ViewEvents {
        let mut events = ViewEvents::new();
        if self.closed {
            return events;
        }
        match input {
            PointerInput::Move(cursor) => {
                let hit = self.hit_test(cursor);
                if hit != self.hover {
                    self.hover = hit;
                    self.scheduler.request(RedrawReason::Hover);
                }
                events.push(ViewEvent::Hover(hit));
            }
            PointerInput::Leave => {
                if self.hover.take().is_some() {
                    self.scheduler.request(RedrawReason::Hover);
                }
                events.push(ViewEvent::Hover(None));
            }
            PointerInput::Click(cursor) => {
                if let Some(p) = self.hit_test(cursor).and_then(|i| self.points.get(i)) {
                    events.push(ViewEvent::Click {
                        case: p.case,
                        sentence: p.sentence,
                    });
                }
            }
            PointerInput::Drag(delta) => {
                if delta != Vec2::ZERO && delta.is_finite() {
                    self.transform.pan_by(delta);
                    self.transform_changed(&mut events);
                }
            }
            PointerInput::Wheel { anchor, delta_y } => {
                if self.transform.zoom_at(anchor, wheel_factor(delta_y)) {
                    self.transform_changed(&mut events);
                }
            }
            PointerInput::Pinch { anchor, factor } => {
                if self.transform.zoom_at(anchor, factor) {
                    self.transform_changed(&mut events);
                }
            }
        }
        events
    }

    /// Mark the view dirty for a change it does not own (colour mode,
    /// active case, external hover, trajectory).
    pub fn request_redraw(&mut self, reason: RedrawReason) {
        if !self.closed {
            self.scheduler.request(reason);
        }
    }

    /// Drop the pointer hover without a pointer event. Returns whether a
    /// hover was held.
    pub fn clear_hover(&mut self) -> bool {
        if self.hover.take().is_none() {
            return false;
        }
        if !self.closed {
            self.scheduler.request(RedrawReason::Hover);
        }
        true
    }

    pub fn reset_view(&mut self) -> Option<ViewEvent> {
        if self.transform == ZoomTransform::IDENTITY {
            return None;
        }
        self.transform = ZoomTransform::IDENTITY;
        self.scheduler.request(RedrawReason::Transform);
        Some(ViewEvent::ScalesChanged(self.view_scales()))
    }

    /// Paint at a frame boundary if anything is pending. Returns whether the
    /// retained frame was rebuilt.
    pub fn paint(&mut self, scene: &Scene<'_>) -> bool {
        let Some(plan) = self.scheduler.begin_frame() else {
            return false;
        };
        if let Some(size) = plan.resize {
            self.frame.resize(size);
        }

        let hovered = effective_hover(
            &self.points,
            self.hover,
            scene.hovered_sentence,
            scene.active_case,
        );
        self.stats = render_points(
            &mut self.frame,
            &RenderParams {
                points: &self.points,
                scales: &self.scales,
                transform: &self.transform,
                palette: scene.palette,
                color_mode: scene.color_mode,
                active_case: scene.active_case,
                hovered,
                dpr: self.dpr,
            },
        );
        if let Some(layer) = scene.trajectory {
            paint_trajectory(&mut self.frame, layer.path, layer.reveal, layer.marker, self.dpr);
        }
        tracing::trace!(reasons = ?plan.reasons, stats = ?self.stats, "canvas repaint");
        true
    }

    /// Release the view: pending frame dropped, points and hover cleared,
    /// further input ignored until new points arrive.
    pub fn close(&mut self) {
        self.scheduler.cancel();
        self.frame.clear();
        self.points = Arc::from(Vec::new());
        self.hover = None;
        self.closed = true;
    }

    fn hit_test(&self, cursor: Vec2) -> Option<usize> {
        nearest_point(&self.points, cursor, self.hit_radius, &self.scales, &self.transform)
    }

    fn refit(&mut self) {
        self.scales = Scales::fit(&self.points, self.container);
    }

    fn transform_changed(&mut self, events: &mut ViewEvents) {
        self.scheduler.request(RedrawReason::Transform);
        events.push(ViewEvent::ScalesChanged(self.view_scales()));
    }
}

/// Physical surface size for a logical container.
pub fn device_size(container: Vec2, dpr: f32) -> UVec2 {
    (container * dpr).round().as_uvec2()
}
