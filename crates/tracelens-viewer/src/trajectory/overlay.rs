use bevy::math::Vec2;
use bevy_egui::egui::{Color32, Stroke};

use super::path::Trajectory;
use crate::canvas::surface::Surface;

const UNDERLAY_WIDTH: f32 = 1.0;
const UNDERLAY_ALPHA: f32 = 0.1;
const REVEAL_WIDTH: f32 = 1.5;
const REVEAL_ALPHA: f32 = 0.6;
const MARKER_RADIUS: f32 = 5.0;
const MARKER_ALPHA: f32 = 0.8;
const MARKER_OUTLINE: f32 = 1.5;

/// Draw the path on top of the point layers: faint full underlay, the
/// revealed prefix, and a marker on the snapped sentence. Screen pixels,
/// scaled only by `dpr`.
pub fn paint_trajectory<S: Surface>(
    surface: &mut S,
    path: &Trajectory,
    reveal: f32,
    marker: Option<usize>,
    dpr: f32,
) {
    if !path.is_drawable() {
        return;
    }
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let to_device = |pts: Vec<Vec2>| pts.into_iter().map(|p| p * dpr).collect::<Vec<_>>();

    surface.polyline(
        &to_device(path.screen_points()),
        Stroke::new(UNDERLAY_WIDTH * dpr, Color32::BLACK.gamma_multiply(UNDERLAY_ALPHA)),
    );

    let revealed = path.clip(reveal);
    if revealed.len() >= 2 {
        surface.polyline(
            &to_device(revealed),
            Stroke::new(REVEAL_WIDTH * dpr, Color32::BLACK.gamma_multiply(REVEAL_ALPHA)),
        );
    }

    if let Some(vertex) = marker.and_then(|s| path.vertex_of(s)) {
        surface.circle(
            vertex.screen * dpr,
            MARKER_RADIUS * dpr,
            Color32::BLACK.gamma_multiply(MARKER_ALPHA),
            Stroke::new(MARKER_OUTLINE * dpr, Color32::WHITE),
        );
    }
}
