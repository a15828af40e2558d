use bevy::math::Vec2;
use tracelens_core::Point;

use super::scale::Scales;
use super::transform::ZoomTransform;

/// Screen-space pick radius for hover and click.
pub const HIT_RADIUS: f32 = 15.0;

/// Index of the point nearest to `cursor` (container pixels) within `radius`
/// screen pixels, under the composed scale + transform.
///
/// The cursor is pulled back into base-scaled space and compared against each
/// point's base-scaled position with the radius shrunk by the zoom. Full scan;
/// on exact distance ties the lowest index wins, a point exactly on the
/// radius is a miss.
pub fn nearest_point(
    points: &[Point],
    cursor: Vec2,
    radius: f32,
    scales: &Scales,
    transform: &ZoomTransform,
) -> Option<usize> {
    let target = transform.invert(cursor);
    let r = radius / transform.k;
    let mut best_dist = r * r;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        let d = scales.project_point(p).distance_squared(target);
        if d < best_dist {
            best_dist = d;
            best = Some(i);
        }
    }
    best
}

/// First point of `case` whose sentence index matches, used when the hover
/// originates from the transcript rather than the canvas.
pub fn point_for_sentence(points: &[Point], case: u32, sentence: u32) -> Option<usize> {
    points
        .iter()
        .position(|p| p.case == case && p.sentence == sentence)
}

/// Hover index the renderer should emphasise: a sentence hover in the
/// active case takes precedence over the canvas hover.
pub fn effective_hover(
    points: &[Point],
    hovered_point: Option<usize>,
    hovered_sentence: Option<usize>,
    active_case: Option<u32>,
) -> Option<usize> {
    if let (Some(sentence), Some(case)) = (hovered_sentence, active_case) {
        if let Some(idx) = u32::try_from(sentence)
            .ok()
            .and_then(|s| point_for_sentence(points, case, s))
        {
            return Some(idx);
        }
    }
    hovered_point.filter(|&i| i < points.len())
}
