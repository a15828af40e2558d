use bevy::math::Vec2;
use bevy_egui::egui::{Color32, Stroke};
use tracelens_core::{ColorMode, Point};

use super::palette::Palette;
use super::scale::Scales;
use super::surface::Surface;
use super::transform::ZoomTransform;

/// Appearance of one emphasis layer, in base-scaled pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub radius: f32,
    pub alpha: f32,
    /// Outline width and its opacity.
    pub outline: Option<(f32, f32)>,
}

pub const BACKGROUND: LayerStyle = LayerStyle {
    radius: 3.0,
    alpha: 0.35,
    outline: None,
};

pub const ACTIVE_CASE: LayerStyle = LayerStyle {
    radius: 5.0,
    alpha: 0.9,
    outline: Some((0.5, 0.5)),
};

pub const HOVERED: LayerStyle = LayerStyle {
    radius: 7.0,
    alpha: 1.0,
    outline: Some((1.5, 1.0)),
};

/// Everything one paint reads. Nothing here is mutated by rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    pub points: &'a [Point],
    pub scales: &'a Scales,
    pub transform: &'a ZoomTransform,
    pub palette: &'a Palette,
    pub color_mode: ColorMode,
    pub active_case: Option<u32>,
    pub hovered: Option<usize>,
    pub dpr: f32,
}

/// Counts of what the last paint put on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub background: usize,
    pub active: usize,
    pub hovered: bool,
    pub culled: usize,
}

/// Maps base-scaled coordinates to device pixels: dpr, then translate, then k.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceMapping {
    pub dpr: f32,
    pub transform: ZoomTransform,
}

impl DeviceMapping {
    pub fn new(dpr: f32, transform: ZoomTransform) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { dpr, transform }
    }

    pub fn position(&self, scaled: Vec2) -> Vec2 {
        self.transform.apply(scaled) * self.dpr
    }

    /// Length in base-scaled pixels, grown by zoom and dpr.
    pub fn length(&self, scaled: f32) -> f32 {
        scaled * self.transform.k * self.dpr
    }
}

/// Paint the point cloud in three ordered layers: background, active case,
/// hovered point. Clears the surface first.
pub fn render_points<S: Surface>(surface: &mut S, params: &RenderParams<'_>) -> FrameStats {
    surface.clear();
    let mut stats = FrameStats::default();
    if params.points.is_empty() {
        return stats;
    }

    let mapping = DeviceMapping::new(params.dpr, *params.transform);
    let bounds = surface.size().as_vec2();
    let hovered = params.hovered.filter(|&i| i < params.points.len());
    let in_active = |p: &Point| params.active_case.is_some_and(|c| p.case == c);

    for (i, p) in params.points.iter().enumerate() {
        if Some(i) == hovered || in_active(p) {
            continue;
        }
        if draw_point(surface, &mapping, bounds, p, params, BACKGROUND) {
            stats.background += 1;
        } else {
            stats.culled += 1;
        }
    }

    if params.active_case.is_some() {
        for (i, p) in params.points.iter().enumerate() {
            if Some(i) == hovered || !in_active(p) {
                continue;
            }
            if draw_point(surface, &mapping, bounds, p, params, ACTIVE_CASE) {
                stats.active += 1;
            } else {
                stats.culled += 1;
            }
        }
    }

    if let Some(i) = hovered {
        stats.hovered = draw_point(surface, &mapping, bounds, &params.points[i], params, HOVERED);
    }
    stats
}

fn draw_point<S: Surface>(
    surface: &mut S,
    mapping: &DeviceMapping,
    bounds: Vec2,
    point: &Point,
    params: &RenderParams<'_>,
    style: LayerStyle,
) -> bool {
    if !point.is_finite() {
        return false;
    }
    let center = mapping.position(params.scales.project_point(point));
    let radius = mapping.length(style.radius);
    if !visible(center, radius, bounds) {
        return false;
    }

    let fill = params
        .palette
        .color_for(point, params.color_mode)
        .gamma_multiply(style.alpha);
    let stroke = style.outline.map_or(Stroke::NONE, |(width, alpha)| {
        Stroke::new(mapping.length(width), Color32::BLACK.gamma_multiply(alpha))
    });
    surface.circle(center, radius, fill, stroke);
    true
}

// A zero-sized surface has not been laid out yet; draw everything.
fn visible(center: Vec2, radius: f32, bounds: Vec2) -> bool {
    if bounds.x <= 0.0 || bounds.y <= 0.0 {
        return true;
    }
    center.x + radius >= 0.0
        && center.y + radius >= 0.0
        && center.x - radius <= bounds.x
        && center.y - radius <= bounds.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::palette::NO_DATA_COLOR;
    use crate::canvas::surface::DisplayList;
    use bevy::math::UVec2;
    use std::collections::BTreeMap;
    use tracelens_core::TaxonomyItem;

    fn pt(x: f32, y: f32, taxonomy: i32, case: u32) -> Point {
        Point {
            x,
            y,
            taxonomy,
            cluster: -1,
            case,
            sentence: 0,
        }
    }

    fn palette() -> Palette {
        let taxonomy = vec![TaxonomyItem {
            label: "Differential".into(),
            color: "#ff0000".into(),
            short_name: "ddx".into(),
        }];
        Palette::new(&taxonomy, &BTreeMap::new())
    }

    fn surface() -> DisplayList {
        let mut list = DisplayList::default();
        list.resize(UVec2::new(800, 600));
        list
    }

    fn params<'a>(
        points: &'a [Point],
        palette: &'a Palette,
        transform: &'a ZoomTransform,
    ) -> RenderParams<'a> {
        RenderParams {
            points,
            scales: &Scales::IDENTITY,
            transform,
            palette,
            color_mode: ColorMode::Taxonomy,
            active_case: None,
            hovered: None,
            dpr: 1.0,
        }
    }

    #[test]
    fn empty_point_set_draws_nothing() {
        let palette = palette();
        let mut out = surface();
        let stats = render_points(&mut out, &params(&[], &palette, &ZoomTransform::IDENTITY));
        assert_eq!(stats, FrameStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn layers_paint_in_order_without_duplicates() {
        let points = vec![
            pt(10.0, 10.0, 0, 1),
            pt(20.0, 20.0, 0, 0),
            pt(30.0, 30.0, 0, 1),
            pt(40.0, 40.0, 0, 2),
        ];
        let palette = palette();
        let transform = ZoomTransform::IDENTITY;
        let mut p = params(&points, &palette, &transform);
        p.active_case = Some(1);
        p.hovered = Some(2);

        let mut out = surface();
        let stats = render_points(&mut out, &p);
        assert_eq!(stats.background, 2);
        assert_eq!(stats.active, 1);
        assert!(stats.hovered);

        let radii: Vec<f32> = out.circles().map(|(_, r, _, _)| r).collect();
        assert_eq!(radii, vec![3.0, 3.0, 5.0, 7.0]);
        let centers: Vec<Vec2> = out.circles().map(|(c, _, _, _)| c).collect();
        assert_eq!(centers[2], Vec2::new(10.0, 10.0));
        assert_eq!(centers[3], Vec2::new(30.0, 30.0));
    }

    #[test]
    fn unknown_taxonomy_is_drawn_neutral() {
        let points = vec![pt(5.0, 5.0, -1, 0), pt(6.0, 6.0, 9, 0)];
        let palette = palette();
        let transform = ZoomTransform::IDENTITY;
        let mut out = surface();
        render_points(&mut out, &params(&points, &palette, &transform));
        for (_, _, fill, _) in out.circles() {
            assert_eq!(fill, NO_DATA_COLOR.gamma_multiply(BACKGROUND.alpha));
        }
    }

    #[test]
    fn composition_applies_dpr_translate_then_zoom() {
        let points = vec![pt(10.0, 20.0, 0, 0)];
        let palette = palette();
        let transform = ZoomTransform::new(Vec2::new(5.0, -5.0), 2.0);
        let mut p = params(&points, &palette, &transform);
        p.dpr = 2.0;

        let mut out = DisplayList::default();
        out.resize(UVec2::new(1600, 1200));
        render_points(&mut out, &p);
        let (center, radius, _, _) = out.circles().next().unwrap();
        // 2 * (2 * 10 + 5), 2 * (2 * 20 - 5)
        assert_eq!(center, Vec2::new(50.0, 70.0));
        assert_eq!(radius, 3.0 * 2.0 * 2.0);
    }

    #[test]
    fn offscreen_points_are_culled() {
        let points = vec![pt(10.0, 10.0, 0, 0), pt(5000.0, 10.0, 0, 0)];
        let palette = palette();
        let transform = ZoomTransform::IDENTITY;
        let mut out = surface();
        let stats = render_points(&mut out, &params(&points, &palette, &transform));
        assert_eq!(stats.background, 1);
        assert_eq!(stats.culled, 1);
    }

    #[test]
    fn stale_hover_index_is_ignored() {
        let points = vec![pt(10.0, 10.0, 0, 0)];
        let palette = palette();
        let transform = ZoomTransform::IDENTITY;
        let mut p = params(&points, &palette, &transform);
        p.hovered = Some(42);
        let mut out = surface();
        let stats = render_points(&mut out, &p);
        assert!(!stats.hovered);
        assert_eq!(out.circles().count(), 1);
    }
}
