use bevy::math::{UVec2, Vec2};
use bevy_egui::egui::{self, epaint::CircleShape, Color32, Shape, Stroke};

/// A raster target addressed in device pixels.
pub trait Surface {
    fn resize(&mut self, size: UVec2);
    fn size(&self) -> UVec2;
    fn clear(&mut self);
    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, stroke: Stroke);
    fn polyline(&mut self, points: &[Vec2], stroke: Stroke);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Vec2>,
        stroke: Stroke,
    },
}

/// Retained draw commands of the last painted frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    size: UVec2,
    cmds: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32, Color32, Stroke)> + '_ {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Circle {
                center,
                radius,
                fill,
                stroke,
            } => Some((*center, *radius, *fill, *stroke)),
            DrawCmd::Polyline { .. } => None,
        })
    }

    pub fn polylines(&self) -> impl Iterator<Item = (&[Vec2], Stroke)> + '_ {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Polyline { points, stroke } => Some((points.as_slice(), *stroke)),
            DrawCmd::Circle { .. } => None,
        })
    }

    /// Replay as egui shapes positioned at `origin` (points), undoing the
    /// device-pixel scale egui applies itself.
    pub fn to_shapes(&self, origin: egui::Pos2, pixels_per_point: f32) -> Vec<Shape> {
        let ppp = if pixels_per_point > 0.0 { pixels_per_point } else { 1.0 };
        let to_pos = |v: Vec2| origin + egui::vec2(v.x / ppp, v.y / ppp);
        let to_stroke = |s: Stroke| Stroke::new(s.width / ppp, s.color);

        self.cmds
            .iter()
            .map(|cmd| match cmd {
                DrawCmd::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => Shape::Circle(CircleShape {
                    center: to_pos(*center),
                    radius: radius / ppp,
                    fill: *fill,
                    stroke: to_stroke(*stroke),
                }),
                DrawCmd::Polyline { points, stroke } => Shape::line(
                    points.iter().copied().map(to_pos).collect(),
                    to_stroke(*stroke),
                ),
            })
            .collect()
    }
}

impl Surface for DisplayList {
    fn resize(&mut self, size: UVec2) {
        self.size = size;
        self.cmds.clear();
    }

    fn size(&self) -> UVec2 {
        self.size
    }

    fn clear(&mut self) {
        self.cmds.clear();
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color32, stroke: Stroke) {
        if !center.is_finite() || !(radius > 0.0) {
            return;
        }
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn polyline(&mut self, points: &[Vec2], stroke: Stroke) {
        if points.len() < 2 || points.iter().any(|p| !p.is_finite()) {
            return;
        }
        self.cmds.push(DrawCmd::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }
}
