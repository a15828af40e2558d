use bevy::math::Vec2;
use bevy::prelude::{EventWriter, Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use smallvec::SmallVec;

use crate::app::events::{PointClicked, PointHovered, ScalesChanged};
use crate::app::resources::{CanvasState, DataState, Settings};
use crate::canvas::{PointerInput, Scene, TrajectoryLayer, ViewEvent};
use crate::state::AppStore;
use crate::ui::tooltips::{render_tooltip, tooltip_lines};
use crate::ui::{UiLayout, TOOLTIP_OFFSET};

const NO_ACTIVATIONS: &str = "No activation data available for this model/dataset";

/// Central point-cloud panel: feeds pointer input to the view, paints at
/// most once per frame and shows the hover tooltip.
#[allow(clippy::too_many_arguments)]
pub fn canvas_panel(
    mut contexts: EguiContexts,
    store: Res<AppStore>,
    data: Res<DataState>,
    mut canvas: ResMut<CanvasState>,
    settings: Res<Settings>,
    mut layout: ResMut<UiLayout>,
    mut hovered: EventWriter<PointHovered>,
    mut clicked: EventWriter<PointClicked>,
    mut scaled: EventWriter<ScalesChanged>,
) {
    let canvas = &mut *canvas;
    let sel = store.get();
    let mut events: SmallVec<[ViewEvent; 4]> = SmallVec::new();

    egui::CentralPanel::default().show(contexts.ctx_mut(), |ui| {
        let has_points = data.points.as_deref().is_some_and(|p| !p.is_empty());
        if !has_points {
            layout.canvas_rect = egui::Rect::NOTHING;
            let loading = data.loading.metadata || data.loading.points;
            ui.centered_and_justified(|ui| {
                ui.label(if loading { "Loading…" } else { NO_ACTIVATIONS });
            });
            return;
        }

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let rect = response.rect;
        layout.canvas_rect = rect;
        let ppp = ui.ctx().pixels_per_point();
        let local = |p: egui::Pos2| Vec2::new(p.x - rect.min.x, p.y - rect.min.y);

        events.extend(canvas.view.resize(Vec2::new(rect.width(), rect.height()), ppp));

        match response.hover_pos().map(local) {
            Some(cursor) => {
                if canvas.cursor != Some(cursor) {
                    canvas.cursor = Some(cursor);
                    events.extend(canvas.view.handle(PointerInput::Move(cursor)));
                }
                let (scroll, zoom) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
                if zoom != 1.0 {
                    events.extend(canvas.view.handle(PointerInput::Pinch {
                        anchor: cursor,
                        factor: zoom,
                    }));
                } else if scroll != 0.0 {
                    events.extend(canvas.view.handle(PointerInput::Wheel {
                        anchor: cursor,
                        delta_y: scroll,
                    }));
                }
            }
            None => {
                if canvas.cursor.take().is_some() {
                    events.extend(canvas.view.handle(PointerInput::Leave));
                }
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) {
            let d = response.drag_delta();
            events.extend(canvas.view.handle(PointerInput::Drag(Vec2::new(d.x, d.y))));
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                events.extend(canvas.view.handle(PointerInput::Click(local(pos))));
            }
        }

        if canvas.view.scheduler().is_pending() {
            // The overlay is in screen space and follows every transform change.
            canvas.rebuild_path(data.case(sel.case_index));
        }
        let scene = Scene {
            palette: &canvas.palette,
            color_mode: sel.color_mode,
            active_case: sel.active_case(),
            hovered_sentence: sel.hovered_sentence,
            trajectory: canvas.path.is_drawable().then(|| TrajectoryLayer {
                path: &canvas.path,
                reveal: canvas.animator.reveal(),
                marker: canvas.animator.marker(),
            }),
        };
        canvas.view.paint(&scene);
        painter.extend(canvas.view.frame().to_shapes(rect.min, ppp));

        let hovered_point = canvas
            .view
            .hovered()
            .and_then(|i| canvas.view.points().get(i).copied());
        if let (Some(point), Some(cursor), Some(metadata)) =
            (hovered_point, canvas.cursor, data.metadata.as_deref())
        {
            let lines = tooltip_lines(
                &point,
                sel.color_mode,
                metadata,
                &sel.model,
                data.cases.as_deref(),
                settings.0.tooltip_max_chars,
            );
            if !lines.is_empty() {
                let pos = rect.min
                    + egui::vec2(cursor.x + TOOLTIP_OFFSET[0], cursor.y + TOOLTIP_OFFSET[1]);
                let swatch = canvas.palette.color_for(&point, sel.color_mode);
                render_tooltip(ui.ctx(), "point_tooltip", pos, Some(swatch), lines);
            }
        }

        if canvas.animator.is_playing() {
            ui.ctx().request_repaint();
        }
    });

    for event in events {
        match event {
            ViewEvent::Hover(index) => {
                hovered.send(PointHovered(index));
            }
            ViewEvent::Click { case, sentence } => {
                clicked.send(PointClicked { case, sentence });
            }
            ViewEvent::ScalesChanged(view) => {
                scaled.send(ScalesChanged(view));
            }
        }
    }
}
