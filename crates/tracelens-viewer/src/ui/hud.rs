use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::{CanvasState, Perf, Settings};
use crate::ui::{UiLayout, HUD_EDGE_PADDING, HUD_FALLBACK_Y_OFFSET, HUD_MIN_CONTENT_W};

pub fn hud_overlay(
    mut contexts: EguiContexts,
    settings: Res<Settings>,
    perf: Res<Perf>,
    canvas: Res<CanvasState>,
    layout: Res<UiLayout>,
) {
    if !settings.0.show_hud || !layout.has_canvas() {
        return;
    }
    let ctx = contexts.ctx_mut();
    let area = layout.canvas_rect;
    let (x, y) = if area.width() < HUD_MIN_CONTENT_W {
        let screen = ctx.screen_rect();
        (
            screen.min.x + HUD_EDGE_PADDING,
            screen.min.y + HUD_EDGE_PADDING + HUD_FALLBACK_Y_OFFSET,
        )
    } else {
        (area.min.x + HUD_EDGE_PADDING, area.min.y + HUD_EDGE_PADDING)
    };

    let stats = canvas.view.stats();
    egui::Area::new("hud".into())
        .order(egui::Order::Foreground)
        .interactable(false)
        .fixed_pos(egui::pos2(x, y))
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.label(format!("FPS: {:.0}", perf.fps));
                ui.label(format!("Points: {}", canvas.view.points().len()));
                ui.label(format!(
                    "Drawn: {} / culled {}",
                    stats.background + stats.active + usize::from(stats.hovered),
                    stats.culled
                ));
                ui.label(format!("Zoom: {:.2}x", canvas.view.transform().k));
            });
        });
}
