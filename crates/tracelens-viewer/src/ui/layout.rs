use bevy::prelude::Resource;
use bevy_egui::egui;

/// Screen rect the canvas occupied last frame; `NOTHING` while an empty
/// state is shown instead.
#[derive(Resource, Clone, Copy)]
pub struct UiLayout {
    pub canvas_rect: egui::Rect,
}

impl Default for UiLayout {
    fn default() -> Self {
        Self {
            canvas_rect: egui::Rect::NOTHING,
        }
    }
}

impl UiLayout {
    pub fn has_canvas(&self) -> bool {
        self.canvas_rect.is_positive()
    }
}
