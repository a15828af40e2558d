use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};

use crate::app::resources::UiFlags;

pub fn help_overlay(mut contexts: EguiContexts, flags: Res<UiFlags>) {
    if !flags.help_open {
        return;
    }

    egui::Window::new("Help / Shortcuts")
        .collapsible(false)
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Drag: pan, wheel or pinch: zoom");
            ui.label("Click a point: open its case and play the trajectory");
            ui.label("Space: play trajectory");
            ui.label("R: reset view");
            ui.label("Esc: clear hover, close help");
            ui.label("?: toggle help");
            ui.label("B: taxonomy and cluster browser");
        });
}
