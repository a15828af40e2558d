use bevy::prelude::{EventWriter, ResMut};
use bevy_egui::{egui, EguiContexts};

use crate::app::events::ScalesChanged;
use crate::app::resources::{CanvasState, UiFlags};
use crate::canvas::ViewEvent;
use crate::state::AppStore;

pub fn handle_shortcuts(
    mut contexts: EguiContexts,
    mut store: ResMut<AppStore>,
    mut canvas: ResMut<CanvasState>,
    mut flags: ResMut<UiFlags>,
    mut scaled: EventWriter<ScalesChanged>,
) {
    let ctx = contexts.ctx_mut();
    let esc_pressed = ctx.input(|i| i.key_pressed(egui::Key::Escape));
    let wants_keyboard = ctx.wants_keyboard_input();

    if esc_pressed {
        flags.help_open = false;
        flags.browser_open = false;
        store.set_hovered_point(None);
        store.set_hovered_sentence(None);
    }

    if wants_keyboard {
        return;
    }

    if ctx.input(|i| i.key_pressed(egui::Key::Questionmark)) {
        flags.help_open = !flags.help_open;
    }
    if ctx.input(|i| i.key_pressed(egui::Key::B)) {
        flags.browser_open = !flags.browser_open;
    }
    if ctx.input(|i| i.key_pressed(egui::Key::R)) {
        if let Some(ViewEvent::ScalesChanged(view)) = canvas.view.reset_view() {
            scaled.send(ScalesChanged(view));
        }
    }
    if ctx.input(|i| i.key_pressed(egui::Key::Space))
        && !store.get().trajectory.playing
        && canvas.path.is_drawable()
    {
        store.set_trajectory_playing(true);
    }
}
