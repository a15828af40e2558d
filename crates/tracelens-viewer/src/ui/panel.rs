use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use tracelens_core::{Case, ColorMode, Metadata, ModelInfo};

use crate::app::resources::{CanvasState, DataState, Settings, UiFlags};
use crate::state::AppStore;
use crate::ui::PANEL_W;
use crate::util::config;

pub fn ui_panel(
    mut contexts: EguiContexts,
    mut store: ResMut<AppStore>,
    data: Res<DataState>,
    canvas: Res<CanvasState>,
    mut settings: ResMut<Settings>,
    mut flags: ResMut<UiFlags>,
) {
    egui::SidePanel::left("left")
        .resizable(false)
        .exact_width(PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("TraceLens");
            let Some(metadata) = data.metadata.clone() else {
                if data.loading.metadata {
                    ui.label("Loading…");
                }
                status_line(ui, &data);
                return;
            };
            let sel = store.get().clone();
            let mut picks = Picks::default();

            ui.separator();
            ui.label("Model:");
            let current = data.model_info(&sel.model);
            let selected_text = current
                .map(|m| m.display_name.clone())
                .unwrap_or_else(|| sel.model.clone());
            egui::ComboBox::from_id_source("model")
                .width(PANEL_W - 24.0)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (id, info) in ordered_models(&metadata) {
                        let text = format!("{} ({})", info.display_name, model_badge(info));
                        if ui.selectable_label(sel.model == *id, text).clicked() {
                            picks.model = Some(id.clone());
                        }
                    }
                });
            if let Some(info) = current {
                ui.horizontal(|ui| {
                    ui.small(model_badge(info));
                    if let Some(layer) = info.layer {
                        ui.small(format!("layer {layer}"));
                    }
                });
            }

            ui.add_space(6.0);
            ui.label("Dataset:");
            egui::ComboBox::from_id_source("dataset")
                .width(PANEL_W - 24.0)
                .selected_text(dataset_name(&metadata, current, &sel.dataset))
                .show_ui(ui, |ui| {
                    for id in ordered_datasets(&metadata, current) {
                        let text = dataset_name(&metadata, current, id);
                        if ui.selectable_label(sel.dataset == *id, text).clicked() {
                            picks.dataset = Some(id.clone());
                        }
                    }
                });

            ui.add_space(6.0);
            ui.label("Case:");
            let cases = data.cases.as_deref().unwrap_or(&[]);
            if cases.is_empty() {
                ui.label(if data.loading.cases { "Loading…" } else { "No cases" });
            } else {
                ui.horizontal(|ui| {
                    let idx = sel.case_index;
                    if ui.add_enabled(idx > 0, egui::Button::new("◀")).clicked() {
                        picks.case = Some(idx - 1);
                    }
                    let label = cases
                        .get(idx)
                        .map(|c| case_label(idx, c))
                        .unwrap_or_default();
                    egui::ComboBox::from_id_source("case")
                        .width(PANEL_W - 90.0)
                        .selected_text(label)
                        .show_ui(ui, |ui| {
                            for (i, case) in cases.iter().enumerate() {
                                if ui.selectable_label(i == idx, case_label(i, case)).clicked() {
                                    picks.case = Some(i);
                                }
                            }
                        });
                    if ui
                        .add_enabled(idx + 1 < cases.len(), egui::Button::new("▶"))
                        .clicked()
                    {
                        picks.case = Some(idx + 1);
                    }
                });
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Color by:");
                let mut mode = sel.color_mode;
                ui.selectable_value(&mut mode, ColorMode::Taxonomy, "Taxonomy");
                ui.selectable_value(&mut mode, ColorMode::Cluster, "Cluster");
                if mode != sel.color_mode {
                    store.set_color_mode(mode);
                }
            });

            let points = data.points.as_deref().map_or(0, <[_]>::len);
            let playing = sel.trajectory.playing;
            let play_label = if playing { "Playing..." } else { "Play Trajectory" };
            let can_play = !playing && points > 0 && canvas.path.is_drawable();
            if ui.add_enabled(can_play, egui::Button::new(play_label)).clicked() {
                store.set_trajectory_playing(true);
            }

            ui.label(format!("points: {points}"));
            if ui
                .selectable_label(flags.browser_open, "Taxonomy & clusters")
                .clicked()
            {
                flags.browser_open = !flags.browser_open;
            }

            ui.add_space(8.0);
            ui.separator();
            if ui.button("Save as defaults").clicked() {
                settings.0.default_model = sel.model.clone();
                settings.0.default_dataset = sel.dataset.clone();
                settings.0.color_mode = sel.color_mode;
                match config::save(&settings.0) {
                    Ok(()) => tracing::info!(model = %sel.model, dataset = %sel.dataset, "defaults saved"),
                    Err(e) => tracing::warn!(error = ?e, "failed to save viewer config"),
                }
            }

            status_line(ui, &data);

            // Store writes happen after the widgets are laid out so this
            // frame renders one consistent selection.
            apply_picks(&mut store, picks);
        });
}

/// Selections made in this frame's widgets.
#[derive(Debug, Default)]
struct Picks {
    model: Option<String>,
    dataset: Option<String>,
    case: Option<usize>,
}

/// Picking a case jumps to it and replays its trajectory.
fn apply_picks(store: &mut AppStore, picks: Picks) {
    if let Some(model) = picks.model {
        store.set_model(&model);
    }
    if let Some(dataset) = picks.dataset {
        store.set_dataset(&dataset);
    }
    if let Some(index) = picks.case {
        store.navigate_to_case(index);
    }
}

fn status_line(ui: &mut egui::Ui, data: &DataState) {
    if let Some(status) = &data.status {
        ui.add_space(6.0);
        ui.colored_label(ui.visuals().error_fg_color, status);
    }
}

pub fn model_badge(info: &ModelInfo) -> &'static str {
    if info.has_activations {
        "white-box"
    } else {
        "black-box"
    }
}

pub fn case_label(index: usize, case: &Case) -> String {
    let mark = if case.correct { '✓' } else { '✗' };
    format!("#{} {} {}", index + 1, case.true_dx, mark)
}

/// Models in `model_order`, then any the order list does not mention.
pub fn ordered_models(metadata: &Metadata) -> Vec<(&String, &ModelInfo)> {
    let mut out: Vec<(&String, &ModelInfo)> = metadata
        .model_order
        .iter()
        .filter_map(|id| metadata.models.get_key_value(id))
        .collect();
    for (id, info) in &metadata.models {
        if !metadata.model_order.contains(id) {
            out.push((id, info));
        }
    }
    out
}

/// Datasets the model has records for, in `dataset_order` first.
pub fn ordered_datasets<'a>(metadata: &'a Metadata, model: Option<&'a ModelInfo>) -> Vec<&'a String> {
    let Some(model) = model else {
        return metadata.dataset_order.iter().collect();
    };
    let mut out: Vec<&String> = metadata
        .dataset_order
        .iter()
        .filter(|id| model.datasets.contains_key(*id))
        .collect();
    for id in model.datasets.keys() {
        if !metadata.dataset_order.contains(id) {
            out.push(id);
        }
    }
    out
}

fn dataset_name(metadata: &Metadata, model: Option<&ModelInfo>, id: &str) -> String {
    model
        .and_then(|m| m.datasets.get(id))
        .map(|d| d.display_name.clone())
        .or_else(|| metadata.datasets.get(id).cloned())
        .unwrap_or_else(|| id.to_string())
}
