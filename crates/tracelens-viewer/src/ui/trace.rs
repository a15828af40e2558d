use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use tracelens_core::{Case, TaxonomyItem};

use crate::app::resources::{CanvasState, DataState};
use crate::canvas::palette::NO_DATA_COLOR;
use crate::state::AppStore;
use crate::ui::TRACE_PANEL_W;

const DISTRIBUTION_H: f32 = 10.0;
const PROMPT_MAX_H: f32 = 160.0;

/// Diagnosis, stats and the sentence list of the active case.
pub fn trace_panel(
    mut contexts: EguiContexts,
    mut store: ResMut<AppStore>,
    data: Res<DataState>,
    canvas: Res<CanvasState>,
) {
    egui::SidePanel::right("trace")
        .default_width(TRACE_PANEL_W)
        .show(contexts.ctx_mut(), |ui| {
            let sel = store.get().clone();
            let Some(case) = data.case(sel.case_index) else {
                ui.label(if data.loading.cases { "Loading…" } else { "No case selected" });
                return;
            };
            let taxonomy = data
                .metadata
                .as_deref()
                .map(|m| m.taxonomy.as_slice())
                .unwrap_or(&[]);

            diagnosis_bar(ui, case);
            if let Some(prompt) = prompt_text(case) {
                egui::CollapsingHeader::new("Prompt")
                    .default_open(true)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .id_source("prompt")
                            .max_height(PROMPT_MAX_H)
                            .show(ui, |ui| ui.label(prompt));
                    });
            }
            ui.separator();
            ui.label(format!("{} sentences", case.sentences.len()));
            distribution_bar(ui, case, taxonomy, &canvas);
            ui.separator();

            let mut row_hovered = None;
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (i, sentence) in case.sentences.iter().enumerate() {
                        let highlighted = sel.hovered_sentence == Some(i);
                        let color = canvas.palette.taxonomy_color(sentence.taxonomy);
                        let tag = sentence_tag(taxonomy, sentence.taxonomy);
                        let frame = egui::Frame::none()
                            .inner_margin(egui::Margin::symmetric(4.0, 2.0))
                            .fill(if highlighted {
                                ui.visuals().selection.bg_fill.gamma_multiply(0.4)
                            } else {
                                egui::Color32::TRANSPARENT
                            });
                        let row = frame
                            .show(ui, |ui| {
                                ui.horizontal_wrapped(|ui| {
                                    let (bar, _) = ui.allocate_exact_size(
                                        egui::vec2(3.0, 14.0),
                                        egui::Sense::hover(),
                                    );
                                    ui.painter().rect_filled(bar, 1.0, color);
                                    ui.small(format!("[{tag}]"));
                                    ui.label(&sentence.text);
                                });
                            })
                            .response;
                        if row.contains_pointer() {
                            row_hovered = Some(i);
                        }
                    }
                });

            store.set_hovered_sentence(row_hovered);
        });
}

/// The case prompt, if it has any visible text.
pub fn prompt_text(case: &Case) -> Option<&str> {
    let prompt = case.prompt.trim_end();
    (!prompt.trim_start().is_empty()).then_some(prompt)
}

fn diagnosis_bar(ui: &mut egui::Ui, case: &Case) {
    egui::Grid::new("diagnosis").num_columns(2).show(ui, |ui| {
        ui.weak("Predicted:");
        ui.horizontal(|ui| {
            ui.strong(&case.pred_dx);
            let (text, color) = if case.correct {
                ("Correct", egui::Color32::from_rgb(0x16, 0xa3, 0x4a))
            } else {
                ("Incorrect", ui.visuals().error_fg_color)
            };
            ui.colored_label(color, text);
        });
        ui.end_row();
        ui.weak("Gold Dx:");
        ui.strong(&case.true_dx);
        ui.end_row();
    });
}

fn distribution_bar(ui: &mut egui::Ui, case: &Case, taxonomy: &[TaxonomyItem], canvas: &CanvasState) {
    let counts = case.taxonomy_counts(taxonomy.len());
    let total: usize = counts.iter().sum();
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), DISTRIBUTION_H),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    if total == 0 {
        painter.rect_filled(rect, 2.0, NO_DATA_COLOR.gamma_multiply(0.3));
        return;
    }

    let mut x = rect.min.x;
    let mut hovered_label = None;
    for (slot, share) in distribution(&counts) {
        let w = share * rect.width();
        let seg = egui::Rect::from_min_size(egui::pos2(x, rect.min.y), egui::vec2(w, rect.height()));
        painter.rect_filled(seg, 0.0, canvas.palette.taxonomy_color(slot as i32));
        if response.hover_pos().is_some_and(|p| seg.contains(p)) {
            hovered_label = Some(format!("{}: {}", taxonomy[slot].short_name, counts[slot]));
        }
        x += w;
    }
    if let Some(label) = hovered_label {
        response.on_hover_text(label);
    }
}

/// Non-empty taxonomy slots with their share of the classified sentences.
pub fn distribution(counts: &[usize]) -> Vec<(usize, f32)> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0)
        .map(|(slot, &n)| (slot, n as f32 / total as f32))
        .collect()
}

pub fn sentence_tag(taxonomy: &[TaxonomyItem], index: i32) -> &str {
    usize::try_from(index)
        .ok()
        .and_then(|i| taxonomy.get(i))
        .map_or("Unknown", |t| t.short_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_cover_only_present_categories() {
        let shares = distribution(&[2, 0, 6]);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0], (0, 0.25));
        assert_eq!(shares[1], (2, 0.75));
        assert!(distribution(&[0, 0]).is_empty());
        assert!(distribution(&[]).is_empty());
    }

    #[test]
    fn tags_fall_back_to_unknown() {
        let taxonomy = vec![TaxonomyItem {
            label: "Hypothesis generation".into(),
            color: "#ff7f0e".into(),
            short_name: "Hypothesis".into(),
        }];
        assert_eq!(sentence_tag(&taxonomy, 0), "Hypothesis");
        assert_eq!(sentence_tag(&taxonomy, 1), "Unknown");
        assert_eq!(sentence_tag(&taxonomy, -1), "Unknown");
    }

    #[test]
    fn blank_prompts_are_hidden() {
        let mut case = Case {
            id: "c".into(),
            qid: None,
            prompt: "A 54-year-old man presents with\nacute knee pain.\n\n".into(),
            true_dx: "Gout".into(),
            pred_dx: "Gout".into(),
            correct: true,
            sentences: Vec::new(),
        };
        assert_eq!(
            prompt_text(&case),
            Some("A 54-year-old man presents with\nacute knee pain.")
        );
        case.prompt = " \n ".into();
        assert_eq!(prompt_text(&case), None);
    }
}
