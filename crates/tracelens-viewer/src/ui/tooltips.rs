use bevy_egui::egui;
use tracelens_core::{Case, ColorMode, Metadata, Point};

pub fn render_tooltip(
    ctx: &egui::Context,
    id: &str,
    pos: egui::Pos2,
    swatch: Option<egui::Color32>,
    lines: impl IntoIterator<Item = String>,
) {
    egui::Area::new(egui::Id::new(id))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            ui.group(|ui| {
                ui.set_max_width(320.0);
                let mut lines = lines.into_iter();
                if let Some(first) = lines.next() {
                    ui.horizontal(|ui| {
                        if let Some(color) = swatch {
                            let (rect, _) =
                                ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                            ui.painter().circle_filled(rect.center(), 5.0, color);
                        }
                        ui.strong(first);
                    });
                }
                for line in lines {
                    ui.label(line);
                }
            });
        });
}

/// Lines shown for a hovered point: the category (taxonomy mode) or cluster
/// title (cluster mode) when known, then the sentence text.
pub fn tooltip_lines(
    point: &Point,
    mode: ColorMode,
    metadata: &Metadata,
    model: &str,
    cases: Option<&[Case]>,
    max_chars: usize,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    match mode {
        ColorMode::Taxonomy => {
            if let Some(item) = metadata.taxonomy_item(point.taxonomy) {
                lines.push(item.short_name.clone());
            }
        }
        ColorMode::Cluster => {
            let title = metadata
                .clusters_for(model)
                .and_then(|c| c.get(&point.cluster.to_string()));
            if let Some(info) = title {
                lines.push(format!("Cluster {}: {}", point.cluster, info.title));
            }
        }
    }

    let text = cases
        .and_then(|c| c.get(point.case as usize))
        .and_then(|c| c.sentences.get(point.sentence as usize))
        .map(|s| s.text.as_str());
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        lines.push(truncate(text, max_chars));
    }
    lines
}

/// At most `max_chars` characters, with "..." appended when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
