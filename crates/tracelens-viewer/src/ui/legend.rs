use bevy::prelude::Res;
use bevy_egui::{egui, EguiContexts};
use std::collections::BTreeMap;
use tracelens_core::{ClusterInfo, ColorMode, Metadata, NONE_INDEX};

use crate::app::resources::{CanvasState, DataState};
use crate::canvas::Palette;
use crate::state::AppStore;

pub fn legend_panel(
    mut contexts: EguiContexts,
    store: Res<AppStore>,
    data: Res<DataState>,
    canvas: Res<CanvasState>,
) {
    let Some(metadata) = data.metadata.as_deref() else {
        return;
    };
    let sel = store.get();
    let entries = legend_entries(metadata, &sel.model, sel.color_mode, &canvas.palette);
    if entries.is_empty() {
        return;
    }

    egui::TopBottomPanel::bottom("legend").show(contexts.ctx_mut(), |ui| {
        ui.horizontal_wrapped(|ui| {
            for (label, color) in entries {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 5.0, color);
                ui.small(label);
                ui.add_space(6.0);
            }
        });
    });
}

/// Taxonomy entries in declared order, or clusters by ascending id.
pub fn legend_entries(
    metadata: &Metadata,
    model: &str,
    mode: ColorMode,
    palette: &Palette,
) -> Vec<(String, egui::Color32)> {
    match mode {
        ColorMode::Taxonomy => metadata
            .taxonomy
            .iter()
            .enumerate()
            .map(|(i, t)| (t.short_name.clone(), palette.taxonomy_color(i as i32)))
            .collect(),
        ColorMode::Cluster => {
            let empty = BTreeMap::new();
            let clusters: &BTreeMap<String, ClusterInfo> =
                metadata.clusters_for(model).unwrap_or(&empty);
            palette
                .cluster_entries()
                .filter(|(id, _)| *id != NONE_INDEX)
                .map(|(id, color)| {
                    let title = clusters
                        .get(&id.to_string())
                        .map_or_else(|| format!("Cluster {id}"), |c| c.title.clone());
                    (title, color)
                })
                .collect()
        }
    }
}
