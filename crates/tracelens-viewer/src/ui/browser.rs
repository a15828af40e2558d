use bevy::prelude::{Res, ResMut};
use bevy_egui::{egui, EguiContexts};
use tracelens_core::Metadata;

use crate::app::resources::{DataState, UiFlags};
use crate::canvas::palette::{parse_hex, NO_DATA_COLOR, TABLEAU10};
use crate::state::AppStore;

const CARD_SWATCH: f32 = 12.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserTab {
    #[default]
    Taxonomy,
    Clusters,
}

/// One row of the browser: swatch, title, a dim tag and a body line.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub color: egui::Color32,
    pub title: String,
    pub tag: String,
    pub body: String,
}

/// Reference window listing the taxonomy categories and the selected
/// model's clusters.
pub fn browser_window(
    mut contexts: EguiContexts,
    mut flags: ResMut<UiFlags>,
    store: Res<AppStore>,
    data: Res<DataState>,
) {
    if !flags.browser_open {
        return;
    }
    let Some(metadata) = data.metadata.as_deref() else {
        return;
    };
    let model = &store.get().model;
    let model_name = metadata
        .models
        .get(model)
        .map_or(model.as_str(), |m| m.display_name.as_str());

    let mut open = true;
    let mut tab = flags.browser_tab;
    egui::Window::new("Taxonomy & Clusters")
        .open(&mut open)
        .default_width(420.0)
        .default_height(480.0)
        .show(contexts.ctx_mut(), |ui| {
            let clusters = cluster_cards(metadata, model);
            ui.horizontal(|ui| {
                ui.selectable_value(
                    &mut tab,
                    BrowserTab::Taxonomy,
                    format!("Universal Taxonomy ({})", metadata.taxonomy.len()),
                );
                ui.selectable_value(
                    &mut tab,
                    BrowserTab::Clusters,
                    format!("SAE Clusters: {model_name} ({})", clusters.len()),
                );
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match tab {
                    BrowserTab::Taxonomy => {
                        for card in taxonomy_cards(metadata) {
                            card_row(ui, &card);
                        }
                    }
                    BrowserTab::Clusters if clusters.is_empty() => {
                        ui.weak(no_clusters_message(model_name));
                    }
                    BrowserTab::Clusters => {
                        for card in &clusters {
                            card_row(ui, card);
                        }
                    }
                });
        });
    flags.browser_tab = tab;
    flags.browser_open = open;
}

fn card_row(ui: &mut egui::Ui, card: &Card) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(CARD_SWATCH, CARD_SWATCH), egui::Sense::hover());
            ui.painter()
                .circle_filled(rect.center(), CARD_SWATCH / 2.0, card.color);
            ui.strong(&card.title);
            ui.weak(&card.tag);
        });
        if !card.body.is_empty() {
            ui.small(&card.body);
        }
    });
}

/// Taxonomy categories in declared order, tagged with their index.
pub fn taxonomy_cards(metadata: &Metadata) -> Vec<Card> {
    metadata
        .taxonomy
        .iter()
        .enumerate()
        .map(|(i, item)| Card {
            color: parse_hex(&item.color).unwrap_or(NO_DATA_COLOR),
            title: item.short_name.clone(),
            tag: format!("({i})"),
            body: item.label.clone(),
        })
        .collect()
}

/// Clusters by ascending numeric id, coloured by their position in that
/// order.
pub fn cluster_cards(metadata: &Metadata, model: &str) -> Vec<Card> {
    let Some(clusters) = metadata.clusters_for(model) else {
        return Vec::new();
    };
    let mut ids: Vec<(i64, &String)> = clusters
        .keys()
        .filter_map(|k| k.parse::<i64>().ok().map(|id| (id, k)))
        .collect();
    ids.sort_unstable();
    ids.into_iter()
        .enumerate()
        .filter_map(|(i, (id, key))| {
            let info = clusters.get(key)?;
            Some(Card {
                color: TABLEAU10[i % TABLEAU10.len()],
                title: info.title.clone(),
                tag: format!("(Cluster {id})"),
                body: info.description.clone(),
            })
        })
        .collect()
}

pub fn no_clusters_message(model_name: &str) -> String {
    format!(
        "No cluster data available for {model_name}. \
         Select a model with activations to view SAE clusters."
    )
}
