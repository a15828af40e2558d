use bevy_egui::egui::Color32;
use std::collections::BTreeMap;
use tracelens_core::{ClusterInfo, ColorMode, Point, TaxonomyItem};

/// slate-400, used for missing taxonomy and unclustered points.
pub const NO_DATA_COLOR: Color32 = Color32::from_rgb(0x94, 0xa3, 0xb8);

pub const TABLEAU10: [Color32; 10] = [
    Color32::from_rgb(0x4e, 0x79, 0xa7),
    Color32::from_rgb(0xf2, 0x8e, 0x2c),
    Color32::from_rgb(0xe1, 0x57, 0x59),
    Color32::from_rgb(0x76, 0xb7, 0xb2),
    Color32::from_rgb(0x59, 0xa1, 0x4f),
    Color32::from_rgb(0xed, 0xc9, 0x49),
    Color32::from_rgb(0xaf, 0x7a, 0xa1),
    Color32::from_rgb(0xff, 0x9d, 0xa7),
    Color32::from_rgb(0x9c, 0x75, 0x5f),
    Color32::from_rgb(0xba, 0xb0, 0xab),
];

/// Resolved colours for one model selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    taxonomy: Vec<Color32>,
    clusters: BTreeMap<i32, Color32>,
}

impl Palette {
    pub fn new(taxonomy: &[TaxonomyItem], clusters: &BTreeMap<String, ClusterInfo>) -> Self {
        Self {
            taxonomy: taxonomy
                .iter()
                .map(|t| parse_hex(&t.color).unwrap_or(NO_DATA_COLOR))
                .collect(),
            clusters: cluster_colors(clusters.keys().filter_map(|k| k.trim().parse().ok())),
        }
    }

    pub fn taxonomy_color(&self, index: i32) -> Color32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.taxonomy.get(i))
            .copied()
            .unwrap_or(NO_DATA_COLOR)
    }

    pub fn cluster_color(&self, id: i32) -> Color32 {
        self.clusters.get(&id).copied().unwrap_or(NO_DATA_COLOR)
    }

    pub fn color_for(&self, point: &Point, mode: ColorMode) -> Color32 {
        match mode {
            ColorMode::Taxonomy => self.taxonomy_color(point.taxonomy),
            ColorMode::Cluster => self.cluster_color(point.cluster),
        }
    }

    /// Cluster ids in legend order with their colours.
    pub fn cluster_entries(&self) -> impl Iterator<Item = (i32, Color32)> + '_ {
        self.clusters.iter().map(|(&id, &c)| (id, c))
    }
}

/// The N-th smallest id gets the N-th Tableau10 colour (cycling). The
/// assignment depends only on the id set, never on input order; the
/// unclustered sentinel takes no slot.
pub fn cluster_colors<I>(ids: I) -> BTreeMap<i32, Color32>
where
    I: IntoIterator<Item = i32>,
{
    let mut sorted: Vec<i32> = ids.into_iter().filter(|&id| id != -1).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let mut map: BTreeMap<i32, Color32> = sorted
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, TABLEAU10[i % TABLEAU10.len()]))
        .collect();
    map.insert(-1, NO_DATA_COLOR);
    map
}

/// `#rrggbb` or `#rgb`, leading `#` optional.
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
        3 => {
            let [r, g, b] = [channel(0, 1)?, channel(1, 1)?, channel(2, 1)?];
            Some(Color32::from_rgb(r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}
