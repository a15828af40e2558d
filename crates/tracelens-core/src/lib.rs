use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel for "no taxonomy category" and "unclustered".
pub const NONE_INDEX: i32 = -1;

type PointTuple = (f32, f32, i32, i32, u32, u32);

/// One embedded sentence, stored on disk as
/// `[x, y, taxonomy_idx, cluster_id, case_idx, sent_idx]`.
///
/// Points live in one flat `Vec`; the position in that vector is the point's
/// identity for hover and selection, so the vector must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointTuple", into = "PointTuple")]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub taxonomy: i32,
    pub cluster: i32,
    pub case: u32,
    pub sentence: u32,
}

impl From<PointTuple> for Point {
    fn from((x, y, taxonomy, cluster, case, sentence): PointTuple) -> Self {
        Self {
            x,
            y,
            taxonomy,
            cluster,
            case,
            sentence,
        }
    }
}

impl From<Point> for PointTuple {
    fn from(p: Point) -> Self {
        (p.x, p.y, p.taxonomy, p.cluster, p.case, p.sentence)
    }
}

impl Point {
    /// Taxonomy slot if the index addresses a real entry of a list of `len`.
    pub fn taxonomy_index(&self, len: usize) -> Option<usize> {
        usize::try_from(self.taxonomy).ok().filter(|&i| i < len)
    }

    pub fn cluster_id(&self) -> Option<i32> {
        (self.cluster != NONE_INDEX).then_some(self.cluster)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Taxonomy,
    Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyItem {
    pub label: String,
    pub color: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub display_name: String,
    pub has_tsne: bool,
    pub num_cases: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub display_name: String,
    pub has_activations: bool,
    pub layer: Option<u32>,
    #[serde(default)]
    pub num_clusters: usize,
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterInfo>,
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub models: BTreeMap<String, ModelInfo>,
    pub datasets: BTreeMap<String, String>,
    pub taxonomy: Vec<TaxonomyItem>,
    pub model_order: Vec<String>,
    pub dataset_order: Vec<String>,
}

impl Metadata {
    /// Points exist only for white-box models on datasets flagged with t-SNE.
    pub fn model_has_tsne(&self, model: &str, dataset: &str) -> bool {
        let Some(info) = self.models.get(model) else {
            return false;
        };
        info.has_activations
            && info
                .datasets
                .get(dataset)
                .map(|d| d.has_tsne)
                .unwrap_or(false)
    }

    pub fn clusters_for(&self, model: &str) -> Option<&BTreeMap<String, ClusterInfo>> {
        self.models.get(model).map(|m| &m.clusters)
    }

    pub fn taxonomy_item(&self, index: i32) -> Option<&TaxonomyItem> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.taxonomy.get(i))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(rename = "s")]
    pub text: String,
    #[serde(rename = "t")]
    pub taxonomy: i32,
    #[serde(rename = "c")]
    pub cluster: Option<String>,
    #[serde(rename = "i")]
    pub ordinal: u32,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl Sentence {
    pub fn coords(&self) -> Option<(f32, f32)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub qid: Option<u64>,
    #[serde(default)]
    pub prompt: String,
    pub true_dx: String,
    pub pred_dx: String,
    pub correct: bool,
    pub sentences: Vec<Sentence>,
}

impl Case {
    /// Sentence count per taxonomy slot; indices outside `[0, len)` are skipped.
    pub fn taxonomy_counts(&self, len: usize) -> Vec<usize> {
        let mut counts = vec![0; len];
        for s in &self.sentences {
            if let Some(slot) = usize::try_from(s.taxonomy).ok().filter(|&i| i < len) {
                counts[slot] += 1;
            }
        }
        counts
    }

    /// `(sentence index, x, y)` for every sentence that has both coordinates.
    pub fn embedded_sentences(&self) -> impl Iterator<Item = (usize, f32, f32)> + '_ {
        self.sentences
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.coords().map(|(x, y)| (i, x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(t: i32, x: Option<f32>, y: Option<f32>) -> Sentence {
        Sentence {
            text: "s".to_string(),
            taxonomy: t,
            cluster: None,
            ordinal: 1,
            x,
            y,
        }
    }

    #[test]
    fn point_decodes_from_flat_tuple() {
        let pts: Vec<Point> = serde_json::from_str("[[1.5, -2.0, 3, -1, 7, 12]]").expect("points");
        assert_eq!(
            pts[0],
            Point {
                x: 1.5,
                y: -2.0,
                taxonomy: 3,
                cluster: -1,
                case: 7,
                sentence: 12,
            }
        );
        assert_eq!(pts[0].cluster_id(), None);
        assert_eq!(pts[0].taxonomy_index(7), Some(3));
        assert_eq!(pts[0].taxonomy_index(3), None);

        let encoded = serde_json::to_string(&pts[0]).expect("encode");
        assert_eq!(encoded, "[1.5,-2.0,3,-1,7,12]");
    }

    #[test]
    fn negative_taxonomy_has_no_slot() {
        let p = Point {
            x: 0.0,
            y: 0.0,
            taxonomy: -1,
            cluster: 4,
            case: 0,
            sentence: 0,
        };
        assert_eq!(p.taxonomy_index(7), None);
        assert_eq!(p.cluster_id(), Some(4));
    }

    #[test]
    fn sentence_uses_short_keys_and_nullable_coords() {
        let raw = r#"{"s":"Fever noted.","t":1,"c":null,"i":1,"x":null,"y":2.0}"#;
        let s: Sentence = serde_json::from_str(raw).expect("sentence");
        assert_eq!(s.text, "Fever noted.");
        assert_eq!(s.coords(), None);
    }

    #[test]
    fn taxonomy_counts_skip_out_of_range() {
        let case = Case {
            id: "c0".to_string(),
            qid: None,
            prompt: String::new(),
            true_dx: "a".to_string(),
            pred_dx: "a".to_string(),
            correct: true,
            sentences: vec![
                sentence(0, None, None),
                sentence(0, None, None),
                sentence(2, None, None),
                sentence(-1, None, None),
                sentence(9, None, None),
            ],
        };
        assert_eq!(case.taxonomy_counts(3), vec![2, 0, 1]);
    }

    #[test]
    fn embedded_sentences_keep_order_and_original_index() {
        let case = Case {
            id: "c1".to_string(),
            qid: Some(4),
            prompt: String::new(),
            true_dx: "a".to_string(),
            pred_dx: "b".to_string(),
            correct: false,
            sentences: vec![
                sentence(0, Some(0.0), Some(0.0)),
                sentence(0, None, Some(1.0)),
                sentence(1, Some(3.0), Some(4.0)),
            ],
        };
        let got: Vec<_> = case.embedded_sentences().collect();
        assert_eq!(got, vec![(0, 0.0, 0.0), (2, 3.0, 4.0)]);
    }

    #[test]
    fn metadata_gates_tsne_on_activations_and_dataset_flag() {
        let raw = r##"{
            "models": {
                "white": {
                    "display_name": "White",
                    "has_activations": true,
                    "layer": 16,
                    "num_clusters": 2,
                    "clusters": {"0": {"title": "A", "description": "a"}},
                    "datasets": {"medqa": {"display_name": "MedQA", "has_tsne": true, "num_cases": 10}}
                },
                "black": {
                    "display_name": "Black",
                    "has_activations": false,
                    "layer": null,
                    "num_clusters": 0,
                    "clusters": {},
                    "datasets": {"medqa": {"display_name": "MedQA", "has_tsne": true, "num_cases": 10}}
                }
            },
            "datasets": {"medqa": "MedQA"},
            "taxonomy": [{"label": "Orchestration", "color": "#9467bd", "short_name": "Orch"}],
            "model_order": ["white", "black"],
            "dataset_order": ["medqa"]
        }"##;
        let meta: Metadata = serde_json::from_str(raw).expect("metadata");
        assert!(meta.model_has_tsne("white", "medqa"));
        assert!(!meta.model_has_tsne("black", "medqa"));
        assert!(!meta.model_has_tsne("white", "pubmed"));
        assert!(!meta.model_has_tsne("missing", "medqa"));
        assert_eq!(meta.taxonomy_item(0).map(|t| t.short_name.as_str()), Some("Orch"));
        assert!(meta.taxonomy_item(-1).is_none());
    }
}
