use std::sync::Arc;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use crossbeam_channel::{Receiver, Sender};
use tracelens_core::{Case, Metadata, ModelInfo, Point};

use crate::canvas::{Palette, PointCloudView};
use crate::data::{Incoming, Request};
use crate::state::{Change, Selection};
use crate::trajectory::{Trajectory, TrajectoryAnimator};
use crate::ui::browser::BrowserTab;
use crate::util::config::ViewerConfig;

#[derive(Resource)]
pub struct LoaderRx(pub Receiver<Incoming>);

#[derive(Resource)]
pub struct LoaderTx(pub Sender<Request>);

/// Store notifications forwarded by the channel subscriber.
#[derive(Resource)]
pub struct ChangeRx(pub Receiver<Change>);

#[derive(Resource, Debug, Clone)]
pub struct Settings(pub ViewerConfig);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Loading {
    pub metadata: bool,
    pub cases: bool,
    pub points: bool,
}

/// Loaded data for the current selection.
#[derive(Resource, Debug, Default)]
pub struct DataState {
    pub metadata: Option<Arc<Metadata>>,
    pub cases: Option<Arc<[Case]>>,
    pub points: Option<Arc<[Point]>>,
    pub loading: Loading,
    /// Last load error, shown in the side panel.
    pub status: Option<String>,
}

impl DataState {
    pub fn model_info(&self, model: &str) -> Option<&ModelInfo> {
        self.metadata.as_deref()?.models.get(model)
    }

    pub fn case(&self, index: usize) -> Option<&Case> {
        self.cases.as_deref()?.get(index)
    }

    pub fn has_tsne(&self, sel: &Selection) -> bool {
        self.metadata
            .as_deref()
            .is_some_and(|m| m.model_has_tsne(&sel.model, &sel.dataset))
    }

    /// Drop per-selection data and ask the loader for the new selection.
    /// Points are only requested where the model has embeddings.
    pub fn request_selection(&mut self, tx: &Sender<Request>, sel: &Selection) {
        self.cases = None;
        self.points = None;
        self.status = None;
        if self.metadata.is_none() {
            return;
        }

        self.loading.cases = send(
            tx,
            Request::Cases {
                model: sel.model.clone(),
                dataset: sel.dataset.clone(),
            },
        );
        self.loading.points = self.has_tsne(sel)
            && send(
                tx,
                Request::Points {
                    model: sel.model.clone(),
                },
            );
    }
}

fn send(tx: &Sender<Request>, req: Request) -> bool {
    match tx.send(req) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(request = ?e.0, "loader thread is gone");
            false
        }
    }
}

/// The canvas and everything drawn on it.
#[derive(Resource, Debug)]
pub struct CanvasState {
    pub view: PointCloudView,
    pub palette: Palette,
    pub path: Trajectory,
    pub animator: TrajectoryAnimator,
    /// Last pointer position inside the canvas, container pixels.
    pub cursor: Option<Vec2>,
}

impl CanvasState {
    pub fn new(cfg: &ViewerConfig) -> Self {
        Self {
            view: PointCloudView::new(cfg.hit_radius_px),
            palette: Palette::default(),
            path: Trajectory::default(),
            animator: TrajectoryAnimator::new(cfg.play_duration_secs),
            cursor: None,
        }
    }

    pub fn rebuild_path(&mut self, case: Option<&Case>) {
        self.path = match case {
            Some(case) => Trajectory::build(case, self.view.scales(), self.view.transform()),
            None => Trajectory::default(),
        };
    }

    pub fn rebuild_palette(&mut self, data: &DataState, model: &str) {
        let Some(metadata) = data.metadata.as_deref() else {
            self.palette = Palette::default();
            return;
        };
        let clusters = metadata.clusters_for(model).cloned().unwrap_or_default();
        self.palette = Palette::new(&metadata.taxonomy, &clusters);
    }
}

#[derive(Resource, Debug, Default)]
pub struct Perf {
    pub fps: f32,
}

#[derive(Resource, Debug, Default)]
pub struct UiFlags {
    pub help_open: bool,
    pub browser_open: bool,
    pub browser_tab: BrowserTab,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tracelens_core::{ColorMode, DatasetInfo};

    fn metadata(has_tsne: bool) -> Metadata {
        let mut datasets = BTreeMap::new();
        datasets.insert(
            "medqa".to_string(),
            DatasetInfo {
                display_name: "MedQA".into(),
                has_tsne,
                num_cases: 3,
            },
        );
        let mut models = BTreeMap::new();
        models.insert(
            "m".to_string(),
            ModelInfo {
                display_name: "M".into(),
                has_activations: true,
                layer: Some(16),
                num_clusters: 0,
                clusters: BTreeMap::new(),
                datasets,
            },
        );
        Metadata {
            models,
            datasets: BTreeMap::new(),
            taxonomy: Vec::new(),
            model_order: vec!["m".into()],
            dataset_order: vec!["medqa".into()],
        }
    }

    fn selection() -> Selection {
        Selection {
            model: "m".into(),
            dataset: "medqa".into(),
            color_mode: ColorMode::Taxonomy,
            ..Selection::default()
        }
    }

    #[test]
    fn points_requested_only_with_tsne() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut data = DataState {
            metadata: Some(Arc::new(metadata(false))),
            ..DataState::default()
        };
        data.request_selection(&tx, &selection());
        assert!(data.loading.cases);
        assert!(!data.loading.points);
        let sent: Vec<Request> = rx.try_iter().collect();
        assert_eq!(sent.len(), 1);

        data.metadata = Some(Arc::new(metadata(true)));
        data.request_selection(&tx, &selection());
        assert!(data.loading.points);
        assert!(rx
            .try_iter()
            .any(|r| r == Request::Points { model: "m".into() }));
    }

    #[test]
    fn nothing_requested_before_metadata() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut data = DataState::default();
        data.request_selection(&tx, &selection());
        assert!(rx.try_recv().is_err());
        assert_eq!(data.loading, Loading::default());
    }

    #[test]
    fn closed_loader_clears_loading_flags() {
        let (tx, rx) = crossbeam_channel::unbounded::<Request>();
        drop(rx);
        let mut data = DataState {
            metadata: Some(Arc::new(metadata(true))),
            ..DataState::default()
        };
        data.request_selection(&tx, &selection());
        assert!(!data.loading.cases);
        assert!(!data.loading.points);
    }
}
