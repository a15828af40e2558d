//! Keeps loaded data, the selection store and the canvas in step.

use crossbeam_channel::Sender;
use tracelens_core::Metadata;

use crate::app::resources::{CanvasState, DataState};
use crate::canvas::{RedrawReason, ViewEvent};
use crate::data::{Incoming, IncomingKind, Request};
use crate::state::{AppStore, Change};
use crate::trajectory::TrajectoryEvent;

/// Apply one loader message. Replies for a selection that is no longer
/// current are dropped.
pub fn apply_incoming(
    inc: Incoming,
    data: &mut DataState,
    store: &mut AppStore,
    canvas: &mut CanvasState,
    tx: &Sender<Request>,
) {
    match inc.kind {
        IncomingKind::Metadata(metadata) => {
            data.loading.metadata = false;
            data.metadata = Some(metadata.clone());
            tracing::info!(
                source = %inc.source,
                models = metadata.models.len(),
                taxonomy = metadata.taxonomy.len(),
                "metadata loaded"
            );
            // A corrected selection reloads through the store's change path.
            if !fix_selection(&metadata, store) {
                canvas.rebuild_palette(data, &store.get().model);
                data.request_selection(tx, store.get());
            }
        }
        IncomingKind::Cases {
            model,
            dataset,
            cases,
        } => {
            let sel = store.get();
            if sel.model != model || sel.dataset != dataset {
                tracing::debug!(model = %model, dataset = %dataset, "dropping stale cases");
                return;
            }
            data.loading.cases = false;
            data.cases = Some(cases.clone());
            if sel.case_index >= cases.len() && !cases.is_empty() {
                store.set_case_index(0);
            }
            canvas.rebuild_path(data.case(store.get().case_index));
            canvas.view.request_redraw(RedrawReason::Trajectory);
        }
        IncomingKind::Points { model, points } => {
            if store.get().model != model || !data.loading.points {
                tracing::debug!(model = %model, "dropping stale points");
                return;
            }
            data.loading.points = false;
            data.points = Some(points.clone());
            tracing::info!(model = %model, count = points.len(), "points loaded");
            for event in canvas.view.set_points(points) {
                if let ViewEvent::Hover(None) = event {
                    store.set_hovered_point(None);
                }
            }
            canvas.rebuild_path(data.case(store.get().case_index));
        }
        IncomingKind::Error { request, message } => {
            match request {
                Request::Metadata => data.loading.metadata = false,
                Request::Cases { .. } => data.loading.cases = false,
                Request::Points { .. } => {
                    data.loading.points = false;
                    data.points = None;
                }
            }
            data.status = Some(message);
        }
    }
}

/// Point the selection at something the metadata knows. Returns whether
/// the store was changed.
fn fix_selection(metadata: &Metadata, store: &mut AppStore) -> bool {
    let mut changed = false;
    if !metadata.models.contains_key(&store.get().model) {
        let fallback = metadata
            .model_order
            .iter()
            .find(|m| metadata.models.contains_key(*m))
            .or_else(|| metadata.models.keys().next());
        if let Some(model) = fallback.cloned() {
            tracing::warn!(requested = %store.get().model, using = %model, "unknown model");
            store.set_model(&model);
            changed = true;
        }
    }

    let Some(info) = metadata.models.get(&store.get().model) else {
        return changed;
    };
    if !info.datasets.is_empty() && !info.datasets.contains_key(&store.get().dataset) {
        let fallback = metadata
            .dataset_order
            .iter()
            .find(|d| info.datasets.contains_key(*d))
            .or_else(|| info.datasets.keys().next());
        if let Some(dataset) = fallback.cloned() {
            tracing::warn!(requested = %store.get().dataset, using = %dataset, "unknown dataset");
            store.set_dataset(&dataset);
            changed = true;
        }
    }
    changed
}

/// React to a batch of store notifications, in order. A model or dataset
/// switch is handled once per batch.
pub fn apply_changes(
    changes: &[Change],
    now: f64,
    data: &mut DataState,
    store: &mut AppStore,
    canvas: &mut CanvasState,
    tx: &Sender<Request>,
) {
    if changes
        .iter()
        .any(|c| matches!(c, Change::Model | Change::Dataset))
    {
        let sel = store.get();
        tracing::info!(model = %sel.model, dataset = %sel.dataset, "selection switched");
        canvas.view.close();
        canvas.animator.reset();
        canvas.cursor = None;
        canvas.path = Default::default();
        canvas.rebuild_palette(data, &sel.model);
        data.request_selection(tx, sel);
    }

    for change in changes {
        match change {
            Change::Model | Change::Dataset | Change::TrajectoryProgress => {}
            Change::Case => {
                canvas.animator.reset();
                canvas.rebuild_path(data.case(store.get().case_index));
                canvas.view.request_redraw(RedrawReason::ActiveCase);
            }
            Change::ColorMode => canvas.view.request_redraw(RedrawReason::ColorMode),
            // The view already repainted its own hit-test; only a clear from
            // outside the canvas has to reach it.
            Change::HoveredPoint => {
                if store.get().hovered_point.is_none() {
                    canvas.view.clear_hover();
                }
            }
            Change::HoveredSentence => canvas.view.request_redraw(RedrawReason::Hover),
            Change::TrajectoryPlaying => {
                if store.get().trajectory.playing {
                    canvas.rebuild_path(data.case(store.get().case_index));
                    let done = canvas.animator.play(now, &canvas.path);
                    if done == Some(TrajectoryEvent::Completed) {
                        store.set_trajectory_playing(false);
                    }
                } else {
                    canvas.animator.stop();
                }
                canvas.view.request_redraw(RedrawReason::Trajectory);
            }
        }
    }
}

/// Per-frame trajectory step: follow the sentence hover, then advance play.
pub fn advance_trajectory(now: f64, store: &mut AppStore, canvas: &mut CanvasState) {
    let hovered = store.get().hovered_sentence;
    if canvas.animator.follow_hover(hovered, &canvas.path) {
        if store.get().trajectory.playing && !canvas.animator.is_playing() {
            store.set_trajectory_playing(false);
        }
        store.set_trajectory_progress(canvas.animator.reveal());
        canvas.view.request_redraw(RedrawReason::Trajectory);
    }

    if !canvas.animator.is_playing() {
        return;
    }
    let done = canvas.animator.tick(now);
    store.set_trajectory_progress(canvas.animator.reveal());
    canvas.view.request_redraw(RedrawReason::Trajectory);
    if done == Some(TrajectoryEvent::Completed) {
        tracing::debug!(case = store.get().case_index, "trajectory playback complete");
        store.set_trajectory_playing(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::ViewerConfig;
    use bevy::math::Vec2;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tracelens_core::{Case, ColorMode, DatasetInfo, ModelInfo, Point, Sentence};

    fn metadata() -> Arc<Metadata> {
        let mut datasets = BTreeMap::new();
        datasets.insert(
            "medqa".to_string(),
            DatasetInfo {
                display_name: "MedQA".into(),
                has_tsne: true,
                num_cases: 1,
            },
        );
        let mut models = BTreeMap::new();
        models.insert(
            "m".to_string(),
            ModelInfo {
                display_name: "M".into(),
                has_activations: true,
                layer: None,
                num_clusters: 0,
                clusters: BTreeMap::new(),
                datasets,
            },
        );
        Arc::new(Metadata {
            models,
            datasets: BTreeMap::new(),
            taxonomy: Vec::new(),
            model_order: vec!["m".into()],
            dataset_order: vec!["medqa".into()],
        })
    }

    fn case(coords: &[(f32, f32)]) -> Case {
        Case {
            id: "c".into(),
            qid: None,
            prompt: String::new(),
            true_dx: "a".into(),
            pred_dx: "a".into(),
            correct: true,
            sentences: coords
                .iter()
                .map(|&(x, y)| Sentence {
                    text: "s".into(),
                    taxonomy: 0,
                    cluster: None,
                    ordinal: 1,
                    x: Some(x),
                    y: Some(y),
                })
                .collect(),
        }
    }

    struct Harness {
        data: DataState,
        store: AppStore,
        canvas: CanvasState,
        tx: Sender<Request>,
        rx: crossbeam_channel::Receiver<Request>,
    }

    impl Harness {
        fn new(model: &str) -> Self {
            let (tx, rx) = crossbeam_channel::unbounded();
            let mut canvas = CanvasState::new(&ViewerConfig::default());
            canvas.view.resize(Vec2::new(400.0, 300.0), 1.0);
            Self {
                data: DataState::default(),
                store: AppStore::new(model, "medqa", ColorMode::Taxonomy),
                canvas,
                tx,
                rx,
            }
        }

        fn feed(&mut self, kind: IncomingKind) {
            let inc = Incoming {
                source: "test".into(),
                kind,
            };
            apply_incoming(inc, &mut self.data, &mut self.store, &mut self.canvas, &self.tx);
        }

        fn changes(&mut self, changes: &[Change], now: f64) {
            apply_changes(
                changes,
                now,
                &mut self.data,
                &mut self.store,
                &mut self.canvas,
                &self.tx,
            );
        }
    }

    #[test]
    fn metadata_triggers_selection_loads() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        let sent: Vec<Request> = h.rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                Request::Cases {
                    model: "m".into(),
                    dataset: "medqa".into()
                },
                Request::Points { model: "m".into() },
            ]
        );
        assert!(h.data.loading.points);
    }

    #[test]
    fn unknown_model_falls_back_through_the_store() {
        let mut h = Harness::new("missing");
        h.feed(IncomingKind::Metadata(metadata()));
        assert_eq!(h.store.get().model, "m");
        // The reload happens when the Model change is applied.
        assert!(h.rx.try_recv().is_err());
        h.changes(&[Change::Model], 0.0);
        assert_eq!(h.rx.try_iter().count(), 2);
    }

    #[test]
    fn stale_points_are_dropped() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        h.feed(IncomingKind::Points {
            model: "other".into(),
            points: Arc::from(vec![Point {
                x: 0.0,
                y: 0.0,
                taxonomy: 0,
                cluster: -1,
                case: 0,
                sentence: 0,
            }]),
        });
        assert!(h.data.points.is_none());
        assert!(h.canvas.view.points().is_empty());
    }

    #[test]
    fn point_load_failure_is_reported() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        h.feed(IncomingKind::Error {
            request: Request::Points { model: "m".into() },
            message: "open tsne/m.json: not found".into(),
        });
        assert!(!h.data.loading.points);
        assert!(h.data.points.is_none());
        assert!(h.data.status.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn navigate_plays_and_completes() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        h.feed(IncomingKind::Cases {
            model: "m".into(),
            dataset: "medqa".into(),
            cases: Arc::from(vec![case(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)])]),
        });
        assert!(h.canvas.path.is_drawable());

        h.store.navigate_to_case(0);
        h.changes(&[Change::TrajectoryPlaying], 10.0);
        assert!(h.canvas.animator.is_playing());

        advance_trajectory(11.0, &mut h.store, &mut h.canvas);
        assert!(h.store.get().trajectory.playing);
        assert!((h.store.get().trajectory.progress - 0.5).abs() < 1e-6);

        advance_trajectory(12.0, &mut h.store, &mut h.canvas);
        assert!(!h.store.get().trajectory.playing);
        assert_eq!(h.store.get().trajectory.progress, 1.0);
    }

    #[test]
    fn play_without_a_path_resets_immediately() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        h.store.set_trajectory_playing(true);
        h.changes(&[Change::TrajectoryPlaying], 0.0);
        assert!(!h.store.get().trajectory.playing);
        assert!(!h.canvas.animator.is_playing());
    }

    #[test]
    fn sentence_hover_stops_playback() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        h.feed(IncomingKind::Cases {
            model: "m".into(),
            dataset: "medqa".into(),
            cases: Arc::from(vec![case(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]),
        });
        h.store.navigate_to_case(0);
        h.changes(&[Change::TrajectoryPlaying], 0.0);
        advance_trajectory(0.2, &mut h.store, &mut h.canvas);

        h.store.set_hovered_sentence(Some(1));
        advance_trajectory(0.3, &mut h.store, &mut h.canvas);
        assert!(!h.store.get().trajectory.playing);
        assert!((h.store.get().trajectory.progress - 0.5).abs() < 1e-3);

        advance_trajectory(5.0, &mut h.store, &mut h.canvas);
        assert!((h.canvas.animator.reveal() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn dataset_switch_closes_the_view() {
        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        let _ = h.rx.try_iter().count();
        h.feed(IncomingKind::Points {
            model: "m".into(),
            points: Arc::from(vec![Point {
                x: 1.0,
                y: 1.0,
                taxonomy: 0,
                cluster: -1,
                case: 0,
                sentence: 0,
            }]),
        });
        assert_eq!(h.canvas.view.points().len(), 1);

        h.changes(&[Change::Dataset, Change::Model], 0.0);
        assert!(h.canvas.view.is_closed());
        assert!(h.data.points.is_none());
        // One reload for the whole batch.
        assert_eq!(h.rx.try_iter().count(), 2);
    }

    #[test]
    fn canvas_hover_is_not_painted_twice() {
        use crate::canvas::{Palette, PointerInput, Scene};

        let mut h = Harness::new("m");
        h.feed(IncomingKind::Metadata(metadata()));
        h.feed(IncomingKind::Points {
            model: "m".into(),
            points: Arc::from(vec![Point {
                x: 1.0,
                y: 1.0,
                taxonomy: 0,
                cluster: -1,
                case: 0,
                sentence: 0,
            }]),
        });
        let palette = Palette::default();
        let scene = Scene {
            palette: &palette,
            color_mode: ColorMode::Taxonomy,
            active_case: None,
            hovered_sentence: None,
            trajectory: None,
        };
        h.canvas.view.paint(&scene);

        let view = &h.canvas.view;
        let at = view.transform().apply(view.scales().project_point(&view.points()[0]));
        h.canvas.view.handle(PointerInput::Move(at));
        assert!(h.canvas.view.paint(&scene));
        assert!(h.canvas.view.stats().hovered);

        // The store catches up a frame later without another repaint.
        h.store.set_hovered_point(Some(0));
        h.changes(&[Change::HoveredPoint], 0.0);
        assert!(!h.canvas.view.scheduler().is_pending());

        // Esc clears the store; the view drops its hover and repaints.
        h.store.set_hovered_point(None);
        h.changes(&[Change::HoveredPoint], 0.0);
        assert_eq!(h.canvas.view.hovered(), None);
        assert!(h.canvas.view.paint(&scene));
        assert!(!h.canvas.view.stats().hovered);
    }
}
