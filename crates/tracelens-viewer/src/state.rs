use bevy::prelude::Resource;
use smallvec::SmallVec;
use tracelens_core::ColorMode;

/// Which part of the selection changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Model,
    Dataset,
    Case,
    ColorMode,
    HoveredPoint,
    HoveredSentence,
    TrajectoryPlaying,
    TrajectoryProgress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryState {
    pub playing: bool,
    pub progress: f32,
}

/// Shared selection state. Listeners always receive the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub model: String,
    pub dataset: String,
    pub case_index: usize,
    pub color_mode: ColorMode,
    pub hovered_point: Option<usize>,
    pub hovered_sentence: Option<usize>,
    pub trajectory: TrajectoryState,
}

impl Selection {
    pub fn active_case(&self) -> Option<u32> {
        u32::try_from(self.case_index).ok()
    }
}

pub type Listener = Box<dyn FnMut(&Selection, Change) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Owner of the selection. Every setter notifies listeners in registration
/// order, once per field that actually changed, after all fields of the call
/// have been written.
#[derive(Resource, Default)]
pub struct AppStore {
    selection: Selection,
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

type Changes = SmallVec<[Change; 4]>;

impl AppStore {
    pub fn new(model: impl Into<String>, dataset: impl Into<String>, color_mode: ColorMode) -> Self {
        Self {
            selection: Selection {
                model: model.into(),
                dataset: dataset.into(),
                color_mode,
                ..Selection::default()
            },
            ..Self::default()
        }
    }

    pub fn get(&self) -> &Selection {
        &self.selection
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Selection, Change) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Switching model resets the case and both hovers.
    pub fn set_model(&mut self, model: &str) {
        let mut changes = Changes::new();
        if self.selection.model != model {
            self.selection.model = model.to_string();
            changes.push(Change::Model);
        }
        self.reset_case_and_hovers(&mut changes);
        self.notify(&changes);
    }

    pub fn set_dataset(&mut self, dataset: &str) {
        let mut changes = Changes::new();
        if self.selection.dataset != dataset {
            self.selection.dataset = dataset.to_string();
            changes.push(Change::Dataset);
        }
        self.reset_case_and_hovers(&mut changes);
        self.notify(&changes);
    }

    pub fn set_case_index(&mut self, index: usize) {
        let mut changes = Changes::new();
        self.write_case(index, &mut changes);
        self.clear_hovers(&mut changes);
        self.notify(&changes);
    }

    /// Jump to a case and start its trajectory from the beginning.
    pub fn navigate_to_case(&mut self, index: usize) {
        let mut changes = Changes::new();
        self.write_case(index, &mut changes);
        self.clear_hovers(&mut changes);
        if self.selection.trajectory.progress != 0.0 {
            self.selection.trajectory.progress = 0.0;
            changes.push(Change::TrajectoryProgress);
        }
        // A repeated navigation to the same case must restart playback.
        self.selection.trajectory.playing = true;
        changes.push(Change::TrajectoryPlaying);
        self.notify(&changes);
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if self.selection.color_mode != mode {
            self.selection.color_mode = mode;
            self.notify(&[Change::ColorMode]);
        }
    }

    pub fn set_hovered_point(&mut self, index: Option<usize>) {
        if self.selection.hovered_point != index {
            self.selection.hovered_point = index;
            self.notify(&[Change::HoveredPoint]);
        }
    }

    pub fn set_hovered_sentence(&mut self, index: Option<usize>) {
        if self.selection.hovered_sentence != index {
            self.selection.hovered_sentence = index;
            self.notify(&[Change::HoveredSentence]);
        }
    }

    pub fn set_trajectory_playing(&mut self, playing: bool) {
        if self.selection.trajectory.playing != playing {
            self.selection.trajectory.playing = playing;
            self.notify(&[Change::TrajectoryPlaying]);
        }
    }

    pub fn set_trajectory_progress(&mut self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        if self.selection.trajectory.progress != progress {
            self.selection.trajectory.progress = progress;
            self.notify(&[Change::TrajectoryProgress]);
        }
    }

    fn write_case(&mut self, index: usize, changes: &mut Changes) {
        if self.selection.case_index != index {
            self.selection.case_index = index;
            changes.push(Change::Case);
        }
    }

    fn clear_hovers(&mut self, changes: &mut Changes) {
        if self.selection.hovered_point.take().is_some() {
            changes.push(Change::HoveredPoint);
        }
        if self.selection.hovered_sentence.take().is_some() {
            changes.push(Change::HoveredSentence);
        }
    }

    fn reset_case_and_hovers(&mut self, changes: &mut Changes) {
        self.write_case(0, changes);
        self.clear_hovers(changes);
    }

    fn notify(&mut self, changes: &[Change]) {
        for &change in changes {
            for (_, listener) in self.listeners.iter_mut() {
                listener(&self.selection, change);
            }
        }
    }
}
