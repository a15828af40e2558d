use bevy::prelude::*;

use crate::app::events::{PointClicked, PointHovered, ScalesChanged};
use crate::app::resources::{
    CanvasState, ChangeRx, DataState, Loading, LoaderRx, LoaderTx, Perf, Settings, UiFlags,
};
use crate::data::{spawn_loader, DataPaths, Request};
use crate::state::{AppStore, Change};
use crate::ui::UiLayout;
use crate::util::config;

pub mod events;
pub mod resources;
pub mod sync;

pub struct TraceLensPlugin;

impl Plugin for TraceLensPlugin {
    fn build(&self, app: &mut App) {
        let cfg = config::load_or_default();
        tracing::info!(
            data_dir = %cfg.data_dir.display(),
            model = %cfg.default_model,
            dataset = %cfg.default_dataset,
            "viewer config loaded"
        );

        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_loader(DataPaths::new(&cfg.data_dir), req_rx, tx);
        let mut loading = Loading::default();
        match req_tx.send(Request::Metadata) {
            Ok(()) => loading.metadata = true,
            Err(e) => tracing::error!(request = ?e.0, "loader thread is gone"),
        }

        let mut store = AppStore::new(&cfg.default_model, &cfg.default_dataset, cfg.color_mode);
        store.subscribe(|sel, change| {
            tracing::debug!(
                ?change,
                model = %sel.model,
                dataset = %sel.dataset,
                case = sel.case_index,
                "selection changed"
            );
        });
        let (change_tx, change_rx) = crossbeam_channel::unbounded();
        store.subscribe(move |_, change| {
            let _ = change_tx.send(change);
        });

        app.add_event::<PointHovered>()
            .add_event::<PointClicked>()
            .add_event::<ScalesChanged>()
            .insert_resource(CanvasState::new(&cfg))
            .insert_resource(DataState {
                loading,
                ..DataState::default()
            })
            .insert_resource(store)
            .insert_resource(Settings(cfg))
            .insert_resource(LoaderRx(rx))
            .insert_resource(LoaderTx(req_tx))
            .insert_resource(ChangeRx(change_rx))
            .init_resource::<Perf>()
            .init_resource::<UiFlags>()
            .init_resource::<UiLayout>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    pump_loader,
                    apply_store_changes,
                    tick_housekeeping,
                    tick_trajectory,
                    crate::ui::handle_shortcuts,
                    crate::ui::ui_panel,
                    crate::ui::trace_panel,
                    crate::ui::legend_panel,
                    crate::ui::canvas_panel,
                    crate::ui::help_overlay,
                    crate::ui::browser_window,
                    crate::ui::hud_overlay,
                    apply_view_events,
                    close_on_exit,
                )
                    .chain(),
            );
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

fn pump_loader(
    rx: Res<LoaderRx>,
    tx: Res<LoaderTx>,
    mut data: ResMut<DataState>,
    mut store: ResMut<AppStore>,
    mut canvas: ResMut<CanvasState>,
) {
    for inc in rx.0.try_iter().take(64) {
        sync::apply_incoming(inc, &mut data, &mut store, &mut canvas, &tx.0);
    }
}

/// Drains store notifications. Changes raised while applying a batch land
/// in the channel and are picked up next frame.
fn apply_store_changes(
    time: Res<Time>,
    rx: Res<ChangeRx>,
    tx: Res<LoaderTx>,
    mut data: ResMut<DataState>,
    mut store: ResMut<AppStore>,
    mut canvas: ResMut<CanvasState>,
) {
    let changes: Vec<Change> = rx.0.try_iter().collect();
    if changes.is_empty() {
        return;
    }
    sync::apply_changes(
        &changes,
        time.elapsed_seconds_f64(),
        &mut data,
        &mut store,
        &mut canvas,
        &tx.0,
    );
}

fn tick_housekeeping(time: Res<Time>, mut perf: ResMut<Perf>) {
    let dt = time.delta_seconds().max(0.0001);
    perf.fps = 1.0 / dt;
}

fn tick_trajectory(time: Res<Time>, mut store: ResMut<AppStore>, mut canvas: ResMut<CanvasState>) {
    sync::advance_trajectory(time.elapsed_seconds_f64(), &mut store, &mut canvas);
}

fn apply_view_events(
    data: Res<DataState>,
    mut store: ResMut<AppStore>,
    mut hovered: EventReader<PointHovered>,
    mut clicked: EventReader<PointClicked>,
    mut scaled: EventReader<ScalesChanged>,
) {
    for PointHovered(index) in hovered.read() {
        store.set_hovered_point(*index);
    }
    for click in clicked.read() {
        let index = click.case as usize;
        let known = data.cases.as_deref().map_or(true, |cases| index < cases.len());
        if !known {
            tracing::warn!(case = click.case, "clicked point refers to an unknown case");
            continue;
        }
        tracing::debug!(case = click.case, sentence = click.sentence, "point clicked");
        store.navigate_to_case(index);
    }
    for ScalesChanged(view) in scaled.read() {
        tracing::trace!(
            k = view.transform.k,
            tx = view.transform.translate.x,
            ty = view.transform.translate.y,
            "view transform changed"
        );
    }
}

fn close_on_exit(mut exits: EventReader<AppExit>, mut canvas: ResMut<CanvasState>) {
    if exits.read().last().is_none() {
        return;
    }
    canvas.view.close();
    canvas.animator.stop();
    tracing::info!("canvas closed");
}
