use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracelens_core::ColorMode;

use crate::canvas::query::HIT_RADIUS;
use crate::trajectory::PLAY_DURATION;

/// Overrides `data_dir` when set.
pub const DATA_DIR_ENV: &str = "TRACELENS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data_dir: PathBuf,
    pub default_model: String,
    pub default_dataset: String,
    pub color_mode: ColorMode,
    pub hit_radius_px: f32,
    pub play_duration_secs: f32,
    pub show_hud: bool,
    pub tooltip_max_chars: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_model: "deepseek-r1-distill-llama-8b".to_string(),
            default_dataset: "medqa".to_string(),
            color_mode: ColorMode::Taxonomy,
            hit_radius_px: HIT_RADIUS,
            play_duration_secs: PLAY_DURATION,
            show_hud: true,
            tooltip_max_chars: 200,
        }
    }
}

impl ViewerConfig {
    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.hit_radius_px.is_finite() && self.hit_radius_px > 0.0) {
            self.hit_radius_px = defaults.hit_radius_px;
        }
        if !(self.play_duration_secs.is_finite() && self.play_duration_secs > 0.0) {
            self.play_duration_secs = defaults.play_duration_secs;
        }
        if self.tooltip_max_chars == 0 {
            self.tooltip_max_chars = defaults.tooltip_max_chars;
        }
        self
    }

    fn with_env_override(mut self, value: Option<String>) -> Self {
        if let Some(dir) = value.filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "tracelens")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let cfg = match config_file_path() {
        Some(path) => load_or_default_from_path(&path),
        None => ViewerConfig::default(),
    };
    cfg.with_env_override(std::env::var(DATA_DIR_ENV).ok())
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    match toml::from_str::<ViewerConfig>(&contents) {
        Ok(cfg) => cfg.sanitized(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid viewer config, using defaults");
            ViewerConfig::default()
        }
    }
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}
