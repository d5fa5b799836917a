// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::player::WidgetOptions;
use crate::player::controller::ControlTiming;
use crate::video_ref::ThumbnailTier;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub player: PlayerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog TOML to load instead of the built-in one.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub seek_step_secs: f64,
    /// Autoplay muted and unmute once the widget is ready.
    pub start_muted: bool,
    pub thumbnail_tier: ThumbnailTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub carousel_limit: usize,
    pub grid_columns: usize,
    pub controls_timeout_ms: u64,
    pub sample_interval_ms: u64,
    pub restore_delay_ms: u64,
    pub restore_attempts: u32,
    pub tick_rate_ms: u64,
    pub log_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec!["--geometry=1280x720".to_string()],
            seek_step_secs: 10.0,
            start_muted: true,
            thumbnail_tier: ThumbnailTier::MaxRes,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            carousel_limit: 10,
            grid_columns: 6,
            controls_timeout_ms: 3000,
            sample_interval_ms: 250,
            restore_delay_ms: 50,
            restore_attempts: 5,
            tick_rate_ms: 50,
            log_capacity: 200,
        }
    }
}

impl PlayerConfig {
    pub fn widget_options(&self) -> WidgetOptions {
        WidgetOptions {
            autoplay: true,
            start_muted: self.start_muted,
            hide_native_controls: true,
        }
    }
}

impl UiConfig {
    pub fn control_timing(&self) -> ControlTiming {
        ControlTiming {
            controls_timeout: Duration::from_millis(self.controls_timeout_ms),
            sample_interval: Duration::from_millis(self.sample_interval_ms),
        }
    }

    pub fn restore_delay(&self) -> Duration {
        Duration::from_millis(self.restore_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

impl Config {
    /// `<config dir>/tvcatalog/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tvcatalog").join("config.toml"))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// A missing file yields the defaults; a broken one is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.ui.carousel_limit > 0, "ui.carousel_limit must be at least 1");
        anyhow::ensure!(self.ui.grid_columns > 0, "ui.grid_columns must be at least 1");
        anyhow::ensure!(
            self.ui.sample_interval_ms > 0,
            "ui.sample_interval_ms must be greater than 0"
        );
        anyhow::ensure!(self.ui.tick_rate_ms > 0, "ui.tick_rate_ms must be greater than 0");
        anyhow::ensure!(
            self.player.seek_step_secs.is_finite() && self.player.seek_step_secs > 0.0,
            "player.seek_step_secs must be a positive number"
        );
        anyhow::ensure!(!self.player.command.trim().is_empty(), "player.command is empty");
        Ok(())
    }
}
