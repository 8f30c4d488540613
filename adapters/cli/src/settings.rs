//! Game settings assembled from an optional TOML file and command-line flags.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use log::debug;
use pipe_flow_core::GridConfig;
use pipe_flow_system_game_flow::GameConfig;
use serde::Deserialize;

use crate::args::Cli;

/// On-disk settings; durations are expressed in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ConfigFile {
    pub(crate) game_name: String,
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) blocked: u32,
    pub(crate) round_ms: u64,
    pub(crate) tick_ms: u64,
    pub(crate) water_step_ms: u64,
    pub(crate) queue_length: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for ConfigFile {
    fn from(config: &GameConfig) -> Self {
        Self {
            game_name: config.game_name.clone(),
            columns: config.grid.columns(),
            rows: config.grid.rows(),
            blocked: config.grid.blocked(),
            round_ms: millis(config.round_duration),
            tick_ms: millis(config.tick_interval),
            water_step_ms: millis(config.water_step_delay),
            queue_length: config.queue_length,
        }
    }
}

impl ConfigFile {
    /// Reads and parses a settings file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let file: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!("loaded settings from {}", path.display());
        Ok(file)
    }

    /// Replaces file values with any flags given on the command line.
    pub(crate) fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(columns) = cli.columns {
            self.columns = columns;
        }
        if let Some(rows) = cli.rows {
            self.rows = rows;
        }
        if let Some(blocked) = cli.blocked {
            self.blocked = blocked;
        }
        if let Some(round_ms) = cli.round_ms {
            self.round_ms = round_ms;
        }
        if let Some(queue_length) = cli.queue_length {
            self.queue_length = queue_length;
        }
    }

    /// Converts the settings into a game configuration.
    pub(crate) fn into_game_config(self) -> GameConfig {
        GameConfig {
            game_name: self.game_name,
            grid: GridConfig::new(self.columns, self.rows, self.blocked),
            round_duration: Duration::from_millis(self.round_ms),
            tick_interval: Duration::from_millis(self.tick_ms),
            water_step_delay: Duration::from_millis(self.water_step_ms),
            queue_length: self.queue_length,
        }
    }
}

/// Builds the validated game configuration for a command line.
pub(crate) fn resolve(cli: &Cli) -> Result<GameConfig> {
    let mut file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    file.apply_overrides(cli);

    let config = file.into_game_config();
    config.validate().context("invalid game settings")?;
    Ok(config)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
