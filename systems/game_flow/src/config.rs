//! Game-wide configuration validated before a controller exists.

use std::time::Duration;

use pipe_flow_core::{ConfigError, GridConfig};

/// Tunables for a game session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Name shown by adapters.
    pub game_name: String,
    /// Grid dimensions and blocker count.
    pub grid: GridConfig,
    /// Starting value of the round countdown.
    pub round_duration: Duration,
    /// Fixed step by which the countdown decreases.
    pub tick_interval: Duration,
    /// Time water takes to advance one hop; zero floods the board at once.
    pub water_step_delay: Duration,
    /// Number of upcoming tiles visible in the queue.
    pub queue_length: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_name: String::from("Pipe Flow"),
            grid: GridConfig::default(),
            round_duration: Duration::from_secs(30),
            tick_interval: Duration::from_millis(100),
            water_step_delay: Duration::from_millis(500),
            queue_length: 7,
        }
    }
}

impl GameConfig {
    /// Checks every setting a round depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;

        if self.queue_length == 0 {
            return Err(ConfigError::EmptyTileQueue);
        }

        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }

        Ok(())
    }
}
