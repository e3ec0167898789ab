//! Game settings and tuning
//!
//! Loaded from an optional JSON file; every field falls back to `consts`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Cadence ===
    /// Render frames per second
    pub frame_rate: u32,
    /// Simulation ticks per second
    pub tick_rate: u32,

    // === Power-ups ===
    /// One-in-N chance per tick to release the next pending power-up.
    /// The draw must land on 1, so a value of 1 never releases anything.
    pub powerup_frequency: u32,
    /// Fall speed (units per tick)
    pub powerup_speed: f64,
    pub powerup_radius: i32,
    /// Height at which released power-ups appear
    pub powerup_spawn_y: f64,

    // === Session ===
    pub initial_lives: i32,
    /// Level area the terminal renderer scales onto the screen
    pub field_width: f64,
    pub field_height: f64,
    /// RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_rate: FRAME_RATE,
            tick_rate: TICK_RATE,

            powerup_frequency: POWERUP_FREQUENCY,
            powerup_speed: POWERUP_SPEED,
            powerup_radius: POWERUP_RADIUS,
            powerup_spawn_y: POWERUP_SPAWN_Y,

            initial_lives: INITIAL_LIVES,
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            seed: None,
        }
    }
}

impl Settings {
    /// Time between frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }

    /// Time between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, or defaults if there is none or it is unreadable
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Bad settings file {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read settings {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let settings = Settings::default();
        assert_eq!(settings.frame_rate, 60);
        assert_eq!(settings.tick_rate, 100);
        assert_eq!(settings.powerup_frequency, 4000);
        assert_eq!(settings.initial_lives, 3);
        assert_eq!(settings.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "tick_rate": 50, "seed": 7 }"#).unwrap();
        assert_eq!(settings.tick_rate, 50);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.frame_rate, FRAME_RATE);
        assert_eq!(settings.powerup_speed, POWERUP_SPEED);
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            powerup_frequency: 10,
            seed: Some(3),
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load(Some(Path::new("/nonexistent/brick-breaker.json")));
        assert_eq!(settings, Settings::default());
        assert_eq!(Settings::load(None), Settings::default());
    }
}
