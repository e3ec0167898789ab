//! Brick Breaker - a paddle, a ball and a wall of bricks
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (entities, collisions, power-ups, game state)
//! - `level`: Level file factory for the initial world
//! - `scheduler`: Dual-cadence loop driving frames and ticks
//! - `renderer`: Render sinks (terminal)
//! - `platform`: Terminal setup and keyboard input
//! - `settings`: Data-driven tuning

pub mod level;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use level::{LevelError, LevelErrorKind};
pub use scheduler::{Clock, InputEvent, InputSource, Outcome, RenderSink, SystemClock};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Frames drawn per second
    pub const FRAME_RATE: u32 = 60;
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 100;
    /// A larger number makes power-ups less frequent (one draw per tick)
    pub const POWERUP_FREQUENCY: u32 = 4000;

    /// Lives at the start of a session
    pub const INITIAL_LIVES: i32 = 3;

    /// Power-up defaults
    pub const POWERUP_SPEED: f64 = 0.25;
    pub const POWERUP_RADIUS: i32 = 4;
    pub const POWERUP_SPAWN_Y: f64 = 20.0;

    /// Playfield dimensions (level coordinates)
    pub const FIELD_WIDTH: f64 = 500.0;
    pub const FIELD_HEIGHT: f64 = 500.0;
}

/// Fixed palette, assigned by entity category
pub mod palette {
    use crate::sim::Color;

    pub const PADDLE: Color = Color::rgb(28, 0, 150);
    pub const WALL: Color = Color::rgb(1, 21, 241);
    pub const DEATH_LINE: Color = Color::rgb(0, 0, 0);
    pub const BRICK: Color = Color::rgb(25, 72, 1);
    pub const BALL: Color = Color::rgb(224, 210, 160);
    pub const POWERUP: Color = Color::rgb(255, 200, 0);
    pub const LIFE: Color = Color::rgb(224, 210, 160);
    pub const BACKGROUND: Color = Color::rgb(80, 80, 80);
}
