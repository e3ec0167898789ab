//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only (one `pos += vel` step per tick)
//! - Caller-supplied RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{Penetration, Response, Side, collide, detect, paddle_bounce};
pub use entity::{Body, Circle, Color, EntityId, Rect};
pub use powerup::{PendingPowerUp, PowerUpKind, apply_effect};
pub use state::{GameEvent, GamePhase, GameState, MoverEntity, MoverKind, RectEntity, RectKind};
pub use tick::{Command, apply_command, tick};
