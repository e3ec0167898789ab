//! Power-up lifecycle: pending queue, random release, pickup effects

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Circle, EntityId};
use super::state::GameState;
use crate::palette;
use crate::settings::Settings;

/// Power-up types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    ExtraLife,
    SlowPaddle,
    FastPaddle,
    /// Unrecognized name from a level file; picking it up does nothing
    Other(String),
}

impl PowerUpKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "ExtraLife" => PowerUpKind::ExtraLife,
            "SlowPaddle" => PowerUpKind::SlowPaddle,
            "FastPaddle" => PowerUpKind::FastPaddle,
            other => PowerUpKind::Other(other.to_string()),
        }
    }
}

/// A power-up waiting in the queue, with the x-range it may spawn in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPowerUp {
    pub kind: PowerUpKind,
    pub min_x: i32,
    pub max_x: i32,
}

/// Apply a pickup to the session. Effects stack and never expire.
pub fn apply_effect(state: &mut GameState, kind: &PowerUpKind) {
    match kind {
        PowerUpKind::ExtraLife => state.lives += 1,
        PowerUpKind::FastPaddle => state.paddle_speed *= 2.0,
        PowerUpKind::SlowPaddle => state.paddle_speed /= 2.0,
        PowerUpKind::Other(name) => {
            log::debug!("Ignoring unknown power-up {name:?}");
        }
    }
}

/// One Bernoulli draw per tick: with probability `1/frequency` release the
/// front of the pending queue into the live world.
pub fn maybe_release<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    settings: &Settings,
) -> Option<(EntityId, PowerUpKind)> {
    if state.pending.is_empty() {
        return None;
    }
    let frequency = settings.powerup_frequency.max(1);
    if rng.random_range(0..frequency) != 1 {
        return None;
    }
    let pending = state.pending.pop_front()?;
    Some(release(state, pending, rng, settings))
}

/// Place a pending power-up at a random x in its range at the top of the field
pub fn release<R: Rng + ?Sized>(
    state: &mut GameState,
    pending: PendingPowerUp,
    rng: &mut R,
    settings: &Settings,
) -> (EntityId, PowerUpKind) {
    let (lo, hi) = if pending.min_x <= pending.max_x {
        (pending.min_x, pending.max_x)
    } else {
        (pending.max_x, pending.min_x)
    };
    let x = rng.random_range(lo..=hi);
    let circle = Circle::new(
        settings.powerup_radius,
        DVec2::new(f64::from(x), settings.powerup_spawn_y),
        DVec2::new(0.0, settings.powerup_speed),
        palette::POWERUP,
    );
    let id = state.add_powerup(pending.kind.clone(), circle);
    (id, pending.kind)
}
