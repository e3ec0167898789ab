//! Game state and core simulation types
//!
//! The world is one `GameState` per session: every rectangle keyed by a
//! stable id, a durability map for the destructible bricks, the live movers,
//! the pending power-up queue, and the life counter.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::entity::{Body, Circle, EntityId, Rect};
use super::powerup::{PendingPowerUp, PowerUpKind};
use crate::consts::INITIAL_LIVES;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay (ticks run unless paused)
    Playing,
    /// Every destructible brick is gone with lives remaining
    Won,
    /// Lives ran out
    Lost,
}

/// What a rectangle does when a mover hits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RectKind {
    /// Destructible, durability tracked in `GameState::durability`
    Brick,
    /// Indestructible reflector
    Wall,
    /// Bottom boundary; costs a life instead of reflecting
    DeathLine,
    /// Player paddle, confined horizontally to `[left_bound, right_bound]`
    Paddle { left_bound: i32, right_bound: i32 },
}

/// A rectangle in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectEntity {
    pub id: EntityId,
    pub kind: RectKind,
    pub rect: Rect,
}

impl RectEntity {
    /// Apply one tick of movement
    pub fn step(&mut self) {
        match self.kind {
            RectKind::Paddle {
                left_bound,
                right_bound,
            } => {
                let body = &mut self.rect.body;
                body.vel.y = 0.0;
                let x = body.pos.x + body.vel.x;
                body.pos.x = clamp_paddle_x(x, self.rect.width, left_bound, right_bound);
            }
            _ => self.rect.body.step(),
        }
    }
}

/// Keep the paddle's center inside its travel bounds (half-width uses integer division)
pub fn clamp_paddle_x(x: f64, width: i32, left_bound: i32, right_bound: i32) -> f64 {
    let half = f64::from(width / 2);
    let min_x = f64::from(left_bound) + half;
    let max_x = f64::from(right_bound) - half;
    if x < min_x {
        min_x
    } else if x > max_x {
        max_x
    } else {
        x
    }
}

/// Circular mover variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoverKind {
    /// The ball, remembering where it was served from
    Ball { spawn: Body },
    /// A released power-up falling toward the paddle
    PowerUp(PowerUpKind),
}

/// A live circular mover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoverEntity {
    pub id: EntityId,
    pub kind: MoverKind,
    pub circle: Circle,
}

impl MoverEntity {
    pub fn is_ball(&self) -> bool {
        matches!(self.kind, MoverKind::Ball { .. })
    }

    /// Put a ball back at its serve position and velocity
    pub fn respawn(&mut self) {
        if let MoverKind::Ball { spawn } = &self.kind {
            self.circle.body.pos = spawn.pos;
            self.circle.body.vel = spawn.vel;
        }
    }
}

/// Things that happened during a tick (for logging and front ends)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickHit { id: EntityId, remaining: i32 },
    BrickDestroyed { id: EntityId },
    LifeLost { ball: EntityId, lives: i32 },
    PowerUpReleased { id: EntityId, kind: PowerUpKind },
    PowerUpCollected { id: EntityId, kind: PowerUpKind },
    PowerUpMissed { id: EntityId },
    Won,
    Lost,
}

/// Complete world state for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Remaining lives
    pub lives: i32,
    /// Speed applied to the paddle by move commands
    pub paddle_speed: f64,
    /// Paused sessions still render but never tick
    pub paused: bool,
    /// Current phase
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Every rectangle (bricks, walls, paddle, death-line), ordered by id
    pub rects: BTreeMap<EntityId, RectEntity>,
    /// Durability of destructible bricks only; an id missing here is indestructible
    pub durability: BTreeMap<EntityId, i32>,
    /// Live movers (sorted by id)
    pub movers: Vec<MoverEntity>,
    /// Power-ups not yet released, in declaration order
    pub pending: VecDeque<PendingPowerUp>,
    /// The paddle receiving input commands
    pub paddle_id: Option<EntityId>,
    /// Next entity ID
    next_id: EntityId,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(INITIAL_LIVES)
    }
}

impl GameState {
    /// Create an empty, paused world
    pub fn new(lives: i32) -> Self {
        Self {
            lives,
            paddle_speed: 0.0,
            paused: true,
            phase: GamePhase::Playing,
            time_ticks: 0,
            rects: BTreeMap::new(),
            durability: BTreeMap::new(),
            movers: Vec::new(),
            pending: VecDeque::new(),
            paddle_id: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert an indestructible rectangle (wall, death-line or paddle)
    pub fn add_rect(&mut self, kind: RectKind, rect: Rect) -> EntityId {
        let id = self.next_entity_id();
        if matches!(kind, RectKind::Paddle { .. }) && self.paddle_id.is_none() {
            self.paddle_id = Some(id);
        }
        self.rects.insert(id, RectEntity { id, kind, rect });
        id
    }

    /// Insert a destructible brick with its starting durability
    pub fn add_brick(&mut self, rect: Rect, durability: i32) -> EntityId {
        let id = self.add_rect(RectKind::Brick, rect);
        self.durability.insert(id, durability);
        id
    }

    /// Insert a ball that respawns where it starts
    pub fn add_ball(&mut self, circle: Circle) -> EntityId {
        let id = self.next_entity_id();
        self.movers.push(MoverEntity {
            id,
            kind: MoverKind::Ball { spawn: circle.body },
            circle,
        });
        id
    }

    /// Put a released power-up into the live world
    pub fn add_powerup(&mut self, kind: PowerUpKind, circle: Circle) -> EntityId {
        let id = self.next_entity_id();
        self.movers.push(MoverEntity {
            id,
            kind: MoverKind::PowerUp(kind),
            circle,
        });
        id
    }

    pub fn paddle(&self) -> Option<&RectEntity> {
        self.paddle_id.and_then(|id| self.rects.get(&id))
    }

    pub fn paddle_mut(&mut self) -> Option<&mut RectEntity> {
        self.paddle_id.and_then(|id| self.rects.get_mut(&id))
    }

    /// Ball count currently in play
    pub fn ball_count(&self) -> usize {
        self.movers.iter().filter(|m| m.is_ball()).count()
    }

    /// Lowest bottom edge of any rectangle; nothing below it can be hit
    pub fn floor(&self) -> Option<f64> {
        self.rects
            .values()
            .map(|entity| entity.rect.bottom())
            .reduce(f64::max)
    }

    pub fn is_over(&self) -> bool {
        self.phase != GamePhase::Playing
    }

    /// Resolve the phase from lives and remaining bricks; a loss outranks a clear
    pub fn update_phase(&mut self) -> Option<GameEvent> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        if self.lives <= 0 {
            self.phase = GamePhase::Lost;
            Some(GameEvent::Lost)
        } else if self.durability.is_empty() {
            self.phase = GamePhase::Won;
            Some(GameEvent::Won)
        } else {
            None
        }
    }
}
