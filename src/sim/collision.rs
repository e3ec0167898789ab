//! Collision detection and response for axis-aligned rectangles
//!
//! Detection classifies which side of a rectangle a circular mover struck;
//! response is dispatched on the rectangle's kind (brick/wall reflect, paddle
//! aims, death-line reports a lost life).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entity::{Circle, Rect};
use super::state::{MoverKind, RectKind};

/// Side of a rectangle struck by a mover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    None,
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn is_hit(self) -> bool {
        self != Side::None
    }
}

/// How deep the mover's bounding box reaches past each side of the rectangle
///
/// All four are positive exactly when the two boxes overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Penetration {
    pub fn between(rect: &Rect, mover: &Circle) -> Self {
        Self {
            top: mover.bottom() - rect.top(),
            right: rect.right() - mover.left(),
            bottom: rect.bottom() - mover.top(),
            left: mover.right() - rect.left(),
        }
    }

    pub fn overlaps(&self) -> bool {
        self.top > 0.0 && self.right > 0.0 && self.bottom > 0.0 && self.left > 0.0
    }

    /// Shallowest side; ties resolve Top, Right, Bottom, Left
    pub fn shallowest(&self) -> Side {
        let candidates = [
            (Side::Top, self.top),
            (Side::Right, self.right),
            (Side::Bottom, self.bottom),
            (Side::Left, self.left),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 < best.1 {
                best = *candidate;
            }
        }
        best.0
    }
}

/// Classify contact between a rectangle and a circular mover
///
/// Uses the mover's bounding box. Touching edges are not a hit.
pub fn detect(rect: &Rect, mover: &Circle) -> Side {
    let pen = Penetration::between(rect, mover);
    if pen.overlaps() {
        pen.shallowest()
    } else {
        Side::None
    }
}

/// Outcome of a collision response, reported back to the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Mover velocity was changed
    Reflected,
    /// A power-up touched the paddle
    PickedUp,
    /// A ball reached the bottom boundary
    LifeLost,
    /// A power-up reached the bottom boundary
    Missed,
}

/// Respond to a detected hit, dispatched on the rectangle's kind
pub fn collide(
    kind: RectKind,
    rect: &Rect,
    mover_kind: &MoverKind,
    mover: &mut Circle,
    side: Side,
) -> Response {
    let is_ball = matches!(mover_kind, MoverKind::Ball { .. });
    match kind {
        RectKind::Brick | RectKind::Wall => {
            mover.body.vel = reflect_off_side(mover.body.vel, side);
            Response::Reflected
        }
        RectKind::Paddle { .. } if is_ball => {
            mover.body.vel = paddle_bounce(rect.body.pos, mover.body.pos, mover.body.vel);
            Response::Reflected
        }
        RectKind::Paddle { .. } => Response::PickedUp,
        RectKind::DeathLine if is_ball => Response::LifeLost,
        RectKind::DeathLine => Response::Missed,
    }
}

/// Negate the velocity component perpendicular to the struck side
#[inline]
pub fn reflect_off_side(vel: DVec2, side: Side) -> DVec2 {
    match side {
        Side::Top | Side::Bottom => DVec2::new(vel.x, -vel.y),
        Side::Left | Side::Right => DVec2::new(-vel.x, vel.y),
        Side::None => vel,
    }
}

/// Aim the ball off the paddle by where it hit
///
/// The angle comes from the vector between paddle center and ball center;
/// speed is preserved and the ball always leaves upward, steeper toward the
/// middle and flatter toward the edges. A hit exactly over the center goes
/// straight up.
pub fn paddle_bounce(paddle_center: DVec2, ball_center: DVec2, vel: DVec2) -> DVec2 {
    let speed = vel.length();
    let delta = ball_center - paddle_center;
    if delta.x == 0.0 {
        return DVec2::new(0.0, -speed);
    }

    let angle = (delta.y / delta.x).atan();
    let vy = -(speed * angle.sin()).abs();
    let vx = (speed * angle.cos()).abs();
    let vx = if ball_center.x < paddle_center.x { -vx } else { vx };
    DVec2::new(vx, vy)
}
