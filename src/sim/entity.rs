//! Entity geometry: movable bodies, rectangles and circular movers
//!
//! Coordinates are level units with y growing downward. A rectangle's
//! position is its center.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stable entity identifier (allocated by `GameState`)
pub type EntityId = u32;

/// Display color (RGBA). Not read by the collision code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Brick color for the given remaining durability (darker = weaker)
    pub fn for_durability(durability: i32) -> Self {
        let channel = |scale: i32| (scale * durability).clamp(0, 255) as u8;
        Self::rgb(channel(20), channel(60), 0)
    }
}

/// Anything with a position, a velocity and a color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: DVec2,
    pub vel: DVec2,
    pub color: Color,
}

impl Body {
    pub fn new(pos: DVec2, vel: DVec2, color: Color) -> Self {
        Self { pos, vel, color }
    }

    /// Advance one tick (no substeps)
    #[inline]
    pub fn step(&mut self) {
        self.pos += self.vel;
    }

    /// Magnitude of the velocity
    #[inline]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}

/// Axis-aligned rectangle centered on its body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub body: Body,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(width: i32, height: i32, pos: DVec2, color: Color) -> Self {
        Self {
            body: Body::new(pos, DVec2::ZERO, color),
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.body.pos.x - f64::from(self.width) / 2.0
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.body.pos.x + f64::from(self.width) / 2.0
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.body.pos.y - f64::from(self.height) / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.body.pos.y + f64::from(self.height) / 2.0
    }
}

/// A circular mover (ball or released power-up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub body: Body,
    pub radius: i32,
}

impl Circle {
    pub fn new(radius: i32, pos: DVec2, vel: DVec2, color: Color) -> Self {
        Self {
            body: Body::new(pos, vel, color),
            radius,
        }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.body.pos.x - f64::from(self.radius)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.body.pos.x + f64::from(self.radius)
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.body.pos.y - f64::from(self.radius)
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.body.pos.y + f64::from(self.radius)
    }
}
