#![forbid(unsafe_code)]

//! Continuous float animation for the icon.
//!
//! A bounded oscillation advanced once per rendered frame. The host drives it
//! (via `requestAnimationFrame` in the browser); this type only holds the
//! state and the transition.
//!
//! # Invariants
//!
//! 1. `offset` stays within `[-bound, bound]`.
//! 2. The direction flips exactly on the frame where the offset reaches or
//!    passes a bound.
//! 3. There is no pause state: a running animator steps every frame.

use tracing::trace;

use crate::config::FloatConfig;
use crate::surface::{EffectSurface, SurfaceError};

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Offset increasing (moving down on screen).
    Forward,
    /// Offset decreasing.
    Backward,
}

impl Direction {
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Offset/direction state of the float oscillation.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatAnimator {
    offset: f64,
    direction: Direction,
    step: f64,
    bound: f64,
    frames: u64,
}

impl Default for FloatAnimator {
    fn default() -> Self {
        Self::new(FloatConfig::default())
    }
}

impl FloatAnimator {
    /// Start at offset 0 moving forward.
    pub fn new(config: FloatConfig) -> Self {
        Self {
            offset: 0.0,
            direction: Direction::Forward,
            step: config.step,
            bound: config.bound,
            frames: 0,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    /// Frames stepped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one frame and return the new offset.
    pub fn step(&mut self) -> f64 {
        self.offset = (self.offset + self.direction.sign() * self.step).clamp(-self.bound, self.bound);
        if self.offset >= self.bound || self.offset <= -self.bound {
            self.direction = self.direction.flipped();
        }
        self.frames += 1;
        trace!(
            target: "glint::float",
            offset = self.offset,
            frame = self.frames,
            "float step"
        );
        self.offset
    }

    /// CSS transform for the current offset.
    pub fn transform(&self) -> String {
        format!("translateY({}px)", self.offset)
    }

    /// Advance one frame and write the transform to `node`.
    pub fn frame<S: EffectSurface>(
        &mut self,
        surface: &S,
        node: &S::Node,
    ) -> Result<(), SurfaceError> {
        self.step();
        surface.set_style(node, "transform", &self.transform())
    }
}
