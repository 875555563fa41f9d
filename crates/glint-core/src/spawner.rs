#![forbid(unsafe_code)]

//! Transient sparkle and ripple effects.
//!
//! Each spawn call creates its elements, starts their animations and forgets
//! them: the completion callback handed to the surface is the only thing that
//! still refers to a node, and it removes that node when the animation ends.
//! The callback is an `FnOnce`, so a node is removed at most once by its own
//! completion; the page teardown sweep covers animations that never finish.
//!
//! Geometry is planned separately ([`plan_sparkles`], [`plan_ripple`]) so the
//! angles, distances and ripple box can be checked without a surface.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::{RippleConfig, SparkleConfig};
use crate::easing::Easing;
use crate::geometry::{Point, Rect};
use crate::surface::{Callback, EffectSurface, ElementSpec, Keyframe, KeyframeAnimation, SurfaceError};

const SPARKLE_SIZE_PX: f64 = 4.0;
const SPARKLE_BACKGROUND: &str = "linear-gradient(45deg, #fff, #ffd700)";
const RIPPLE_BACKGROUND: &str = "radial-gradient(circle, rgba(255, 255, 255, 0.3) 0%, transparent 70%)";
const RIPPLE_START_OPACITY: f64 = 0.6;
const RIPPLE_END_SCALE: f64 = 2.0;

/// Trajectory of one sparkle particle.
#[derive(Debug, Clone, PartialEq)]
pub struct SparklePlan {
    pub index: usize,
    /// Direction of travel in degrees, clockwise from +x.
    pub angle_deg: f64,
    pub distance: f64,
    pub duration: Duration,
    /// End position relative to the origin.
    pub offset: Point,
}

impl SparklePlan {
    pub fn animation(&self) -> KeyframeAnimation {
        KeyframeAnimation {
            from: Keyframe::new("translate(0, 0) scale(1)", 1.0),
            to: Keyframe::new(
                format!("translate({}px, {}px) scale(0)", self.offset.x, self.offset.y),
                0.0,
            ),
            duration: self.duration,
            easing: Easing::EASE_OUT_QUAD,
        }
    }
}

/// Evenly spaced particle directions with random distance and duration.
pub fn plan_sparkles<R: Rng>(config: &SparkleConfig, rng: &mut R) -> Vec<SparklePlan> {
    let count = config.count;
    (0..count)
        .map(|index| {
            let angle_deg = index as f64 * 360.0 / count as f64;
            let distance = rng.random_range(config.distance.min..=config.distance.max);
            let duration_ms = rng.random_range(config.duration_ms.min..=config.duration_ms.max);
            SparklePlan {
                index,
                angle_deg,
                distance,
                duration: Duration::from_secs_f64(duration_ms / 1000.0),
                offset: Point::polar(angle_deg, distance),
            }
        })
        .collect()
}

/// Placement of a ripple inside its target, in the target's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RipplePlan {
    /// Side of the square; the larger of the target's width and height.
    pub side: f64,
    pub left: f64,
    pub top: f64,
}

/// Square ripple centered on `pointer` inside `target`.
pub fn plan_ripple(target: Rect, pointer: Point) -> RipplePlan {
    let side = target.max_side();
    let local = target.to_local(pointer);
    RipplePlan {
        side,
        left: local.x - side / 2.0,
        top: local.y - side / 2.0,
    }
}

/// Counts of transient effects created and removed by their own completion.
#[derive(Debug, Clone, Default)]
pub struct EffectStats {
    spawned: Rc<Cell<u64>>,
    completed: Rc<Cell<u64>>,
}

impl EffectStats {
    pub fn spawned(&self) -> u64 {
        self.spawned.get()
    }

    pub fn completed(&self) -> u64 {
        self.completed.get()
    }

    /// Effects whose completion has not fired yet.
    pub fn in_flight(&self) -> u64 {
        self.spawned().saturating_sub(self.completed())
    }

    fn record_spawn(&self) {
        self.spawned.set(self.spawned.get() + 1);
    }

    fn record_completion(&self) {
        self.completed.set(self.completed.get() + 1);
    }
}

/// Creates sparkle bursts and ripples on a surface.
#[derive(Debug)]
pub struct EffectSpawner {
    sparkle: SparkleConfig,
    ripple: RippleConfig,
    rng: SmallRng,
    stats: EffectStats,
}

impl EffectSpawner {
    /// Spawner seeded from the OS.
    pub fn new(sparkle: SparkleConfig, ripple: RippleConfig) -> Self {
        Self::with_rng(sparkle, ripple, SmallRng::from_os_rng())
    }

    /// Spawner with a fixed seed, for reproducible bursts.
    pub fn seeded(sparkle: SparkleConfig, ripple: RippleConfig, seed: u64) -> Self {
        Self::with_rng(sparkle, ripple, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(sparkle: SparkleConfig, ripple: RippleConfig, rng: SmallRng) -> Self {
        Self {
            sparkle,
            ripple,
            rng,
            stats: EffectStats::default(),
        }
    }

    pub fn stats(&self) -> &EffectStats {
        &self.stats
    }

    /// Class carried by sparkle elements.
    pub fn sparkle_class(&self) -> &str {
        &self.sparkle.class
    }

    /// Class carried by ripple elements.
    pub fn ripple_class(&self) -> &str {
        &self.ripple.class
    }

    /// Burst of particles flying out from `origin` (viewport coordinates).
    ///
    /// Particles are appended to the document body. Returns the number
    /// created; zero when the document has no body.
    pub fn spawn_sparkles<S: EffectSurface>(
        &mut self,
        surface: &S,
        origin: Point,
    ) -> Result<usize, SurfaceError> {
        let Some(body) = surface.body() else {
            return Ok(0);
        };
        let plans = plan_sparkles(&self.sparkle, &mut self.rng);
        for plan in &plans {
            let spec = ElementSpec::new("div", self.sparkle.class.as_str())
                .style("position", "fixed")
                .style("width", format!("{SPARKLE_SIZE_PX}px"))
                .style("height", format!("{SPARKLE_SIZE_PX}px"))
                .style("background", SPARKLE_BACKGROUND)
                .style("border-radius", "50%")
                .style("pointer-events", "none")
                .style("z-index", "1000")
                .style("left", format!("{}px", origin.x))
                .style("top", format!("{}px", origin.y));
            let node = surface.append_element(&body, &spec)?;
            self.start(surface, &node, &plan.animation())?;
        }
        debug!(
            target: "glint::spawner",
            count = plans.len(),
            x = origin.x,
            y = origin.y,
            "sparkles spawned"
        );
        Ok(plans.len())
    }

    /// Ripple inside `target`, centered on `pointer` (viewport coordinates).
    ///
    /// A statically positioned target is switched to `position: relative` so
    /// the absolutely positioned ripple lays out inside it.
    pub fn spawn_ripple<S: EffectSurface>(
        &mut self,
        surface: &S,
        pointer: Point,
        target: &S::Node,
    ) -> Result<RipplePlan, SurfaceError> {
        let plan = plan_ripple(surface.bounding_rect(target), pointer);
        let spec = ElementSpec::new("span", self.ripple.class.as_str())
            .style("position", "absolute")
            .style("width", format!("{}px", plan.side))
            .style("height", format!("{}px", plan.side))
            .style("left", format!("{}px", plan.left))
            .style("top", format!("{}px", plan.top))
            .style("background", RIPPLE_BACKGROUND)
            .style("border-radius", "50%")
            .style("pointer-events", "none")
            .style("transform", "scale(0)")
            .style("z-index", "1");

        if surface.is_statically_positioned(target) {
            surface.set_style(target, "position", "relative")?;
        }
        let node = surface.append_element(target, &spec)?;
        let animation = KeyframeAnimation {
            from: Keyframe::new("scale(0)", RIPPLE_START_OPACITY),
            to: Keyframe::new(format!("scale({RIPPLE_END_SCALE})"), 0.0),
            duration: self.ripple.duration(),
            easing: Easing::EASE_OUT,
        };
        self.start(surface, &node, &animation)?;
        debug!(target: "glint::spawner", side = plan.side, "ripple spawned");
        Ok(plan)
    }

    /// Start `animation` on a freshly inserted node and arrange its removal.
    fn start<S: EffectSurface>(
        &self,
        surface: &S,
        node: &S::Node,
        animation: &KeyframeAnimation,
    ) -> Result<(), SurfaceError> {
        self.stats.record_spawn();
        let on_finish = self_removal(surface, node, &self.stats);
        if let Err(err) = surface.animate(node, animation, on_finish) {
            // Never leave a node behind that has no completion to remove it.
            surface.remove(node);
            self.stats.record_completion();
            return Err(err);
        }
        Ok(())
    }
}

fn self_removal<S: EffectSurface>(surface: &S, node: &S::Node, stats: &EffectStats) -> Callback {
    let surface = surface.clone();
    let node = node.clone();
    let stats = stats.clone();
    Box::new(move || {
        if surface.is_attached(&node) {
            surface.remove(&node);
        }
        stats.record_completion();
    })
}
