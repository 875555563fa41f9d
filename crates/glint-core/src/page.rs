#![forbid(unsafe_code)]

//! Page lifecycle controller.
//!
//! [`Page`] owns the page's state (theme, float, binder, visibility markers)
//! and is driven by the host:
//!
//! 1. [`Page::on_ready`] once the document is ready. Runs the startup steps in
//!    order (float, click effects, theme toggle, accessibility, visibility)
//!    and returns a [`ReadyPlan`] telling the host which listeners, frame loop
//!    and observers to install.
//! 2. [`Page::handle`] for every bound signal, [`Page::float_frame`] once per
//!    rendered frame, [`Page::on_visible`] for intersection reports.
//! 3. [`Page::sweep_effects`] before unload, removing leftover transient
//!    effects while the page keeps running.
//! 4. [`Page::teardown`] when the host unmounts for good.
//!
//! # Failure Modes
//!
//! - An invalid [`PageConfig`] is rejected by [`Page::new`].
//! - Missing host elements: the matching feature is skipped.
//! - A failing startup step or handler is logged and the rest keep working.
//! - Events before `on_ready` or after `teardown` are ignored.

use tracing::{debug, error, info, warn};

use crate::binder::{Binder, Binding, Dispatch, PageEvent, PageNodes};
use crate::config::{ConfigError, PageConfig};
use crate::float::FloatAnimator;
use crate::spawner::{EffectSpawner, EffectStats};
use crate::surface::{EffectSurface, ElementSpec, SurfaceError};
use crate::theme::{ThemeProfile, ThemeStore};
use crate::visibility::VisibilityTracker;

/// Root custom property shortened under reduced motion.
pub const ANIMATION_DURATION_VAR: &str = "--animation-duration";
const REDUCED_ANIMATION_DURATION: &str = "0.1s";

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed; document not ready yet.
    Created,
    /// Startup done; handling events.
    Ready,
    /// Torn down; everything is ignored.
    TornDown,
}

/// What the host installs after startup.
#[derive(Debug, Clone)]
pub struct ReadyPlan<N> {
    /// Element listeners, in registration order.
    pub bindings: Vec<Binding<N>>,
    /// Whether to attach the document-level key listener.
    pub keyboard: bool,
    /// Whether to run the per-frame float loop.
    pub float_loop: bool,
    /// Elements to watch for their first viewport entry.
    pub observe: Vec<N>,
}

impl<N> ReadyPlan<N> {
    fn empty() -> Self {
        Self {
            bindings: Vec::new(),
            keyboard: false,
            float_loop: false,
            observe: Vec::new(),
        }
    }
}

/// The page controller.
#[derive(Debug)]
pub struct Page<S: EffectSurface> {
    surface: S,
    config: PageConfig,
    phase: Phase,
    theme: ThemeStore,
    float: Option<(FloatAnimator, S::Node)>,
    binder: Option<Binder<S>>,
    visibility: VisibilityTracker<S::Node>,
    reduced_motion: bool,
    seed: Option<u64>,
}

impl<S: EffectSurface> Page<S> {
    /// Build a page over `surface`. Fails if `config` does not validate.
    pub fn new(surface: S, config: PageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let visibility = VisibilityTracker::new(config.visibility.marker_class.clone(), Vec::new());
        Ok(Self {
            surface,
            config,
            phase: Phase::Created,
            theme: ThemeStore::new(),
            float: None,
            binder: None,
            visibility,
            reduced_motion: false,
            seed: None,
        })
    }

    /// Use a fixed RNG seed for sparkle bursts.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn current_theme(&self) -> ThemeProfile {
        self.theme.current()
    }

    /// Float state, when the float loop is running.
    pub fn float(&self) -> Option<&FloatAnimator> {
        self.float.as_ref().map(|(anim, _)| anim)
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn nodes(&self) -> Option<&PageNodes<S::Node>> {
        self.binder.as_ref().map(Binder::nodes)
    }

    pub fn effect_stats(&self) -> Option<&EffectStats> {
        self.binder.as_ref().map(Binder::effect_stats)
    }

    pub fn visibility(&self) -> &VisibilityTracker<S::Node> {
        &self.visibility
    }

    /// Run startup. Calling it again after the first time does nothing and
    /// returns an empty plan.
    pub fn on_ready(&mut self) -> ReadyPlan<S::Node> {
        if self.phase != Phase::Created {
            return ReadyPlan::empty();
        }
        self.reduced_motion = self.surface.prefers_reduced_motion();
        let mut nodes = PageNodes::default();

        self.init_float(&mut nodes);
        self.init_click_effects(&mut nodes);
        log_step("theme-toggle", self.init_theme_toggle(&mut nodes));
        log_step("accessibility", self.init_accessibility(&mut nodes));
        let observe = self.surface.query_all(&self.config.selectors.observed);
        self.visibility = VisibilityTracker::new(
            self.config.visibility.marker_class.clone(),
            observe.clone(),
        );

        let spawner = match self.seed {
            Some(seed) => EffectSpawner::seeded(
                self.config.sparkle.clone(),
                self.config.ripple.clone(),
                seed,
            ),
            None => EffectSpawner::new(self.config.sparkle.clone(), self.config.ripple.clone()),
        };
        let binder = Binder::new(
            self.surface.clone(),
            nodes,
            spawner,
            self.config.toggle.press_duration(),
        );
        let plan = ReadyPlan {
            bindings: binder.bindings(),
            keyboard: true,
            float_loop: self.float.is_some(),
            observe,
        };
        self.binder = Some(binder);
        self.phase = Phase::Ready;
        info!(
            target: "glint::page",
            bindings = plan.bindings.len(),
            float = plan.float_loop,
            observed = plan.observe.len(),
            reduced_motion = self.reduced_motion,
            "page ready"
        );
        plan
    }

    fn init_float(&mut self, nodes: &mut PageNodes<S::Node>) {
        nodes.icon = self.surface.query(&self.config.selectors.icon);
        let Some(icon) = nodes.icon.clone() else {
            debug!(target: "glint::page", "no icon; float and icon effects skipped");
            return;
        };
        if self.reduced_motion {
            return;
        }
        let mut animator = FloatAnimator::new(self.config.float_motion);
        if let Err(err) = animator.frame(&self.surface, &icon) {
            warn!(target: "glint::float", error = %err, "first float frame failed");
        }
        self.float = Some((animator, icon));
    }

    fn init_click_effects(&mut self, nodes: &mut PageNodes<S::Node>) {
        // Resolved before the theme toggle exists, so the toggle gets no ripple.
        nodes.clickables = self.surface.query_all(&self.config.selectors.clickable);
    }

    fn init_theme_toggle(&mut self, nodes: &mut PageNodes<S::Node>) -> Result<(), SurfaceError> {
        nodes.container = self.surface.query(&self.config.selectors.container);
        let Some(body) = self.surface.body() else {
            return Ok(());
        };
        let toggle = &self.config.toggle;
        let spec = ElementSpec::new("button", toggle.class.as_str())
            .text(toggle.text.as_str())
            .attribute("aria-label", toggle.label.as_str())
            .style("position", "fixed")
            .style("top", "20px")
            .style("right", "20px")
            .style("width", "50px")
            .style("height", "50px")
            .style("border", "none")
            .style("border-radius", "50%")
            .style("background", "rgba(255, 255, 255, 0.2)")
            .style("backdrop-filter", "blur(10px)")
            .style("font-size", "20px")
            .style("cursor", "pointer")
            .style("z-index", "1000")
            .style("transition", "all 0.3s ease")
            .style("box-shadow", "0 4px 15px rgba(0, 0, 0, 0.1)");
        nodes.toggle = Some(self.surface.append_element(&body, &spec)?);
        Ok(())
    }

    fn init_accessibility(&mut self, nodes: &mut PageNodes<S::Node>) -> Result<(), SurfaceError> {
        nodes.focusables = self.surface.query_all(&self.config.selectors.focusable);
        if self.reduced_motion {
            self.surface
                .set_root_property(ANIMATION_DURATION_VAR, REDUCED_ANIMATION_DURATION)?;
            if let Some(icon) = &nodes.icon {
                self.surface.set_style(icon, "animation", "none")?;
            }
        }
        Ok(())
    }

    /// Deliver a host signal.
    pub fn handle(&mut self, event: PageEvent<S::Node>) -> Dispatch {
        if self.phase != Phase::Ready {
            return Dispatch::default();
        }
        match &mut self.binder {
            Some(binder) => binder.dispatch(event, &mut self.theme),
            None => Dispatch::default(),
        }
    }

    /// Advance the float one frame. Returns whether the host should request
    /// another frame.
    pub fn float_frame(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        let Some((animator, icon)) = &mut self.float else {
            return false;
        };
        if let Err(err) = animator.frame(&self.surface, icon) {
            warn!(target: "glint::float", error = %err, "float frame failed");
        }
        true
    }

    /// Report that `node` entered the viewport. Returns `true` if it was
    /// marked now and the host should stop observing it.
    pub fn on_visible(&mut self, node: &S::Node) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        match self.visibility.mark(&self.surface, node) {
            Ok(marked) => marked,
            Err(err) => {
                warn!(target: "glint::page", error = %err, "visibility marker failed");
                false
            }
        }
    }

    /// Log an uncaught host error. No recovery is attempted.
    pub fn report_uncaught(&self, message: &str) {
        error!(target: "glint::page", detail = message, "uncaught page error");
    }

    /// Remove every transient effect still in the document. The phase is
    /// unchanged, so float and handlers keep running. Returns the number of
    /// elements removed.
    pub fn sweep_effects(&mut self) -> usize {
        if self.phase == Phase::TornDown {
            return 0;
        }
        let selector = format!(
            ".{}, .{}",
            self.config.sparkle.class, self.config.ripple.class
        );
        let leftovers = self.surface.query_all(&selector);
        for node in &leftovers {
            self.surface.remove(node);
        }
        let in_flight = self
            .binder
            .as_ref()
            .map_or(0, |binder| binder.spawner().stats().in_flight());
        debug!(
            target: "glint::page",
            removed = leftovers.len(),
            in_flight,
            "transient effects swept"
        );
        leftovers.len()
    }

    /// Sweep leftover effects and stop handling events for good. Returns the
    /// number of elements removed.
    pub fn teardown(&mut self) -> usize {
        if self.phase == Phase::TornDown {
            return 0;
        }
        let removed = self.sweep_effects();
        self.phase = Phase::TornDown;
        self.float = None;
        debug!(target: "glint::page", removed, "page torn down");
        removed
    }
}

fn log_step(step: &'static str, result: Result<(), SurfaceError>) {
    if let Err(err) = result {
        warn!(target: "glint::page", step, error = %err, "startup step failed");
    }
}
