#![forbid(unsafe_code)]

//! Input and accessibility bindings.
//!
//! The binder maps host signals (pointer, click, key, focus) to effects. It
//! keeps no state of its own beyond the nodes resolved at startup: the theme
//! index lives in [`ThemeStore`], passed in by the page on each dispatch.
//!
//! Every handler returns a `Result`; [`Binder::dispatch`] runs all handlers
//! registered for a signal, logs the ones that fail and carries on, so a fault
//! in one effect never stops an unrelated one.

use std::time::Duration;

use tracing::{debug, warn};

use crate::geometry::Point;
use crate::spawner::{EffectSpawner, EffectStats};
use crate::surface::{EffectSurface, SurfaceError};
use crate::theme::{ThemeStore, apply_theme};

const ICON_HOVER_FILTER: &str = "brightness(1.2) drop-shadow(0 0 20px rgba(255, 255, 255, 0.5))";
const ICON_REST_FILTER: &str = "brightness(1) drop-shadow(0 4px 8px rgba(0, 0, 0, 0.3))";
const ICON_BOUNCE: &str = "appleBounce 0.6s ease-out";
const TOGGLE_PRESSED: &str = "scale(0.9) rotate(180deg)";
const TOGGLE_RELEASED: &str = "scale(1) rotate(0deg)";
const TOGGLE_HOVER_TRANSFORM: &str = "scale(1.1)";
const TOGGLE_HOVER_BACKGROUND: &str = "rgba(255, 255, 255, 0.3)";
const TOGGLE_REST_TRANSFORM: &str = "scale(1)";
const TOGGLE_REST_BACKGROUND: &str = "rgba(255, 255, 255, 0.2)";
const FOCUS_OUTLINE: &str = "3px solid #007AFF";
const FOCUS_OUTLINE_OFFSET: &str = "2px";

/// A host signal a node listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    PointerEnter,
    PointerLeave,
    Click,
    Focus,
    Blur,
}

impl Signal {
    /// DOM event type for this signal.
    pub const fn event_type(self) -> &'static str {
        match self {
            Signal::PointerEnter => "mouseenter",
            Signal::PointerLeave => "mouseleave",
            Signal::Click => "click",
            Signal::Focus => "focus",
            Signal::Blur => "blur",
        }
    }
}

/// A listener the host must attach: `signal` on `node`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<N> {
    pub node: N,
    pub signal: Signal,
}

/// An input event delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<N> {
    PointerEnter(N),
    PointerLeave(N),
    /// Click at viewport coordinates `point`.
    Click { target: N, point: Point },
    /// Document-level key press; `focused` is the element holding focus.
    KeyDown { key: String, focused: Option<N> },
    Focus(N),
    Blur(N),
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Enter or Space: activate the focused icon.
    Activate,
    /// `t` / `T`: cycle the theme.
    CycleTheme,
}

impl KeyCommand {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" | " " => Some(Self::Activate),
            "t" | "T" => Some(Self::CycleTheme),
            _ => None,
        }
    }
}

/// Outcome of a dispatch, for the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Handlers that ran.
    pub handled: usize,
    /// Handlers that failed (already logged).
    pub failed: usize,
    /// The host should suppress the event's default action.
    pub prevent_default: bool,
}

impl Dispatch {
    fn record(&mut self, handler: &'static str, result: Result<(), SurfaceError>) {
        self.handled += 1;
        if let Err(err) = result {
            self.failed += 1;
            warn!(target: "glint::binder", handler, error = %err, "handler failed");
        }
    }

    fn merge(&mut self, other: Dispatch) {
        self.handled += other.handled;
        self.failed += other.failed;
        self.prevent_default |= other.prevent_default;
    }
}

/// Elements resolved from the host document at startup.
#[derive(Debug, Clone)]
pub struct PageNodes<N> {
    pub icon: Option<N>,
    pub clickables: Vec<N>,
    pub container: Option<N>,
    pub toggle: Option<N>,
    pub focusables: Vec<N>,
}

impl<N> Default for PageNodes<N> {
    fn default() -> Self {
        Self {
            icon: None,
            clickables: Vec::new(),
            container: None,
            toggle: None,
            focusables: Vec::new(),
        }
    }
}

/// Routes host signals to effects.
#[derive(Debug)]
pub struct Binder<S: EffectSurface> {
    surface: S,
    nodes: PageNodes<S::Node>,
    spawner: EffectSpawner,
    press_duration: Duration,
}

impl<S: EffectSurface> Binder<S> {
    pub fn new(
        surface: S,
        nodes: PageNodes<S::Node>,
        spawner: EffectSpawner,
        press_duration: Duration,
    ) -> Self {
        Self {
            surface,
            nodes,
            spawner,
            press_duration,
        }
    }

    pub fn nodes(&self) -> &PageNodes<S::Node> {
        &self.nodes
    }

    pub fn effect_stats(&self) -> &EffectStats {
        self.spawner.stats()
    }

    pub(crate) fn spawner(&self) -> &EffectSpawner {
        &self.spawner
    }

    /// Listeners the host must attach, one per `(node, signal)` pair, in the
    /// order the handlers are registered.
    pub fn bindings(&self) -> Vec<Binding<S::Node>> {
        let mut out: Vec<Binding<S::Node>> = Vec::new();
        let mut push = |node: &S::Node, signal: Signal| {
            if !out.iter().any(|b| b.signal == signal && &b.node == node) {
                out.push(Binding {
                    node: node.clone(),
                    signal,
                });
            }
        };
        if let Some(icon) = &self.nodes.icon {
            push(icon, Signal::Click);
            push(icon, Signal::PointerEnter);
            push(icon, Signal::PointerLeave);
        }
        for node in &self.nodes.clickables {
            push(node, Signal::Click);
        }
        if let Some(toggle) = &self.nodes.toggle {
            push(toggle, Signal::Click);
            push(toggle, Signal::PointerEnter);
            push(toggle, Signal::PointerLeave);
        }
        for node in &self.nodes.focusables {
            push(node, Signal::Focus);
            push(node, Signal::Blur);
        }
        out
    }

    /// Run every handler registered for `event`.
    pub fn dispatch(&mut self, event: PageEvent<S::Node>, theme: &mut ThemeStore) -> Dispatch {
        let mut outcome = Dispatch::default();
        match event {
            PageEvent::PointerEnter(node) => {
                if self.is_icon(&node) {
                    outcome.record("icon-hover", self.icon_hover(&node, true));
                }
                if self.is_toggle(&node) {
                    outcome.record("toggle-hover", self.toggle_hover(&node, true));
                }
            }
            PageEvent::PointerLeave(node) => {
                if self.is_icon(&node) {
                    outcome.record("icon-hover", self.icon_hover(&node, false));
                }
                if self.is_toggle(&node) {
                    outcome.record("toggle-hover", self.toggle_hover(&node, false));
                }
            }
            PageEvent::Click { target, point } => {
                outcome = self.click(&target, point, theme);
            }
            PageEvent::KeyDown { key, focused } => {
                outcome = self.key_down(&key, focused.as_ref(), theme);
            }
            PageEvent::Focus(node) => {
                if self.nodes.focusables.contains(&node) {
                    outcome.record("focus-outline", self.focus_outline(&node, true));
                }
            }
            PageEvent::Blur(node) => {
                if self.nodes.focusables.contains(&node) {
                    outcome.record("focus-outline", self.focus_outline(&node, false));
                }
            }
        }
        outcome
    }

    fn is_icon(&self, node: &S::Node) -> bool {
        self.nodes.icon.as_ref() == Some(node)
    }

    fn is_toggle(&self, node: &S::Node) -> bool {
        self.nodes.toggle.as_ref() == Some(node)
    }

    fn click(&mut self, target: &S::Node, point: Point, theme: &mut ThemeStore) -> Dispatch {
        let mut outcome = Dispatch::default();
        if self.is_icon(target) {
            outcome.record("icon-click", self.icon_click(target));
        }
        if self.nodes.clickables.contains(target) {
            let result = self.spawner.spawn_ripple(&self.surface, point, target).map(|_| ());
            outcome.record("ripple", result);
        }
        if self.is_toggle(target) {
            outcome.record("theme-toggle", self.toggle_click(target, theme));
        }
        outcome
    }

    /// Keyboard activation goes through the same click handlers, with the
    /// click placed at the center of the target.
    fn key_down(&mut self, key: &str, focused: Option<&S::Node>, theme: &mut ThemeStore) -> Dispatch {
        let mut outcome = Dispatch::default();
        match KeyCommand::from_key(key) {
            Some(KeyCommand::Activate) => {
                let Some(icon) = focused.filter(|node| self.is_icon(node)).cloned() else {
                    return outcome;
                };
                outcome.prevent_default = true;
                let point = self.surface.bounding_rect(&icon).center();
                outcome.merge(self.click(&icon, point, theme));
            }
            Some(KeyCommand::CycleTheme) => {
                if let Some(toggle) = self.nodes.toggle.clone() {
                    let point = self.surface.bounding_rect(&toggle).center();
                    outcome.merge(self.click(&toggle, point, theme));
                }
            }
            None => {}
        }
        outcome
    }

    fn icon_hover(&self, icon: &S::Node, entered: bool) -> Result<(), SurfaceError> {
        let filter = if entered {
            ICON_HOVER_FILTER
        } else {
            ICON_REST_FILTER
        };
        self.surface.set_style(icon, "filter", filter)
    }

    /// Restart the bounce animation and burst sparkles from the icon center.
    fn icon_click(&mut self, icon: &S::Node) -> Result<(), SurfaceError> {
        self.surface.set_style(icon, "animation", "none")?;
        self.surface.force_layout(icon);
        self.surface.set_style(icon, "animation", ICON_BOUNCE)?;
        let origin = self.surface.bounding_rect(icon).center();
        self.spawner.spawn_sparkles(&self.surface, origin)?;
        Ok(())
    }

    fn toggle_click(&self, toggle: &S::Node, theme: &mut ThemeStore) -> Result<(), SurfaceError> {
        let profile = theme.advance();
        apply_theme(&self.surface, &profile, self.nodes.container.as_ref())?;
        self.surface.set_style(toggle, "transform", TOGGLE_PRESSED)?;

        let surface = self.surface.clone();
        let toggle = toggle.clone();
        self.surface.schedule(
            self.press_duration,
            Box::new(move || {
                if let Err(err) = surface.set_style(&toggle, "transform", TOGGLE_RELEASED) {
                    warn!(target: "glint::binder", handler = "theme-toggle", error = %err, "press revert failed");
                }
            }),
        )?;
        debug!(target: "glint::binder", index = theme.index(), "theme toggled");
        Ok(())
    }

    fn toggle_hover(&self, toggle: &S::Node, entered: bool) -> Result<(), SurfaceError> {
        let (transform, background) = if entered {
            (TOGGLE_HOVER_TRANSFORM, TOGGLE_HOVER_BACKGROUND)
        } else {
            (TOGGLE_REST_TRANSFORM, TOGGLE_REST_BACKGROUND)
        };
        self.surface.set_style(toggle, "transform", transform)?;
        self.surface.set_style(toggle, "background", background)
    }

    fn focus_outline(&self, node: &S::Node, focused: bool) -> Result<(), SurfaceError> {
        if focused {
            self.surface.set_style(node, "outline", FOCUS_OUTLINE)?;
            self.surface.set_style(node, "outline-offset", FOCUS_OUTLINE_OFFSET)
        } else {
            self.surface.set_style(node, "outline", "none")
        }
    }
}
