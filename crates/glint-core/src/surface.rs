#![forbid(unsafe_code)]

//! The capability interface between Glint's logic and a rendering surface.
//!
//! [`EffectSurface`] is the only way the core touches the document: style
//! writes, element creation and removal, keyframe animation with a completion
//! callback, delayed tasks and one preference query. The browser binding lives
//! in `glint-web`; tests use `testing::FakeSurface`.
//!
//! # Ownership
//!
//! Surfaces are cheap handles (`Clone`) over a shared document. Completion
//! callbacks and scheduled tasks are `'static` and capture their own clone of
//! the surface and of the node they act on; nothing else keeps a reference to
//! a transient node once it has been handed to [`EffectSurface::animate`].

use std::fmt;
use std::time::Duration;

use crate::easing::Easing;
use crate::geometry::Rect;

/// Errors reported by a surface implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The host rejected an operation (message from the host error value).
    #[error("host error: {0}")]
    Js(String),
    /// The node is no longer attached to the document.
    #[error("node is detached from the document")]
    Detached,
    /// The surface cannot perform the operation at all.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

/// Completion callback for an animation or a delayed task.
pub type Callback = Box<dyn FnOnce()>;

/// Description of an element to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSpec {
    pub tag: &'static str,
    pub class: String,
    pub text: Option<String>,
    pub attributes: Vec<(&'static str, String)>,
    /// Inline style declarations, applied in order.
    pub styles: Vec<(&'static str, String)>,
}

impl ElementSpec {
    /// Start a spec for `<tag class="...">`.
    pub fn new(tag: &'static str, class: impl Into<String>) -> Self {
        Self {
            tag,
            class: class.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn style(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.styles.push((property, value.into()));
        self
    }

    /// Value of an inline style property, if set.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .rev()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.as_str())
    }
}

/// One keyframe of a transform/opacity animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub transform: String,
    pub opacity: f64,
}

impl Keyframe {
    pub fn new(transform: impl Into<String>, opacity: f64) -> Self {
        Self {
            transform: transform.into(),
            opacity,
        }
    }
}

/// A two-keyframe animation handed to the host animation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeAnimation {
    pub from: Keyframe,
    pub to: Keyframe,
    pub duration: Duration,
    pub easing: Easing,
}

/// A value in an animation timing dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum TimingValue {
    Number(f64),
    Text(String),
}

impl KeyframeAnimation {
    /// Timing options for the host animation engine, keyed as the engine
    /// expects. No fill mode: effect nodes remove themselves on finish.
    pub fn timing_options(&self) -> Vec<(&'static str, TimingValue)> {
        vec![
            (
                "duration",
                TimingValue::Number(self.duration.as_secs_f64() * 1000.0),
            ),
            ("easing", TimingValue::Text(self.easing.to_string())),
        ]
    }
}

/// Rendering surface capabilities used by Glint.
///
/// Query methods never fail: an absent element is `None`/empty, which callers
/// treat as "feature not present". Mutations return [`SurfaceError`] so the
/// page can log a failing handler and carry on.
pub trait EffectSurface: Clone + 'static {
    /// Handle to a document element. Equality is element identity.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// First element matching a CSS selector.
    fn query(&self, selector: &str) -> Option<Self::Node>;

    /// All elements matching a CSS selector, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// The document body.
    fn body(&self) -> Option<Self::Node>;

    /// Create an element from `spec` and append it to `parent`.
    fn append_element(
        &self,
        parent: &Self::Node,
        spec: &ElementSpec,
    ) -> Result<Self::Node, SurfaceError>;

    /// Remove `node` from the document. Removing a detached node is a no-op.
    fn remove(&self, node: &Self::Node);

    /// Whether `node` is still attached to the document.
    fn is_attached(&self, node: &Self::Node) -> bool;

    /// Set an inline style property on `node`.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str)
    -> Result<(), SurfaceError>;

    /// Set a custom property (or any style property) on the document root.
    fn set_root_property(&self, name: &str, value: &str) -> Result<(), SurfaceError>;

    /// Add a class to `node`.
    fn add_class(&self, node: &Self::Node, class: &str) -> Result<(), SurfaceError>;

    /// Viewport-relative bounding box of `node`.
    fn bounding_rect(&self, node: &Self::Node) -> Rect;

    /// Whether the computed `position` of `node` is `static`.
    fn is_statically_positioned(&self, node: &Self::Node) -> bool;

    /// Force a synchronous layout of `node` so a style reset takes effect.
    fn force_layout(&self, node: &Self::Node);

    /// Run `animation` on `node`; `on_finish` runs once when it completes.
    fn animate(
        &self,
        node: &Self::Node,
        animation: &KeyframeAnimation,
        on_finish: Callback,
    ) -> Result<(), SurfaceError>;

    /// Run `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: Callback) -> Result<(), SurfaceError>;

    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool;
}
