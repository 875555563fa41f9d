#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every selector, class hook, count and timing constant used by the page is
//! collected in [`PageConfig`]. `Default` reproduces the stock page; a host
//! may override individual fields (with the `serde` feature, from a partial
//! JSON object via [`PageConfig::from_json`]).

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A field has a value the page cannot work with.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    /// The JSON document could not be parsed.
    #[error("malformed config: {0}")]
    Parse(String),
}

impl ConfigError {
    const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::Invalid { field, reason }
    }
}

/// Inclusive range of floating-point values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the span (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

/// Host document hooks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Selectors {
    /// The floating icon.
    pub icon: String,
    /// Elements that get a ripple on click.
    pub clickable: String,
    /// Container whose background follows the theme.
    pub container: String,
    /// Elements that get a focus outline.
    pub focusable: String,
    /// Elements marked once when they scroll into view.
    pub observed: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            icon: ".apple-icon".into(),
            clickable: "button, .clickable, .apple-icon".into(),
            container: ".container".into(),
            focusable: "button, .apple-icon, .theme-toggle".into(),
            observed: ".container, .apple-icon, h1".into(),
        }
    }
}

/// Sparkle burst parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SparkleConfig {
    pub count: usize,
    /// Travel distance in px.
    pub distance: Span,
    /// Animation duration in ms.
    pub duration_ms: Span,
    pub class: String,
}

impl Default for SparkleConfig {
    fn default() -> Self {
        Self {
            count: 8,
            distance: Span::new(50.0, 80.0),
            duration_ms: Span::new(800.0, 1200.0),
            class: "sparkle".into(),
        }
    }
}

/// Ripple parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RippleConfig {
    pub duration_ms: u64,
    pub class: String,
}

impl RippleConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            duration_ms: 600,
            class: "ripple".into(),
        }
    }
}

/// Float oscillation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FloatConfig {
    /// Offset change per frame, in px.
    pub step: f64,
    /// Offset bound; the offset stays within `[-bound, bound]`.
    pub bound: f64,
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            step: 0.5,
            bound: 10.0,
        }
    }
}

/// Theme toggle parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToggleConfig {
    pub class: String,
    pub label: String,
    pub text: String,
    /// How long the press transform is held before reverting.
    pub press_ms: u64,
}

impl ToggleConfig {
    pub fn press_duration(&self) -> Duration {
        Duration::from_millis(self.press_ms)
    }
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            class: "theme-toggle".into(),
            label: "Change color theme".into(),
            text: "\u{1F3A8}".into(),
            press_ms: 150,
        }
    }
}

/// Viewport-entry marker parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VisibilityConfig {
    /// Fraction of the element that must be visible.
    pub threshold: f64,
    pub root_margin: String,
    /// Class added on first entry.
    pub marker_class: String,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".into(),
            marker_class: "animate-in".into(),
        }
    }
}

/// Complete page configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageConfig {
    pub selectors: Selectors,
    pub sparkle: SparkleConfig,
    pub ripple: RippleConfig,
    #[cfg_attr(feature = "serde", serde(rename = "float"))]
    pub float_motion: FloatConfig,
    pub toggle: ToggleConfig,
    pub visibility: VisibilityConfig,
}

impl PageConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let selectors = [
            ("selectors.icon", &self.selectors.icon),
            ("selectors.clickable", &self.selectors.clickable),
            ("selectors.container", &self.selectors.container),
            ("selectors.focusable", &self.selectors.focusable),
            ("selectors.observed", &self.selectors.observed),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid(field, "must not be empty"));
            }
        }

        if self.sparkle.count == 0 {
            return Err(ConfigError::invalid("sparkle.count", "must be at least 1"));
        }
        if !self.sparkle.distance.is_valid() {
            return Err(ConfigError::invalid(
                "sparkle.distance",
                "must be a finite, non-negative, ordered range",
            ));
        }
        if !self.sparkle.duration_ms.is_valid() || self.sparkle.duration_ms.min <= 0.0 {
            return Err(ConfigError::invalid(
                "sparkle.duration_ms",
                "must be a positive, ordered range",
            ));
        }
        if self.ripple.duration_ms == 0 {
            return Err(ConfigError::invalid("ripple.duration_ms", "must be positive"));
        }

        let motion = self.float_motion;
        if !(motion.step.is_finite() && motion.step > 0.0) {
            return Err(ConfigError::invalid("float.step", "must be positive"));
        }
        if !(motion.bound.is_finite() && motion.bound > 0.0) {
            return Err(ConfigError::invalid("float.bound", "must be positive"));
        }
        if motion.step > motion.bound {
            return Err(ConfigError::invalid("float.step", "must not exceed float.bound"));
        }

        let threshold = self.visibility.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::invalid(
                "visibility.threshold",
                "must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON object and validate it.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
