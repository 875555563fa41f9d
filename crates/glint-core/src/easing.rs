#![forbid(unsafe_code)]

//! Cubic-bezier timing functions.
//!
//! An [`Easing`] renders to the CSS `<easing-function>` handed to the host's
//! animation engine and can also be sampled here, which keeps the curves the
//! page uses checkable without a browser.

use std::fmt;

/// A CSS `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    /// Keyword form, when the curve has one (`ease-out`).
    keyword: Option<&'static str>,
}

impl Easing {
    /// The CSS `ease-out` keyword.
    pub const EASE_OUT: Self = Self {
        x1: 0.0,
        y1: 0.0,
        x2: 0.58,
        y2: 1.0,
        keyword: Some("ease-out"),
    };

    /// Ease-out-quad; fast start with a long settle. Used by sparkles.
    pub const EASE_OUT_QUAD: Self = Self::cubic_bezier(0.25, 0.46, 0.45, 0.94);

    /// Construct an arbitrary curve. `x1`/`x2` must lie in [0, 1] for the
    /// curve to be a function of time; values outside are clamped on sample.
    #[must_use]
    pub const fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            keyword: None,
        }
    }

    /// Control points as `(x1, y1, x2, y2)`.
    pub const fn control_points(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Eased progress for linear progress `t` in [0, 1].
    pub fn sample(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let x1 = self.x1.clamp(0.0, 1.0);
        let x2 = self.x2.clamp(0.0, 1.0);
        let s = solve_param(x1, x2, t);
        bezier(self.y1, self.y2, s)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword {
            Some(keyword) => f.write_str(keyword),
            None => write!(
                f,
                "cubic-bezier({}, {}, {}, {})",
                self.x1, self.y1, self.x2, self.y2
            ),
        }
    }
}

/// One axis of a cubic bezier anchored at 0 and 1.
#[inline]
fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

#[inline]
fn bezier_slope(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`.
///
/// Newton iterations first, bisection if the slope flattens out.
fn solve_param(x1: f64, x2: f64, x: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let mut s = x;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - x;
        if err.abs() < EPSILON {
            return s;
        }
        let slope = bezier_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..64 {
        let value = bezier(x1, x2, s);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}
