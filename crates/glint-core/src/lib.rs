#![forbid(unsafe_code)]

//! Core logic for the Glint page effects.
//!
//! # Role in Glint
//! `glint-core` holds every piece of page behavior that does not need a
//! browser: the theme rotation, the float oscillation, sparkle/ripple
//! planning and lifecycle, input-to-effect routing, and startup/teardown
//! ordering. It reaches the document only through [`surface::EffectSurface`].
//!
//! # How it fits in the system
//! `glint-web` implements `EffectSurface` over the DOM, attaches the
//! listeners a [`page::ReadyPlan`] asks for, drives [`page::Page::float_frame`]
//! from `requestAnimationFrame`, and forwards every signal to
//! [`page::Page::handle`]. Tests drive the same `Page` through
//! `testing::FakeSurface`.

pub mod binder;
pub mod config;
pub mod easing;
pub mod float;
pub mod geometry;
pub mod page;
pub mod spawner;
pub mod surface;
pub mod theme;
pub mod visibility;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use binder::{Binding, Dispatch, PageEvent, Signal};
pub use config::{ConfigError, PageConfig};
pub use geometry::{Point, Rect};
pub use page::{Page, Phase, ReadyPlan};
pub use surface::{EffectSurface, SurfaceError};
pub use theme::{ThemeId, ThemeProfile, ThemeStore};
