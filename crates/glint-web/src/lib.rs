#![forbid(unsafe_code)]

//! Browser binding for the Glint page effects.
//!
//! `glint-core` owns the page logic; this crate gives it a document to work
//! on and wires browser signals into it:
//!
//! - `dom::DomSurface` implements [`glint_core::EffectSurface`] over `web-sys`.
//! - `wasm` exports `mount()` / `mountWithConfig(json)` / `unmount()` and
//!   attaches the listeners, frame loop and intersection observer that
//!   [`glint_core::Page::on_ready`] asks for.
//! - [`console`] forwards `tracing` events to the browser console.
//!
//! The browser modules only build on `wasm32`; configuration loading and
//! log formatting are plain Rust and tested natively.

pub mod console;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

use glint_core::{ConfigError, PageConfig};

/// Parse and validate a host-supplied configuration.
///
/// Blank input means "use the defaults".
pub fn load_config(json: &str) -> Result<PageConfig, ConfigError> {
    if json.trim().is_empty() {
        return Ok(PageConfig::default());
    }
    PageConfig::from_json(json)
}
