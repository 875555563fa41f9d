#![forbid(unsafe_code)]

//! Theme store with the page's built-in palettes.
//!
//! The palette list is fixed at compile time. [`ThemeStore`] owns the only
//! mutable piece, the index of the active theme, and moves it forward one
//! step per user request. Writing a palette into the document is a separate
//! effect, [`apply_theme`].

use std::fmt;

use tracing::debug;

use crate::surface::{EffectSurface, SurfaceError};

/// Root custom property holding the primary color.
pub const PRIMARY_VAR: &str = "--primary-color";
/// Root custom property holding the secondary color.
pub const SECONDARY_VAR: &str = "--secondary-color";
/// Root custom property holding the accent color.
pub const ACCENT_VAR: &str = "--accent-color";

/// An opaque sRGB color, rendered as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// `#RRGGBBAA` with the given alpha byte.
    pub fn with_alpha(self, alpha: u8) -> String {
        format!("{self}{alpha:02X}")
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Built-in theme identifiers, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeId {
    /// Classic blue (default).
    #[default]
    ClassicBlue,
    Warm,
    FreshGreen,
    PurplePink,
}

impl ThemeId {
    pub const ALL: [ThemeId; 4] = [
        ThemeId::ClassicBlue,
        ThemeId::Warm,
        ThemeId::FreshGreen,
        ThemeId::PurplePink,
    ];

    pub const fn index(self) -> usize {
        match self {
            ThemeId::ClassicBlue => 0,
            ThemeId::Warm => 1,
            ThemeId::FreshGreen => 2,
            ThemeId::PurplePink => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ThemeId::ClassicBlue => "Classic Blue",
            ThemeId::Warm => "Warm",
            ThemeId::FreshGreen => "Fresh Green",
            ThemeId::PurplePink => "Purple Pink",
        }
    }

    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub const fn from_index(idx: usize) -> Self {
        Self::ALL[idx % Self::ALL.len()]
    }

    /// Palette for this theme.
    pub const fn profile(self) -> ThemeProfile {
        PROFILES[self.index()]
    }
}

/// The three colors applied together when a theme is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeProfile {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
}

impl ThemeProfile {
    /// Background for the page container: a faint diagonal blend of the
    /// primary and secondary colors.
    pub fn container_background(&self) -> String {
        format!(
            "linear-gradient(135deg, {}, {})",
            self.primary.with_alpha(0x20),
            self.secondary.with_alpha(0x20)
        )
    }

    /// `(property, value)` pairs written to the document root.
    pub fn root_properties(&self) -> [(&'static str, String); 3] {
        [
            (PRIMARY_VAR, self.primary.to_string()),
            (SECONDARY_VAR, self.secondary.to_string()),
            (ACCENT_VAR, self.accent.to_string()),
        ]
    }
}

const PROFILES: [ThemeProfile; 4] = [
    ThemeProfile {
        primary: Rgb::hex(0x007AFF),
        secondary: Rgb::hex(0x5AC8FA),
        accent: Rgb::hex(0xFF9500),
    },
    ThemeProfile {
        primary: Rgb::hex(0xFF3B30),
        secondary: Rgb::hex(0xFF9500),
        accent: Rgb::hex(0xFFCC02),
    },
    ThemeProfile {
        primary: Rgb::hex(0x30D158),
        secondary: Rgb::hex(0x32D74B),
        accent: Rgb::hex(0x64D2FF),
    },
    ThemeProfile {
        primary: Rgb::hex(0xBF5AF2),
        secondary: Rgb::hex(0xFF2D92),
        accent: Rgb::hex(0xFF9500),
    },
];

/// Number of built-in themes.
pub const fn theme_count() -> usize {
    ThemeId::ALL.len()
}

/// Holds the active theme for the page session.
#[derive(Debug, Clone, Default)]
pub struct ThemeStore {
    current: ThemeId,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active theme.
    pub fn current_id(&self) -> ThemeId {
        self.current
    }

    /// Index of the active theme in the rotation.
    pub fn index(&self) -> usize {
        self.current.index()
    }

    /// Palette of the active theme.
    pub fn current(&self) -> ThemeProfile {
        self.current.profile()
    }

    /// Move to the next theme (wrapping) and return its palette.
    pub fn advance(&mut self) -> ThemeProfile {
        self.current = self.current.next();
        debug!(
            target: "glint::theme",
            index = self.current.index(),
            name = self.current.name(),
            "theme advanced"
        );
        self.current.profile()
    }
}

/// Write `profile` into the document: the three root color properties, a
/// body transition, and the container background when `container` exists.
pub fn apply_theme<S: EffectSurface>(
    surface: &S,
    profile: &ThemeProfile,
    container: Option<&S::Node>,
) -> Result<(), SurfaceError> {
    for (name, value) in profile.root_properties() {
        surface.set_root_property(name, &value)?;
    }
    if let Some(body) = surface.body() {
        surface.set_style(&body, "transition", "all 0.5s ease")?;
    }
    if let Some(container) = container {
        surface.set_style(container, "background", &profile.container_background())?;
    }
    Ok(())
}
