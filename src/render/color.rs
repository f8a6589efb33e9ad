//! Colors and bar color resolution.
//!
//! The renderer never reads ambient styling on its own: an explicit color wins,
//! then a host-injected [`Theme`] accessor, then a fixed neutral gray. Keeping
//! the lookup explicit keeps the renderer pure and host-agnostic.

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black, the cleared surface value.
    pub const TRANSPARENT: Rgba = Rgba::rgba(0, 0, 0, 0);

    /// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

/// Fallback bar color when neither an explicit color nor a theme is available.
pub const NEUTRAL_GRAY: Rgba = Rgba::rgb(0x9c, 0xa3, 0xaf);

/// Host-provided default colors.
///
/// The terminal presenter derives these from its palette; embedding hosts can
/// supply their own. Returning `None` falls through to [`NEUTRAL_GRAY`].
pub trait Theme {
    /// Default bar color.
    fn bar_color(&self) -> Option<Rgba>;

    /// Surface background the frame is composited over.
    fn background(&self) -> Rgba {
        Rgba::rgb(0, 0, 0)
    }
}

/// Resolves the effective bar color.
///
/// Precedence: explicit style color, then theme default, then neutral gray.
pub fn resolve_bar_color(explicit: Option<Rgba>, theme: Option<&dyn Theme>) -> Rgba {
    explicit
        .or_else(|| theme.and_then(Theme::bar_color))
        .unwrap_or(NEUTRAL_GRAY)
}
