//! Height constraints for a widget frame.

use skydeck_types::{DisplayMode, HostGlobals};

/// CSS custom property some hosts set instead of the `maxHeight` global.
pub const MAX_HEIGHT_CSS_VARIABLE: &str = "--openai-max-height";

pub const INLINE_FALLBACK_HEIGHT: u32 = 480;
pub const EXPANDED_FALLBACK_HEIGHT: u32 = 720;

pub fn fallback_height(display_mode: DisplayMode) -> u32 {
    match display_mode {
        DisplayMode::Inline => INLINE_FALLBACK_HEIGHT,
        DisplayMode::Fullscreen | DisplayMode::Pip => EXPANDED_FALLBACK_HEIGHT,
    }
}

/// Parse the leading integer of a CSS length such as `" 512px"`.
pub fn parse_css_max_height(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let digits = trimmed.find(|c: char| !c.is_ascii_digit()).map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().ok()
}

/// Resolve the frame's max height: the host global, then the CSS hint, then
/// the viewport clamped to the display mode's fallback.
pub fn resolve_max_height(globals: &HostGlobals, css_hint: Option<&str>, viewport_height: u32) -> u32 {
    globals
        .max_height
        .or_else(|| css_hint.and_then(parse_css_max_height))
        .unwrap_or_else(|| viewport_height.min(fallback_height(globals.display_mode)))
}
