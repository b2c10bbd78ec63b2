//! Per-node hardware capabilities

/// Capability set of one display node variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayProfile {
    pub width: u16,
    pub height: u16,
    /// Advance of one glyph of the built-in font
    pub char_width: u16,
    pub title_y: i32,
    pub value_y: i32,
    /// Longest text shown without scrolling on a scrolling-capable node
    pub max_scroll_chars: usize,
    pub supports_icon: bool,
    pub supports_scrolling: bool,
    pub has_background_layer: bool,
}

impl DisplayProfile {
    /// 64x32 MatrixPortal panel
    pub const fn standard() -> Self {
        Self {
            width: 64,
            height: 32,
            char_width: 6,
            title_y: 8,
            value_y: 20,
            max_scroll_chars: 10,
            supports_icon: true,
            supports_scrolling: false,
            has_background_layer: true,
        }
    }

    pub const fn music() -> Self {
        Self {
            supports_scrolling: true,
            ..Self::standard()
        }
    }

    pub const fn basic() -> Self {
        Self {
            supports_icon: false,
            has_background_layer: false,
            ..Self::standard()
        }
    }
}

impl Default for DisplayProfile {
    fn default() -> Self {
        Self::standard()
    }
}
