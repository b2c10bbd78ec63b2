//! Display render state
//!
//! Everything here decides *what* the panel shows. Pixel output belongs to a
//! [`Renderer`] implementation which receives complete [`Frame`] snapshots.

pub mod border;
pub mod profile;
pub mod renderer;
pub mod text;

use std::fmt;

pub use border::{border_mask, BorderMask, BorderMode, BorderRenderState, FrameRequest};
pub use profile::DisplayProfile;
pub use renderer::{Frame, LogRenderer, Renderer, TextLine};
pub use text::{TextRenderState, TextSlot};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xFFFFFF);
    pub const RED: Rgb = Rgb(0xFF0000);
    pub const GREEN: Rgb = Rgb(0x00FF00);
    pub const YELLOW: Rgb = Rgb(0xFFFF00);
    pub const BLUE: Rgb = Rgb(0x0000FF);
    pub const PURPLE: Rgb = Rgb(0x800080);
    pub const MAGENTA: Rgb = Rgb(0xFF00FF);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0xFF_FFFF)
    }
}

/// Visual layers the router and the node loop mutate between frames
#[derive(Debug, Clone)]
pub struct Scene {
    pub text: TextRenderState,
    pub border: BorderRenderState,
    pub background: Rgb,
    pub radio_icon: bool,
    background_dirty: bool,
}

impl Scene {
    pub fn new(profile: &DisplayProfile) -> Self {
        Self {
            text: TextRenderState::new(profile),
            border: BorderRenderState::new(profile.width, profile.height),
            background: Rgb::BLACK,
            radio_icon: false,
            background_dirty: true,
        }
    }

    pub fn set_background(&mut self, color: Rgb) {
        if self.background != color {
            self.background = color;
            self.background_dirty = true;
        }
    }

    pub fn set_radio_icon(&mut self, visible: bool) {
        if self.radio_icon != visible {
            self.radio_icon = visible;
            self.background_dirty = true;
        }
    }

    /// Blank text, border and background; hides preset iconography
    pub fn reset(&mut self) {
        self.text.clear();
        self.border.clear();
        self.set_background(Rgb::BLACK);
        self.set_radio_icon(false);
    }

    /// Whether anything changed since the last [`Scene::take_frame`]
    pub fn is_dirty(&self) -> bool {
        self.background_dirty || self.text.is_dirty() || self.border.is_dirty()
    }

    /// Snapshot the scene for the renderer and mark it clean
    pub fn take_frame(&mut self, profile: &DisplayProfile) -> Frame {
        self.background_dirty = false;
        let frame = Frame {
            background: if profile.has_background_layer { self.background } else { Rgb::BLACK },
            border: self.border.mask().clone(),
            border_color: self.border.color(),
            title: self.text.line(TextSlot::Title, profile.title_y),
            value: self.text.line(TextSlot::Value, profile.value_y),
            radio_icon: profile.supports_icon && self.radio_icon,
        };
        self.text.mark_clean();
        self.border.mark_clean();
        frame
    }
}
