//! Output side of the display: frame snapshots and the renderer capability

use tracing::debug;

use super::{BorderMask, Rgb};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

/// Complete picture handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub background: Rgb,
    pub border: BorderMask,
    pub border_color: Rgb,
    pub title: TextLine,
    pub value: TextLine,
    pub radio_icon: bool,
}

/// Paints frames onto the physical panel
pub trait Renderer {
    fn render(&mut self, frame: &Frame);
}

/// Host stand-in for the LED panel: logs frame content changes
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_text: Option<(String, String)>,
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Frame) {
        self.frames += 1;
        let text = (frame.title.text.clone(), frame.value.text.clone());
        if self.last_text.as_ref() != Some(&text) {
            debug!(
                title = %frame.title.text,
                value = %frame.value.text,
                background = %frame.background,
                border_pixels = frame.border.lit_count(),
                radio_icon = frame.radio_icon,
                frames = self.frames,
                "display updated"
            );
            self.last_text = Some(text);
        }
    }
}
