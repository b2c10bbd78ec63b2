//! Border layer: mode, animation step and the resulting pixel mask

use std::time::{Duration, Instant};

use super::Rgb;

/// Marching-ants cadence
pub const ANIMATED_INTERVAL: Duration = Duration::from_millis(200);
/// Blink cadence
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    #[default]
    None,
    Solid,
    Dashed,
    Animated,
    Blinking,
}

impl BorderMode {
    /// Redraw cadence; `None` for static modes
    pub fn interval(self) -> Option<Duration> {
        match self {
            BorderMode::Animated => Some(ANIMATED_INTERVAL),
            BorderMode::Blinking => Some(BLINK_INTERVAL),
            BorderMode::None | BorderMode::Solid | BorderMode::Dashed => None,
        }
    }
}

/// Set of lit border pixels over a `width` x `height` canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderMask {
    width: u16,
    height: u16,
    lit: Vec<bool>,
}

impl BorderMask {
    pub fn empty(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            lit: vec![false; width as usize * height as usize],
        }
    }

    fn set(&mut self, x: u16, y: u16) {
        if x < self.width && y < self.height {
            self.lit[y as usize * self.width as usize + x as usize] = true;
        }
    }

    pub fn is_lit(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height && self.lit[y as usize * self.width as usize + x as usize]
    }

    pub fn lit_count(&self) -> usize {
        self.lit.iter().filter(|&&on| on).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lit_count() == 0
    }

    /// Lit pixels in row-major order
    pub fn iter_lit(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        let width = self.width as usize;
        self.lit
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(move |(i, _)| ((i % width) as u16, (i / width) as u16))
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

/// Pixel mask for a border `mode` at animation `step`
pub fn border_mask(mode: BorderMode, step: u8, width: u16, height: u16) -> BorderMask {
    let mut mask = BorderMask::empty(width, height);
    if width == 0 || height == 0 {
        return mask;
    }

    match mode {
        BorderMode::None => {}
        BorderMode::Solid => {
            for x in 0..width {
                mask.set(x, 0);
                mask.set(x, height - 1);
            }
            for y in 0..height {
                mask.set(0, y);
                mask.set(width - 1, y);
            }
        }
        BorderMode::Dashed => draw_dashed(&mut mask),
        BorderMode::Blinking => {
            if step % 2 == 0 {
                draw_dashed(&mut mask);
            }
        }
        BorderMode::Animated => {
            // Walk a virtual perimeter: top/bottom share x, then the right
            // edge, then the left edge.
            let perimeter = width as u32 + 2 * height as u32;
            for i in 0..perimeter {
                if (i + step as u32) % 2 != 0 {
                    continue;
                }
                if i < width as u32 {
                    mask.set(i as u16, 0);
                    mask.set(i as u16, height - 1);
                } else {
                    let pos = (i - width as u32) as u16;
                    if pos < height {
                        mask.set(width - 1, pos);
                    } else {
                        mask.set(0, pos - height);
                    }
                }
            }
        }
    }
    mask
}

fn draw_dashed(mask: &mut BorderMask) {
    let (width, height) = (mask.width, mask.height);
    for x in (0..width).step_by(2) {
        mask.set(x, 0);
        mask.set(x, height - 1);
    }
    for y in (0..height).step_by(2) {
        mask.set(0, y);
        mask.set(width - 1, y);
    }
}

/// Emitted when an animated border produced a new frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRequest {
    pub mode: BorderMode,
    pub step: u8,
}

#[derive(Debug, Clone)]
pub struct BorderRenderState {
    width: u16,
    height: u16,
    mode: BorderMode,
    step: u8,
    color: Rgb,
    last_update: Option<Instant>,
    mask: BorderMask,
    dirty: bool,
}

impl BorderRenderState {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            mode: BorderMode::None,
            step: 0,
            color: Rgb::RED,
            last_update: None,
            mask: BorderMask::empty(width, height),
            dirty: true,
        }
    }

    /// Switch mode, restarting the animation at step 0
    ///
    /// Step 0 stays up for one full interval, measured from the first
    /// [`advance`](Self::advance) after the switch.
    pub fn set_mode(&mut self, mode: BorderMode) {
        self.mode = mode;
        self.step = 0;
        self.last_update = None;
        self.redraw();
    }

    pub fn clear(&mut self) {
        self.set_mode(BorderMode::None);
    }

    pub fn set_color(&mut self, color: Rgb) {
        if self.color != color {
            self.color = color;
            self.dirty = true;
        }
    }

    /// Advance animated modes once their cadence elapsed
    pub fn advance(&mut self, now: Instant) -> Option<FrameRequest> {
        let interval = self.mode.interval()?;
        let Some(last) = self.last_update else {
            self.last_update = Some(now);
            return None;
        };
        if now.saturating_duration_since(last) < interval {
            return None;
        }
        self.last_update = Some(now);
        self.step = (self.step + 1) % 2;
        self.redraw();
        Some(FrameRequest {
            mode: self.mode,
            step: self.step,
        })
    }

    fn redraw(&mut self) {
        let mask = border_mask(self.mode, self.step, self.width, self.height);
        if mask != self.mask {
            self.mask = mask;
            self.dirty = true;
        }
    }

    pub fn mode(&self) -> BorderMode {
        self.mode
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn mask(&self) -> &BorderMask {
        &self.mask
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u16 = 64;
    const H: u16 = 32;

    #[test]
    fn solid_traces_all_four_edges() {
        let mask = border_mask(BorderMode::Solid, 0, W, H);
        assert_eq!(mask.lit_count(), 2 * W as usize + 2 * H as usize - 4);
        assert!(mask.is_lit(0, 0));
        assert!(mask.is_lit(W - 1, H - 1));
        assert!(!mask.is_lit(1, 1));
    }

    #[test]
    fn dashed_lights_every_other_pixel() {
        let mask = border_mask(BorderMode::Dashed, 0, W, H);
        assert!(mask.is_lit(0, 0));
        assert!(!mask.is_lit(1, 0));
        assert!(mask.is_lit(2, H - 1));
        assert!(!mask.is_lit(0, 1));
        assert!(mask.is_lit(W - 1, 2));
    }

    #[test]
    fn marching_steps_alternate() {
        let even = border_mask(BorderMode::Animated, 0, W, H);
        let odd = border_mask(BorderMode::Animated, 1, W, H);
        assert!(even.is_lit(0, 0));
        assert!(!even.is_lit(1, 0));
        assert!(odd.is_lit(1, 0));
        assert!(!odd.is_lit(0, 0));
        assert_ne!(even, odd);

        // Both steps together cover the whole solid border
        let solid = border_mask(BorderMode::Solid, 0, W, H);
        for (x, y) in solid.iter_lit() {
            assert!(even.is_lit(x, y) || odd.is_lit(x, y), "({x}, {y}) never lit");
        }
    }

    #[test]
    fn blinking_toggles_dashed_border() {
        assert_eq!(
            border_mask(BorderMode::Blinking, 0, W, H),
            border_mask(BorderMode::Dashed, 0, W, H)
        );
        assert!(border_mask(BorderMode::Blinking, 1, W, H).is_empty());
    }

    #[test]
    fn animation_is_time_gated() {
        let t0 = Instant::now();
        let mut border = BorderRenderState::new(W, H);
        border.set_mode(BorderMode::Animated);
        assert_eq!(border.step(), 0);

        assert!(border.advance(t0).is_none());
        assert_eq!(border.step(), 0);
        assert!(border.advance(t0 + Duration::from_millis(100)).is_none());
        assert_eq!(border.step(), 0);
        let frame = border.advance(t0 + Duration::from_millis(200)).expect("frame");
        assert_eq!(frame.step, 1);
        assert!(border.advance(t0 + Duration::from_millis(300)).is_none());
        let frame = border.advance(t0 + Duration::from_millis(400)).expect("frame");
        assert_eq!(frame.step, 0);
    }

    #[test]
    fn blinking_opens_on_the_lit_phase() {
        let t0 = Instant::now();
        let mut border = BorderRenderState::new(W, H);
        border.set_mode(BorderMode::Blinking);
        let dashed = border_mask(BorderMode::Dashed, 0, W, H);

        assert!(border.advance(t0).is_none());
        assert_eq!(border.mask(), &dashed);
        assert!(border.advance(t0 + Duration::from_millis(499)).is_none());
        assert_eq!(border.mask(), &dashed);

        let frame = border.advance(t0 + BLINK_INTERVAL).expect("frame");
        assert_eq!(frame, FrameRequest { mode: BorderMode::Blinking, step: 1 });
        assert!(border.mask().is_empty());
    }

    #[test]
    fn static_modes_never_advance() {
        let t0 = Instant::now();
        let mut border = BorderRenderState::new(W, H);
        border.set_mode(BorderMode::Solid);
        assert!(border.advance(t0 + Duration::from_secs(5)).is_none());
        border.clear();
        assert!(border.advance(t0 + Duration::from_secs(10)).is_none());
        assert!(border.mask().is_empty());
    }

    #[test]
    fn set_mode_resets_step() {
        let t0 = Instant::now();
        let mut border = BorderRenderState::new(W, H);
        border.set_mode(BorderMode::Blinking);
        border.advance(t0);
        border.advance(t0 + BLINK_INTERVAL);
        assert_eq!(border.step(), 1);

        // The new mode gets its own full first interval
        border.set_mode(BorderMode::Animated);
        assert_eq!(border.step(), 0);
        assert!(border.advance(t0 + Duration::from_millis(600)).is_none());
        assert!(border.advance(t0 + Duration::from_millis(700)).is_none());
        assert_eq!(border.step(), 0);
        assert!(border.advance(t0 + Duration::from_millis(800)).is_some());
    }
}
