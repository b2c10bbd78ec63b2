//! Two-line text layer with centering and horizontal scrolling

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use super::{DisplayProfile, Rgb, TextLine};

/// One pixel of scroll per interval
pub const SCROLL_SPEED: Duration = Duration::from_millis(50);
/// Dwell before scrolling starts and after every wrap
pub const SCROLL_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSlot {
    Title,
    Value,
}

impl TextSlot {
    fn index(self) -> usize {
        match self {
            TextSlot::Title => 0,
            TextSlot::Value => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollPhase {
    /// Waiting at the start position; `since` is set on the first advance
    Dwell { since: Option<Instant> },
    Moving { last_step: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scroll {
    start_x: i32,
    end_x: i32,
    phase: ScrollPhase,
}

#[derive(Debug, Clone)]
struct SlotState {
    text: String,
    x: i32,
    color: Rgb,
    scroll: Option<Scroll>,
}

impl SlotState {
    fn new() -> Self {
        Self {
            text: String::new(),
            x: 0,
            color: Rgb::WHITE,
            scroll: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextRenderState {
    display_width: i32,
    char_width: i32,
    slots: [SlotState; 2],
    /// Centered x keyed by text length
    positions: HashMap<usize, i32>,
    dirty: bool,
}

impl TextRenderState {
    pub fn new(profile: &DisplayProfile) -> Self {
        Self {
            display_width: profile.width as i32,
            char_width: profile.char_width as i32,
            slots: [SlotState::new(), SlotState::new()],
            positions: HashMap::new(),
            dirty: true,
        }
    }

    fn text_width(&self, len: usize) -> i32 {
        len as i32 * self.char_width
    }

    fn centered_x(&mut self, len: usize) -> i32 {
        if let Some(&x) = self.positions.get(&len) {
            return x;
        }
        let x = (self.display_width - self.text_width(len)).div_euclid(2);
        tracing::debug!(len, x, "computed centered text position");
        self.positions.insert(len, x);
        x
    }

    /// Show `text` centered and static
    pub fn set_text(&mut self, slot: TextSlot, text: &str) {
        let len = text.chars().count();
        let idx = slot.index();
        let state = &self.slots[idx];
        let reposition = state.scroll.is_some() || state.text.chars().count() != len;

        if reposition {
            let x = self.centered_x(len);
            let state = &mut self.slots[idx];
            state.scroll = None;
            if state.x != x {
                state.x = x;
                self.dirty = true;
            }
        }

        let state = &mut self.slots[idx];
        if state.text != text {
            state.text = text.to_string();
            self.dirty = true;
        }
    }

    /// Show `text`, scrolling it when wider than `max_chars` glyphs
    pub fn set_text_scrolling(&mut self, slot: TextSlot, text: &str, max_chars: usize) {
        let len = text.chars().count();
        if len <= max_chars {
            self.set_text(slot, text);
            return;
        }

        let width = self.text_width(len);
        let start_x = self.display_width - width;
        let state = &mut self.slots[slot.index()];
        if state.scroll.is_some() && state.text == text {
            return;
        }
        state.text = text.to_string();
        state.x = start_x;
        state.scroll = Some(Scroll {
            start_x,
            end_x: -width,
            phase: ScrollPhase::Dwell { since: None },
        });
        self.dirty = true;
    }

    pub fn set_color(&mut self, slot: TextSlot, color: Rgb) {
        let state = &mut self.slots[slot.index()];
        if state.color != color {
            state.color = color;
            self.dirty = true;
        }
    }

    /// Step every scrolling slot; returns whether any position moved
    pub fn advance_scroll(&mut self, now: Instant) -> bool {
        let mut moved = false;
        for state in self.slots.iter_mut() {
            let Some(scroll) = state.scroll.as_mut() else {
                continue;
            };
            match scroll.phase {
                ScrollPhase::Dwell { since: None } => {
                    scroll.phase = ScrollPhase::Dwell { since: Some(now) };
                }
                ScrollPhase::Dwell { since: Some(since) } => {
                    if now.saturating_duration_since(since) >= SCROLL_PAUSE {
                        scroll.phase = ScrollPhase::Moving { last_step: now };
                    }
                }
                ScrollPhase::Moving { last_step } => {
                    if now.saturating_duration_since(last_step) < SCROLL_SPEED {
                        continue;
                    }
                    state.x -= 1;
                    scroll.phase = ScrollPhase::Moving { last_step: now };
                    if state.x <= scroll.end_x {
                        state.x = scroll.start_x;
                        scroll.phase = ScrollPhase::Dwell { since: Some(now) };
                    }
                    moved = true;
                }
            }
        }
        if moved {
            self.dirty = true;
        }
        moved
    }

    /// Empty both lines
    pub fn clear(&mut self) {
        self.set_text(TextSlot::Title, "");
        self.set_text(TextSlot::Value, "");
    }

    pub fn text(&self, slot: TextSlot) -> &str {
        &self.slots[slot.index()].text
    }

    pub fn x(&self, slot: TextSlot) -> i32 {
        self.slots[slot.index()].x
    }

    pub fn color(&self, slot: TextSlot) -> Rgb {
        self.slots[slot.index()].color
    }

    pub fn is_scrolling(&self, slot: TextSlot) -> bool {
        self.slots[slot.index()].scroll.is_some()
    }

    pub fn line(&self, slot: TextSlot, y: i32) -> TextLine {
        let state = &self.slots[slot.index()];
        TextLine {
            text: state.text.clone(),
            x: state.x,
            y,
            color: state.color,
        }
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

    fn text_state() -> TextRenderState {
        TextRenderState::new(&DisplayProfile::standard())
    }

    #[test]
    fn centers_by_length() {
        let mut text = text_state();
        text.set_text(TextSlot::Title, "BREAK");
        assert_eq!(text.x(TextSlot::Title), (64 - 30) / 2);
        text.set_text(TextSlot::Value, "12:34");
        assert_eq!(text.x(TextSlot::Value), 17);
    }

    #[test]
    fn centering_is_idempotent() {
        let mut text = text_state();
        text.set_text(TextSlot::Title, "ON AIR");
        let first = text.x(TextSlot::Title);
        text.set_text(TextSlot::Title, "ON AIR");
        assert_eq!(text.x(TextSlot::Title), first);
        text.set_text(TextSlot::Title, "ON AIR");
        assert_eq!(text.x(TextSlot::Title), first);
    }

    #[test]
    fn oversized_text_centers_off_canvas() {
        let mut text = text_state();
        text.set_text(TextSlot::Title, "NO TRACK DATA");
        assert_eq!(text.x(TextSlot::Title), (64 - 78) / 2);
    }

    #[test]
    fn short_text_does_not_scroll() {
        let mut text = text_state();
        text.set_text_scrolling(TextSlot::Value, "Song", 10);
        assert!(!text.is_scrolling(TextSlot::Value));
        assert_eq!(text.x(TextSlot::Value), 20);
    }

    #[test]
    fn long_text_starts_right_aligned() {
        let mut text = text_state();
        text.set_text_scrolling(TextSlot::Title, "Artist With A Really Long Name", 10);
        assert!(text.is_scrolling(TextSlot::Title));
        assert_eq!(text.x(TextSlot::Title), 64 - 30 * 6);
    }

    #[test]
    fn scroll_pauses_then_wraps_to_start() {
        let mut text = text_state();
        let label = "Artist With A Really Long Name";
        text.set_text_scrolling(TextSlot::Title, label, 10);
        let start = text.x(TextSlot::Title);
        let width = 30 * 6;

        let t0 = Instant::now();
        let mut tick = 0u64;
        let mut advance = |text: &mut TextRenderState| {
            let moved = text.advance_scroll(t0 + SCROLL_SPEED * tick as u32);
            tick += 1;
            moved
        };

        // Dwell: 1s of 50ms ticks never moves the text
        for _ in 0..=20 {
            assert!(!advance(&mut text));
        }
        assert_eq!(text.x(TextSlot::Title), start);

        // One pixel per tick until the text leaves the left edge
        let travel = start - (-width);
        for step in 1..travel {
            assert!(advance(&mut text));
            assert_eq!(text.x(TextSlot::Title), start - step);
        }
        assert!(advance(&mut text));
        assert_eq!(text.x(TextSlot::Title), start);

        // Wrapped text dwells again
        assert!(!advance(&mut text));
        assert_eq!(text.x(TextSlot::Title), start);
    }

    #[test]
    fn slots_scroll_independently() {
        let mut text = text_state();
        text.set_text_scrolling(TextSlot::Title, "Artist With A Really Long Name", 10);
        text.set_text_scrolling(TextSlot::Value, "A Song Title That Is Long", 10);
        let t0 = Instant::now();
        text.advance_scroll(t0);
        text.advance_scroll(t0 + SCROLL_PAUSE);
        text.advance_scroll(t0 + SCROLL_PAUSE + SCROLL_SPEED);
        assert_eq!(text.x(TextSlot::Title), 64 - 180 - 1);
        assert_eq!(text.x(TextSlot::Value), 64 - 150 - 1);
    }

    #[test]
    fn set_text_stops_scrolling() {
        let mut text = text_state();
        text.set_text_scrolling(TextSlot::Title, "Artist With A Really Long Name", 10);
        text.set_text(TextSlot::Title, "");
        assert!(!text.is_scrolling(TextSlot::Title));
        assert_eq!(text.text(TextSlot::Title), "");
    }
}
