//! State management module
//!
//! Engines that turn commands into display state, connection bookkeeping of a
//! node, and the shared state of the HTTP gateway.

pub mod app_state;
pub mod connection_state;
pub mod preset_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use connection_state::ConnectionState;
pub use preset_state::{ActivePreset, PresetConfig, PresetEngine, PresetEvent, PresetId, PresetOptions};
pub use timer_state::{Countdown, TimerEngine, TimerEvent, TimerPhase};

/// Which engine currently owns the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveState {
    Idle,
    Countdown,
    Done,
    Stopwatch,
    Preset,
}

/// Timer and preset engines; at most one of them is active
#[derive(Debug, Clone, Default)]
pub struct Engines {
    pub timer: TimerEngine,
    pub presets: PresetEngine,
}

impl Engines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.timer.clear();
        self.presets.clear();
    }

    pub fn active(&self) -> ActiveState {
        if self.presets.is_active() {
            return ActiveState::Preset;
        }
        match self.timer.phase() {
            TimerPhase::Idle => ActiveState::Idle,
            TimerPhase::Countdown(_) => ActiveState::Countdown,
            TimerPhase::Done { .. } => ActiveState::Done,
            TimerPhase::Stopwatch { .. } => ActiveState::Stopwatch,
        }
    }
}
