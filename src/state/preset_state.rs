//! Named visual presets and their optional expiry

use std::{
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use crate::display::{BorderMode, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetId {
    OnAir,
    Score,
    Breaking,
    Reset,
    Music,
}

/// Static look of a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetConfig {
    pub background: Rgb,
    /// Title shown when the command carries no name
    pub label: &'static str,
    pub text_color: Rgb,
    pub border_mode: BorderMode,
    pub border_color: Rgb,
    pub show_radio_icon: bool,
}

static ON_AIR: PresetConfig = PresetConfig {
    background: Rgb::BLACK,
    label: "ON AIR",
    text_color: Rgb::RED,
    border_mode: BorderMode::Solid,
    border_color: Rgb::WHITE,
    show_radio_icon: true,
};

static SCORE: PresetConfig = PresetConfig {
    background: Rgb::GREEN,
    label: "SCORE",
    text_color: Rgb::YELLOW,
    border_mode: BorderMode::Animated,
    border_color: Rgb::YELLOW,
    show_radio_icon: false,
};

static BREAKING: PresetConfig = PresetConfig {
    background: Rgb::BLUE,
    label: "BREAKING",
    text_color: Rgb::WHITE,
    border_mode: BorderMode::Blinking,
    border_color: Rgb::RED,
    show_radio_icon: false,
};

static RESET: PresetConfig = PresetConfig {
    background: Rgb::BLACK,
    label: "",
    text_color: Rgb::WHITE,
    border_mode: BorderMode::None,
    border_color: Rgb::RED,
    show_radio_icon: false,
};

static MUSIC: PresetConfig = PresetConfig {
    background: Rgb::PURPLE,
    label: "NO TRACK DATA",
    text_color: Rgb::WHITE,
    border_mode: BorderMode::Animated,
    border_color: Rgb::MAGENTA,
    show_radio_icon: false,
};

impl PresetId {
    pub const ALL: [PresetId; 5] = [
        PresetId::OnAir,
        PresetId::Score,
        PresetId::Breaking,
        PresetId::Reset,
        PresetId::Music,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetId::OnAir => "on_air",
            PresetId::Score => "score",
            PresetId::Breaking => "breaking",
            PresetId::Reset => "reset",
            PresetId::Music => "music",
        }
    }

    pub fn config(self) -> &'static PresetConfig {
        match self {
            PresetId::OnAir => &ON_AIR,
            PresetId::Score => &SCORE,
            PresetId::Breaking => &BREAKING,
            PresetId::Reset => &RESET,
            PresetId::Music => &MUSIC,
        }
    }
}

impl FromStr for PresetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown preset: {}", s))
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional fields of a preset command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetOptions {
    pub name: Option<String>,
    pub duration: Option<Duration>,
    pub artist: Option<String>,
    pub song: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivePreset {
    pub id: PresetId,
    pub options: PresetOptions,
    pub started_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetEvent {
    Active {
        preset_id: PresetId,
        config: &'static PresetConfig,
    },
    PresetEnd {
        preset_id: PresetId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PresetEngine {
    active: Option<ActivePreset>,
}

impl PresetEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a preset; returns false for an unknown id
    pub fn start_preset(&mut self, preset_id: &str, options: PresetOptions, now: Instant) -> bool {
        let id = match preset_id.parse::<PresetId>() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("{}", e);
                return false;
            }
        };
        self.active = Some(ActivePreset {
            id,
            options,
            started_at: now,
        });
        true
    }

    pub fn tick(&mut self, now: Instant) -> Option<PresetEvent> {
        let active = self.active.as_ref()?;
        let expired = active
            .options
            .duration
            .is_some_and(|duration| now.saturating_duration_since(active.started_at) >= duration);

        if expired {
            let preset_id = active.id;
            self.active = None;
            return Some(PresetEvent::PresetEnd { preset_id });
        }
        Some(PresetEvent::Active {
            preset_id: active.id,
            config: active.id.config(),
        })
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActivePreset> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
