//! Applies validated commands to the engines and the scene

use std::time::Instant;

use tracing::{info, warn};

use super::Command;
use crate::{
    display::{BorderMode, DisplayProfile, Rgb, Scene, TextSlot},
    error::CommandError,
    state::{
        timer_state::{clock_text, countdown_seconds},
        ActiveState, Engines, PresetId, PresetOptions,
    },
};

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_SONG: &str = "Unknown Song";

#[derive(Debug, Clone)]
pub struct CommandRouter {
    profile: DisplayProfile,
}

impl CommandRouter {
    pub fn new(profile: DisplayProfile) -> Self {
        Self { profile }
    }

    /// Reset to a blank baseline and apply `command`
    ///
    /// Commands that can never succeed are refused before anything is
    /// touched. A preset id missing from the table is only discovered after
    /// the baseline reset, leaving the display blank.
    pub fn handle(
        &self,
        command: &Command,
        engines: &mut Engines,
        scene: &mut Scene,
        now: Instant,
    ) -> Result<ActiveState, CommandError> {
        if let Command::Timer { duration, .. } = command {
            if countdown_seconds(*duration).is_none() {
                return Err(CommandError::Invalid(format!(
                    "duration must be at least one second, got {}",
                    duration
                )));
            }
        }

        engines.clear();
        scene.reset();

        match command {
            Command::Timer { name, duration } => {
                scene.set_background(Rgb::BLACK);
                scene.text.set_color(TextSlot::Title, Rgb::WHITE);
                scene.text.set_color(TextSlot::Value, Rgb::WHITE);
                scene.border.set_color(Rgb::RED);

                if !engines.timer.start_countdown(name, *duration, now) {
                    return Err(CommandError::Rejected(format!("countdown {} not started", name)));
                }
                scene.text.set_text(TextSlot::Title, name);
                if let Some(countdown) = engines.timer.countdown() {
                    let remaining = countdown.remaining_seconds;
                    scene.text.set_text(TextSlot::Value, &clock_text(remaining / 60, remaining % 60));
                }
                scene.border.set_mode(BorderMode::Solid);
                info!(name = %name, duration, "countdown started");
            }
            Command::Preset { preset_id, options } => {
                if !engines.presets.start_preset(preset_id, options.clone(), now) {
                    return Err(CommandError::Rejected(format!("unknown preset: {}", preset_id)));
                }
                let Some(id) = engines.presets.active().map(|preset| preset.id) else {
                    return Err(CommandError::Rejected(format!("preset {} not active", preset_id)));
                };
                self.apply_preset(id, options, scene);
                info!(preset = %id, "preset started");
            }
        }

        Ok(engines.active())
    }

    fn apply_preset(&self, id: PresetId, options: &PresetOptions, scene: &mut Scene) {
        let config = id.config();
        scene.set_background(config.background);
        scene.text.set_color(TextSlot::Title, config.text_color);
        scene.text.set_color(TextSlot::Value, config.text_color);

        if id == PresetId::Music {
            let artist = options.artist.as_deref().unwrap_or(UNKNOWN_ARTIST);
            let song = options.song.as_deref().unwrap_or(UNKNOWN_SONG);
            if self.profile.supports_scrolling {
                let max_chars = self.profile.max_scroll_chars;
                scene.text.set_text_scrolling(TextSlot::Title, artist, max_chars);
                scene.text.set_text_scrolling(TextSlot::Value, song, max_chars);
            } else {
                warn!("music preset on a node without scrolling, showing static track text");
                scene.text.set_text(TextSlot::Title, artist);
                scene.text.set_text(TextSlot::Value, song);
            }
        } else {
            let title = options.name.as_deref().unwrap_or(config.label);
            scene.text.set_text(TextSlot::Title, title);
            scene.text.set_text(TextSlot::Value, "");
        }

        scene.border.set_color(config.border_color);
        match config.border_mode {
            BorderMode::None => scene.border.clear(),
            mode => scene.border.set_mode(mode),
        }
        scene.set_radio_icon(config.show_radio_icon && self.profile.supports_icon);
    }
}
