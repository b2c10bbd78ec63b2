//! Per-node controller
//!
//! One [`NodeController::tick`] keeps the connection alive, applies inbound
//! commands, advances whichever engine owns the display and pushes a frame
//! to the renderer when anything changed.

pub mod trigger;

use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::{
    command::{decode, CommandRouter},
    config::DEFAULT_PUMP_WAIT,
    display::{BorderMode, DisplayProfile, Renderer, Scene, TextSlot},
    error::NodeError,
    services::{Bus, ConnectivityController, InboundMessage, Link},
    state::{
        timer_state::{clock_text, FINAL_COUNTDOWN},
        ActiveState, Engines, PresetEvent, TimerEvent, TimerPhase,
    },
    tasks::Watchdog,
};
pub use trigger::TriggerFile;

pub struct NodeController<L: Link, B: Bus> {
    profile: DisplayProfile,
    engines: Engines,
    scene: Scene,
    router: CommandRouter,
    connectivity: ConnectivityController<L, B>,
    renderer: Box<dyn Renderer>,
    watchdog: Box<dyn Watchdog>,
    trigger: Option<TriggerFile>,
    pump_wait: Duration,
}

impl<L: Link, B: Bus> NodeController<L, B> {
    pub fn new(
        profile: DisplayProfile,
        connectivity: ConnectivityController<L, B>,
        renderer: Box<dyn Renderer>,
        watchdog: Box<dyn Watchdog>,
    ) -> Self {
        Self {
            profile,
            engines: Engines::new(),
            scene: Scene::new(&profile),
            router: CommandRouter::new(profile),
            connectivity,
            renderer,
            watchdog,
            trigger: None,
            pump_wait: DEFAULT_PUMP_WAIT,
        }
    }

    pub fn with_trigger_file(mut self, trigger: Option<TriggerFile>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_pump_wait(mut self, wait: Duration) -> Self {
        self.pump_wait = wait;
        self
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn connectivity(&self) -> &ConnectivityController<L, B> {
        &self.connectivity
    }

    pub fn active(&self) -> ActiveState {
        self.engines.active()
    }

    /// Connect at boot and show the blank baseline
    pub async fn start(&mut self, now: Instant) {
        info!(
            width = self.profile.width,
            height = self.profile.height,
            scrolling = self.profile.supports_scrolling,
            "Starting node"
        );
        self.watchdog.feed();
        self.connectivity.start(now).await;
        self.render();
    }

    pub async fn tick(&mut self, now: Instant) -> Result<(), NodeError> {
        self.watchdog.feed();

        self.connectivity.maintain(now).await;
        self.connectivity.heartbeat(now).await;
        self.connectivity.check_ping(now).await;

        let messages = self.connectivity.pump(self.pump_wait, now).await;
        for message in messages {
            self.handle_message(&message, now).await;
        }

        let mut holding_done = false;
        if self.engines.active() == ActiveState::Idle {
            self.poll_trigger(now).await?;
        } else {
            holding_done = self.advance_engines(now);
        }

        if !holding_done {
            if let Some(request) = self.scene.border.advance(now) {
                trace!(mode = ?request.mode, step = request.step, "Border stepped");
            }
            self.scene.text.advance_scroll(now);
        }

        self.render();
        Ok(())
    }

    async fn handle_message(&mut self, message: &InboundMessage, now: Instant) {
        debug!(topic = %message.topic, "Handling command");
        let decoded = decode(&message.payload);
        let result = decoded
            .command
            .and_then(|command| self.router.handle(&command, &mut self.engines, &mut self.scene, now));

        match &result {
            Ok(state) => info!(state = ?state, "Command applied"),
            Err(e) => warn!("Command not applied: {}", e),
        }

        self.connectivity.record_message(result.is_ok(), now);
        if let Some(message_id) = decoded.message_id {
            self.connectivity.acknowledge(&message_id, &result, now).await;
        }
    }

    async fn poll_trigger(&mut self, now: Instant) -> Result<(), NodeError> {
        let Some(trigger) = self.trigger.as_mut() else {
            return Ok(());
        };
        let Some(contents) = trigger.poll(now).await? else {
            return Ok(());
        };

        let result = decode(&contents)
            .command
            .and_then(|command| self.router.handle(&command, &mut self.engines, &mut self.scene, now));
        match result {
            Ok(state) => info!(state = ?state, "Trigger applied"),
            Err(e) => warn!("Trigger not applied: {}", e),
        }
        Ok(())
    }

    /// Returns true while the terminal Done frame is held
    fn advance_engines(&mut self, now: Instant) -> bool {
        if self.engines.presets.is_active() {
            if let Some(PresetEvent::PresetEnd { preset_id }) = self.engines.presets.tick(now) {
                info!(preset = %preset_id, "Preset ended");
                self.scene.reset();
            }
            return false;
        }

        match self.engines.timer.tick(now) {
            Some(TimerEvent::Countdown {
                minutes,
                seconds,
                remaining,
                ..
            }) => {
                self.scene.text.set_text(TextSlot::Value, &clock_text(minutes, seconds));
                if remaining <= FINAL_COUNTDOWN && self.scene.border.mode() != BorderMode::Animated {
                    self.scene.border.set_mode(BorderMode::Animated);
                }
            }
            Some(TimerEvent::Done { first_entry: true }) => {
                info!("Countdown finished");
                self.scene.text.set_text(TextSlot::Value, "DONE");
                self.scene.border.set_mode(BorderMode::Solid);
            }
            Some(TimerEvent::Done { first_entry: false }) | None => {}
            Some(TimerEvent::StopwatchStart) => {
                self.scene.text.set_text(TextSlot::Title, "STOPWATCH");
                self.scene.text.set_text(TextSlot::Value, &clock_text(0, 0));
                self.scene.border.set_mode(BorderMode::Blinking);
            }
            Some(TimerEvent::Stopwatch { minutes, seconds, .. }) => {
                if self.scene.border.mode() != BorderMode::Blinking {
                    self.scene.border.set_mode(BorderMode::Blinking);
                }
                self.scene.text.set_text(TextSlot::Value, &clock_text(minutes, seconds));
            }
        }

        matches!(self.engines.timer.phase(), TimerPhase::Done { .. })
    }

    fn render(&mut self) {
        if self.scene.is_dirty() {
            let frame = self.scene.take_frame(&self.profile);
            self.renderer.render(&frame);
        }
    }
}
