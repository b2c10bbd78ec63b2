//! Countdown → done → stopwatch state machine

use std::time::{Duration, Instant};

/// How long the DONE frame stays up before the stopwatch starts
pub const DONE_DISPLAY_TIME: Duration = Duration::from_secs(10);
/// Remaining seconds at which the border switches to marching ants
pub const FINAL_COUNTDOWN: u64 = 10;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub name: String,
    pub duration_seconds: u64,
    pub remaining_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimerPhase {
    #[default]
    Idle,
    Countdown(Countdown),
    Done { entered_at: Instant },
    Stopwatch { start_time: Instant },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    Countdown {
        name: String,
        minutes: u64,
        seconds: u64,
        remaining: u64,
        second_boundary_crossed: bool,
    },
    Done {
        first_entry: bool,
    },
    StopwatchStart,
    Stopwatch {
        minutes: u64,
        seconds: u64,
        second_boundary_crossed: bool,
    },
}

/// Whole seconds of a countdown duration, or `None` if it is not a positive number
pub fn countdown_seconds(duration: f64) -> Option<u64> {
    if duration.is_finite() && duration >= 1.0 {
        Some(duration.floor() as u64)
    } else {
        None
    }
}

/// Format seconds as `MM:SS`
pub fn clock_text(minutes: u64, seconds: u64) -> String {
    format!("{:02}:{:02}", minutes, seconds)
}

#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    phase: TimerPhase,
    /// Last one-second grid point the counters moved on
    last_boundary: Option<Instant>,
}

impl TimerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh countdown; returns false without touching state if `duration` is not positive
    pub fn start_countdown(&mut self, name: &str, duration: f64, now: Instant) -> bool {
        let Some(seconds) = countdown_seconds(duration) else {
            return false;
        };
        self.phase = TimerPhase::Countdown(Countdown {
            name: name.to_string(),
            duration_seconds: seconds,
            remaining_seconds: seconds,
        });
        self.last_boundary = Some(now);
        true
    }

    pub fn start_stopwatch(&mut self, now: Instant) {
        self.phase = TimerPhase::Stopwatch { start_time: now };
        self.last_boundary = Some(now);
    }

    pub fn clear(&mut self) {
        self.phase = TimerPhase::Idle;
        self.last_boundary = None;
    }

    /// Advance the state machine; `None` unless a boundary or transition happened
    pub fn tick(&mut self, now: Instant) -> Option<TimerEvent> {
        let boundary_crossed = self
            .last_boundary
            .map_or(false, |last| now.saturating_duration_since(last) >= SECOND);

        match &mut self.phase {
            TimerPhase::Idle => None,
            TimerPhase::Countdown(countdown) => {
                if !boundary_crossed {
                    return None;
                }
                countdown.remaining_seconds = countdown.remaining_seconds.saturating_sub(1);
                self.last_boundary = Some(now);

                if countdown.remaining_seconds > 0 {
                    let remaining = countdown.remaining_seconds;
                    Some(TimerEvent::Countdown {
                        name: countdown.name.clone(),
                        minutes: remaining / 60,
                        seconds: remaining % 60,
                        remaining,
                        second_boundary_crossed: true,
                    })
                } else {
                    self.phase = TimerPhase::Done { entered_at: now };
                    Some(TimerEvent::Done { first_entry: true })
                }
            }
            TimerPhase::Done { entered_at } => {
                if now.saturating_duration_since(*entered_at) >= DONE_DISPLAY_TIME {
                    self.start_stopwatch(now);
                    Some(TimerEvent::StopwatchStart)
                } else {
                    Some(TimerEvent::Done { first_entry: false })
                }
            }
            TimerPhase::Stopwatch { start_time } => {
                if !boundary_crossed {
                    return None;
                }
                let elapsed = now.saturating_duration_since(*start_time).as_secs();
                self.last_boundary = Some(now);
                Some(TimerEvent::Stopwatch {
                    minutes: elapsed / 60,
                    seconds: elapsed % 60,
                    second_boundary_crossed: true,
                })
            }
        }
    }

    pub fn phase(&self) -> &TimerPhase {
        &self.phase
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        match &self.phase {
            TimerPhase::Countdown(countdown) => Some(countdown),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase != TimerPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn rejects_non_positive_durations() {
        let now = Instant::now();
        let mut timer = TimerEngine::new();
        assert!(!timer.start_countdown("x", 0.0, now));
        assert!(!timer.start_countdown("x", -5.0, now));
        assert!(!timer.start_countdown("x", 0.5, now));
        assert!(!timer.start_countdown("x", f64::NAN, now));
        assert_eq!(timer.phase(), &TimerPhase::Idle);
    }

    #[test]
    fn rejection_keeps_running_countdown() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        assert!(timer.start_countdown("TEA", 120.0, t0));
        timer.tick(t0 + secs(1));
        assert!(!timer.start_countdown("x", -5.0, t0 + secs(1)));
        let countdown = timer.countdown().expect("countdown survives");
        assert_eq!(countdown.name, "TEA");
        assert_eq!(countdown.remaining_seconds, 119);
    }

    #[test]
    fn fractional_duration_is_floored() {
        let now = Instant::now();
        let mut timer = TimerEngine::new();
        assert!(timer.start_countdown("x", 90.9, now));
        assert_eq!(timer.countdown().map(|c| c.remaining_seconds), Some(90));
    }

    #[test]
    fn polls_within_a_second_are_noops() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start_countdown("x", 75.0, t0);
        for ms in [10, 250, 500, 999] {
            assert_eq!(timer.tick(t0 + Duration::from_millis(ms)), None);
        }
        assert_eq!(
            timer.tick(t0 + secs(1)),
            Some(TimerEvent::Countdown {
                name: "x".to_string(),
                minutes: 1,
                seconds: 14,
                remaining: 74,
                second_boundary_crossed: true,
            })
        );
        assert_eq!(timer.tick(t0 + Duration::from_millis(1500)), None);
    }

    #[test]
    fn countdown_reaches_done_then_stopwatch() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start_countdown("BREAK", 5.0, t0);

        for n in 1..5 {
            match timer.tick(t0 + secs(n)) {
                Some(TimerEvent::Countdown { remaining, .. }) => assert_eq!(remaining, 5 - n),
                other => panic!("unexpected event at {n}s: {other:?}"),
            }
        }
        assert_eq!(timer.tick(t0 + secs(5)), Some(TimerEvent::Done { first_entry: true }));

        for n in 6..15 {
            assert_eq!(timer.tick(t0 + secs(n)), Some(TimerEvent::Done { first_entry: false }));
        }
        assert_eq!(timer.tick(t0 + secs(15)), Some(TimerEvent::StopwatchStart));
        assert_eq!(timer.tick(t0 + secs(15) + Duration::from_millis(400)), None);
        assert_eq!(
            timer.tick(t0 + secs(16)),
            Some(TimerEvent::Stopwatch {
                minutes: 0,
                seconds: 1,
                second_boundary_crossed: true,
            })
        );
    }

    #[test]
    fn done_fires_first_entry_exactly_once() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start_countdown("x", 1.0, t0);
        let firsts = (1..=60)
            .map(|n| t0 + Duration::from_millis(250 * n))
            .filter_map(|t| timer.tick(t))
            .filter(|event| *event == TimerEvent::Done { first_entry: true })
            .count();
        assert_eq!(firsts, 1);
    }

    #[test]
    fn stopwatch_runs_past_an_hour() {
        let t0 = Instant::now();
        let mut timer = TimerEngine::new();
        timer.start_stopwatch(t0);
        let event = timer.tick(t0 + secs(3725));
        assert_eq!(
            event,
            Some(TimerEvent::Stopwatch {
                minutes: 62,
                seconds: 5,
                second_boundary_crossed: true,
            })
        );
        assert_eq!(clock_text(62, 5), "62:05");
    }
}
