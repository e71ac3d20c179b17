use ringbeat_ports::types::{TickF, JUDGE_TPS};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
    Paused,
}

/// Converts a monotonic wall clock into judgment-tick deltas.
#[derive(Clone, Debug)]
pub struct TickClock {
    state: ClockState,
    ticks_per_second: f64,
    rate_multiplier: f64,
    last: Option<Instant>,
}

impl TickClock {
    pub fn new(ticks_per_second: f64) -> Self {
        Self {
            state: ClockState::Stopped,
            ticks_per_second,
            rate_multiplier: 1.0,
            last: None,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn start(&mut self, now: Instant) {
        self.state = ClockState::Running;
        self.last = Some(now);
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    /// Time spent paused is never handed to the engine.
    pub fn resume(&mut self, now: Instant) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
            self.last = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.last = None;
    }

    pub fn set_rate_multiplier(&mut self, multiplier: f64) {
        self.rate_multiplier = multiplier.max(0.1);
    }

    pub fn rate_multiplier(&self) -> f64 {
        self.rate_multiplier
    }

    /// Ticks elapsed since the previous call. Zero unless running.
    pub fn elapsed_ticks(&mut self, now: Instant) -> TickF {
        if self.state != ClockState::Running {
            return 0.0;
        }
        let Some(last) = self.last.replace(now) else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(last);
        duration_to_ticks(elapsed, self.ticks_per_second) * self.rate_multiplier
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(JUDGE_TPS)
    }
}

pub fn duration_to_ticks(elapsed: Duration, ticks_per_second: f64) -> TickF {
    elapsed.as_secs_f64() * ticks_per_second
}

pub fn ticks_to_seconds(ticks: TickF) -> f64 {
    ticks / JUDGE_TPS
}

/// `mm:ss.ss`, with a leading minus during pre-roll.
pub fn format_timer(ticks: TickF) -> String {
    let seconds = ticks_to_seconds(ticks);
    let sign = if seconds < 0.0 { "-" } else { "" };
    let abs = seconds.abs();
    let minutes = (abs / 60.0).floor();
    let rest = abs - minutes * 60.0;
    format!("{sign}{:02}:{:05.2}", minutes as u64, rest)
}
