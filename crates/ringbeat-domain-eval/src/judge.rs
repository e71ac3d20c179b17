use ringbeat_domain_chart::{JudgeTier, Judgement, NoteKind};
use ringbeat_ports::input::InputSource;
use ringbeat_ports::storage::{SettingsDto, WindowOverride};
use ringbeat_ports::types::{Tick, JUDGE_TPS};
use serde::{Deserialize, Serialize};

/// Symmetric tolerance windows in ticks, checked tightest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingWindows {
    pub perfect: Tick,
    pub great: Tick,
    pub good: Tick,
}

impl TimingWindows {
    pub const TAP: TimingWindows = TimingWindows {
        perfect: 6,
        great: 12,
        good: 18,
    };

    pub const SLIDE: TimingWindows = TimingWindows {
        perfect: 24,
        great: 42,
        good: 60,
    };

    /// Finest tier whose window contains `offset`, or `None` when outside every window.
    pub fn grade(&self, offset: f64) -> Option<JudgeTier> {
        let delta = offset.abs();
        if delta <= self.perfect as f64 {
            Some(JudgeTier::Perfect)
        } else if delta <= self.great as f64 {
            Some(JudgeTier::Great)
        } else if delta <= self.good as f64 {
            Some(JudgeTier::Good)
        } else {
            None
        }
    }

    /// A note with no qualifying input is a Miss once the timer passes `target + miss_window`.
    pub fn miss_window(&self) -> Tick {
        self.perfect.max(self.great).max(self.good)
    }

    pub fn judge(&self, offset: f64) -> Judgement {
        match self.grade(offset) {
            Some(tier) => Judgement {
                tier,
                offset_ticks: Some(offset),
            },
            None => Judgement {
                tier: JudgeTier::Miss,
                offset_ticks: Some(offset),
            },
        }
    }
}

impl From<WindowOverride> for TimingWindows {
    fn from(w: WindowOverride) -> Self {
        Self {
            perfect: w.perfect,
            great: w.great,
            good: w.good,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JudgeConfig {
    pub tap: TimingWindows,
    pub slide: TimingWindows,
    pub lookahead_ticks: Tick,
    pub lead_in_ticks: Tick,
    /// Added to every input before grading, in ticks.
    pub judge_offset_ticks: Tick,
    pub input_source: InputSource,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            tap: TimingWindows::TAP,
            slide: TimingWindows::SLIDE,
            lookahead_ticks: 120,
            lead_in_ticks: 240,
            judge_offset_ticks: 0,
            input_source: InputSource::Simulated,
        }
    }
}

impl JudgeConfig {
    pub fn from_settings(settings: &SettingsDto) -> Self {
        let defaults = Self::default();
        Self {
            tap: settings.tap_window.map(Into::into).unwrap_or(defaults.tap),
            slide: settings.slide_window.map(Into::into).unwrap_or(defaults.slide),
            lookahead_ticks: settings.lookahead_ticks.max(0),
            lead_in_ticks: settings.lead_in_ticks.max(0),
            judge_offset_ticks: ms_to_ticks(settings.judge_offset_ms),
            input_source: settings.input_source,
        }
    }

    pub fn windows_for(&self, kind: NoteKind) -> &TimingWindows {
        match kind {
            NoteKind::Slide => &self.slide,
            NoteKind::Tap | NoteKind::Hold | NoteKind::Touch => &self.tap,
        }
    }
}

pub fn ms_to_ticks(ms: i32) -> Tick {
    (ms as f64 * JUDGE_TPS / 1000.0).round() as Tick
}

pub const BREAK_MULTIPLIER: i64 = 5;

pub fn tier_points(tier: JudgeTier) -> i64 {
    match tier {
        JudgeTier::Perfect => 100,
        JudgeTier::Great => 80,
        JudgeTier::Good => 50,
        JudgeTier::Miss => 0,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeStats {
    pub counts: [u32; 4],
    pub combo: u32,
    pub max_combo: u32,
    pub breaks: u32,
    pub early: u32,
    pub late: u32,
    pub score: i64,
}

impl JudgeStats {
    pub fn record(&mut self, judgement: Judgement, is_break: bool) {
        let tier = judgement.tier;
        self.counts[tier as usize] += 1;

        if tier == JudgeTier::Miss {
            self.combo = 0;
        } else {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            match judgement.offset_ticks {
                Some(offset) if offset < 0.0 && tier != JudgeTier::Perfect => self.early += 1,
                Some(offset) if offset > 0.0 && tier != JudgeTier::Perfect => self.late += 1,
                _ => {}
            }
        }

        let mut points = tier_points(tier);
        if is_break {
            self.breaks += 1;
            points *= BREAK_MULTIPLIER;
        }
        self.score += points;
    }

    pub fn count(&self, tier: JudgeTier) -> u32 {
        self.counts[tier as usize]
    }

    pub fn judged(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Fraction of the best possible score for the notes judged so far.
    pub fn accuracy(&self, max_score: i64) -> f64 {
        if max_score <= 0 {
            return 0.0;
        }
        self.score as f64 / max_score as f64
    }
}
