use ringbeat_domain_chart::{Chart, JudgeTier};
use ringbeat_ports::input::InputSource;
use ringbeat_ports::storage::SettingsDto;
use ringbeat_ports::types::TickF;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ChartSource {
    File(String),
    Inline(Chart),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    LoadChart { source: ChartSource },
    Start,
    Pause,
    Resume,
    /// Reloads the current chart from the top.
    Restart,
    SetInputSource { source: InputSource },
    SetJudgeOffsetMs { ms: i32 },
    SetRateMultiplier { x: f64 },
    ExportDiagnostics { path: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Ready,
    Running,
    Paused,
    Finished,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    SessionStateUpdated { state: SessionState, settings: SettingsDto },
    /// Pre-roll ended; audio should start now.
    PlaybackStarted { timer: TickF },
    NoteJudged {
        note_id: u64,
        tier: JudgeTier,
        offset_ticks: Option<f64>,
        is_break: bool,
    },
    TouchGroupFeedback {
        group_id: u32,
        judged: usize,
        members: usize,
        tier: Option<JudgeTier>,
    },
    ScoreSummaryUpdated { combo: u32, score: i64, accuracy: f64 },
}
