use ringbeat_ports::pad::Pad;
use ringbeat_ports::types::Tick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    Tap,
    Hold,
    Slide,
    Touch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFlags {
    pub is_break: bool,
    /// Tap drawn as a star, usually the head of a slide.
    pub star: bool,
    /// Shares its tick with another note.
    pub each: bool,
}

/// Ordered from best to worst so `max` picks the worst tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JudgeTier {
    Perfect,
    Great,
    Good,
    Miss,
}

impl JudgeTier {
    pub const ALL: [JudgeTier; 4] = [
        JudgeTier::Perfect,
        JudgeTier::Great,
        JudgeTier::Good,
        JudgeTier::Miss,
    ];

    /// One step worse, saturating at Miss.
    pub fn degrade(self) -> JudgeTier {
        match self {
            JudgeTier::Perfect => JudgeTier::Great,
            JudgeTier::Great => JudgeTier::Good,
            JudgeTier::Good | JudgeTier::Miss => JudgeTier::Miss,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub tier: JudgeTier,
    /// `timer - target_tick` at the qualifying input. `None` for misses without input.
    pub offset_ticks: Option<f64>,
}

impl Judgement {
    pub fn miss() -> Self {
        Self {
            tier: JudgeTier::Miss,
            offset_ticks: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum JudgeState {
    #[default]
    Pending,
    Active,
    Judged(Judgement),
}

impl JudgeState {
    pub fn is_judged(&self) -> bool {
        matches!(self, JudgeState::Judged(_))
    }

    pub fn judgement(&self) -> Option<Judgement> {
        match self {
            JudgeState::Judged(judgement) => Some(*judgement),
            JudgeState::Pending | JudgeState::Active => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideShape {
    /// `-`
    Straight,
    /// `>`, around the field center
    Clockwise,
    /// `<`, around the field center
    CounterClockwise,
    /// `^`, whichever arc direction is shorter
    ShortArc,
    /// `v`
    ViaCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideHop {
    pub to: Pad,
    pub shape: SlideShape,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePath {
    pub start: Pad,
    pub hops: Vec<SlideHop>,
}

impl SlidePath {
    pub fn new(start: Pad) -> Self {
        Self {
            start,
            hops: Vec::new(),
        }
    }

    pub fn then(mut self, to: Pad, shape: SlideShape) -> Self {
        self.hops.push(SlideHop { to, shape });
        self
    }

    pub fn pads(&self) -> impl Iterator<Item = Pad> + '_ {
        std::iter::once(self.start).chain(self.hops.iter().map(|hop| hop.to))
    }

    pub fn end(&self) -> Pad {
        self.hops.last().map(|hop| hop.to).unwrap_or(self.start)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteTarget {
    Pad(Pad),
    Path(SlidePath),
}

impl NoteTarget {
    /// The pad a press or hold is expected on, or where a slide begins.
    pub fn primary_pad(&self) -> Pad {
        match self {
            NoteTarget::Pad(pad) => *pad,
            NoteTarget::Path(path) => path.start,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub kind: NoteKind,
    pub target_tick: Tick,
    pub duration_ticks: Tick,
    pub target: NoteTarget,
    pub flags: NoteFlags,
    pub touch_group: Option<u32>,
    #[serde(default)]
    pub judge_state: JudgeState,
}

impl Note {
    fn with_target(
        id: u64,
        kind: NoteKind,
        target_tick: Tick,
        duration_ticks: Tick,
        target: NoteTarget,
    ) -> Self {
        Self {
            id,
            kind,
            target_tick,
            duration_ticks,
            target,
            flags: NoteFlags::default(),
            touch_group: None,
            judge_state: JudgeState::Pending,
        }
    }

    pub fn tap(id: u64, target_tick: Tick, pad: Pad) -> Self {
        Self::with_target(id, NoteKind::Tap, target_tick, 0, NoteTarget::Pad(pad))
    }

    pub fn hold(id: u64, target_tick: Tick, duration_ticks: Tick, pad: Pad) -> Self {
        let target = NoteTarget::Pad(pad);
        Self::with_target(id, NoteKind::Hold, target_tick, duration_ticks, target)
    }

    pub fn touch(id: u64, target_tick: Tick, pad: Pad) -> Self {
        Self::with_target(id, NoteKind::Touch, target_tick, 0, NoteTarget::Pad(pad))
    }

    /// `target_tick` is where tracing must finish; tracing starts `duration_ticks` earlier.
    pub fn slide(id: u64, target_tick: Tick, duration_ticks: Tick, path: SlidePath) -> Self {
        let target = NoteTarget::Path(path);
        Self::with_target(id, NoteKind::Slide, target_tick, duration_ticks, target)
    }

    pub fn with_flags(mut self, flags: NoteFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn in_group(mut self, group: u32) -> Self {
        self.touch_group = Some(group);
        self
    }

    /// Tick at which the note resolves when nobody plays it.
    pub fn judge_tick(&self) -> Tick {
        match self.kind {
            NoteKind::Hold => self.target_tick.saturating_add(self.duration_ticks),
            NoteKind::Tap | NoteKind::Slide | NoteKind::Touch => self.target_tick,
        }
    }

    pub fn slide_path(&self) -> Option<&SlidePath> {
        match &self.target {
            NoteTarget::Path(path) => Some(path),
            NoteTarget::Pad(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchGroup {
    pub id: u32,
    pub target_tick: Tick,
    /// Indices into the chart's note list, in chart order.
    pub members: Vec<usize>,
}

impl TouchGroup {
    /// Worst tier among judged members, if any member has been judged.
    pub fn feedback_tier(&self, notes: &[Note]) -> Option<JudgeTier> {
        self.members
            .iter()
            .filter_map(|&idx| notes.get(idx))
            .filter_map(|note| note.judge_state.judgement())
            .map(|judgement| judgement.tier)
            .max()
    }

    pub fn judged_count(&self, notes: &[Note]) -> usize {
        self.members
            .iter()
            .filter_map(|&idx| notes.get(idx))
            .filter(|note| note.judge_state.is_judged())
            .count()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartMeta {
    pub title: Option<String>,
    /// Pre-roll before the first note; falls back to the engine default.
    pub lead_in_ticks: Option<Tick>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub meta: ChartMeta,
    pub notes: Vec<Note>,
}

impl Chart {
    pub fn new(meta: ChartMeta, notes: Vec<Note>) -> Self {
        Self { meta, notes }
    }

    pub fn touch_groups(&self) -> Vec<TouchGroup> {
        touch_groups(&self.notes)
    }

    pub fn first_tick(&self) -> Option<Tick> {
        self.notes.iter().map(|note| note.target_tick).min()
    }

    pub fn last_tick(&self) -> Option<Tick> {
        self.notes.iter().map(|note| note.judge_tick()).max()
    }
}

pub fn touch_groups(notes: &[Note]) -> Vec<TouchGroup> {
    let mut groups: BTreeMap<u32, TouchGroup> = BTreeMap::new();
    for (idx, note) in notes.iter().enumerate() {
        let Some(group) = note.touch_group else {
            continue;
        };
        groups
            .entry(group)
            .or_insert_with(|| TouchGroup {
                id: group,
                target_tick: note.target_tick,
                members: Vec::new(),
            })
            .members
            .push(idx);
    }
    groups.into_values().collect()
}
