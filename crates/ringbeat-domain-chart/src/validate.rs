use crate::model::{touch_groups, Note, NoteKind, NoteTarget};
use ringbeat_ports::pad::PadRing;
use ringbeat_ports::types::Tick;
use std::collections::HashSet;

/// Largest tick magnitude a chart may use, a few centuries at 120 ticks per second.
pub const MAX_CHART_TICK: Tick = 1 << 40;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("note {id} at index {index} is earlier than the note before it")]
    NotSorted { index: usize, id: u64 },
    #[error("note {id} has negative duration {duration}")]
    NegativeDuration { id: u64, duration: Tick },
    #[error("note {id} needs a positive duration")]
    MissingDuration { id: u64 },
    #[error("unknown pad id: {0}")]
    UnknownPad(String),
    #[error("note {id}: {kind:?} cannot target {target}")]
    TargetMismatch {
        id: u64,
        kind: NoteKind,
        target: String,
    },
    #[error("note {id} has an empty slide path")]
    EmptySlidePath { id: u64 },
    #[error("duplicate note id {0}")]
    DuplicateId(u64),
    #[error("touch group {group}: note {id} at tick {tick}, group expects {expected}")]
    GroupTickMismatch {
        group: u32,
        id: u64,
        tick: Tick,
        expected: Tick,
    },
    #[error("note {id}: tick {tick} is outside ±2^40")]
    TickOutOfRange { id: u64, tick: Tick },
    #[error("note {id} was loaded with judge state already set")]
    AlreadyJudged { id: u64 },
}

/// Checks everything the engine relies on. Runs before any engine state is touched.
pub fn validate_notes(notes: &[Note]) -> Result<(), LoadError> {
    let mut ids = HashSet::with_capacity(notes.len());
    let mut prev_tick: Option<Tick> = None;

    for (index, note) in notes.iter().enumerate() {
        if !ids.insert(note.id) {
            return Err(LoadError::DuplicateId(note.id));
        }
        if let Some(prev) = prev_tick {
            if note.target_tick < prev {
                return Err(LoadError::NotSorted { index, id: note.id });
            }
        }
        prev_tick = Some(note.target_tick);

        for tick in [note.target_tick, note.duration_ticks] {
            if !(-MAX_CHART_TICK..=MAX_CHART_TICK).contains(&tick) {
                return Err(LoadError::TickOutOfRange { id: note.id, tick });
            }
        }
        if note.duration_ticks < 0 {
            return Err(LoadError::NegativeDuration {
                id: note.id,
                duration: note.duration_ticks,
            });
        }
        if note.judge_state.is_judged() {
            return Err(LoadError::AlreadyJudged { id: note.id });
        }

        validate_target(note)?;
    }

    for group in touch_groups(notes) {
        for &idx in &group.members {
            let note = &notes[idx];
            if note.target_tick != group.target_tick {
                return Err(LoadError::GroupTickMismatch {
                    group: group.id,
                    id: note.id,
                    tick: note.target_tick,
                    expected: group.target_tick,
                });
            }
        }
    }

    Ok(())
}

fn validate_target(note: &Note) -> Result<(), LoadError> {
    let mismatch = |target: String| LoadError::TargetMismatch {
        id: note.id,
        kind: note.kind,
        target,
    };

    match (note.kind, &note.target) {
        (NoteKind::Tap | NoteKind::Hold, NoteTarget::Pad(pad)) => {
            if pad.ring() != PadRing::A {
                return Err(mismatch(pad.to_string()));
            }
        }
        (NoteKind::Touch, NoteTarget::Pad(_)) => {}
        (NoteKind::Slide, NoteTarget::Path(path)) => {
            if path.hops.is_empty() {
                return Err(LoadError::EmptySlidePath { id: note.id });
            }
        }
        (_, NoteTarget::Pad(pad)) => return Err(mismatch(pad.to_string())),
        (_, NoteTarget::Path(_)) => return Err(mismatch("a slide path".to_string())),
    }

    match note.kind {
        NoteKind::Hold | NoteKind::Slide if note.duration_ticks == 0 => {
            Err(LoadError::MissingDuration { id: note.id })
        }
        _ => Ok(()),
    }
}
