use crate::action::Action;
use crate::slide_path::PathGeometry;
use ringbeat_domain_chart::{Note, NoteKind, NoteTarget};
use ringbeat_ports::types::Tick;

/// Half-width of the press flash drawn around a tap's hit point.
pub const PRESS_HALF_WINDOW_TICKS: Tick = 6;

/// Derives presentation actions from a chart. Pure; identical input gives identical output.
pub fn generate_actions(notes: &[Note]) -> Vec<Action> {
    let mut actions: Vec<Action> = notes.iter().filter_map(action_for_note).collect();
    // stable: equal start ticks keep chart order
    actions.sort_by_key(|action| action.start_tick);
    actions
}

fn action_for_note(note: &Note) -> Option<Action> {
    let tick = note.target_tick;
    match (note.kind, &note.target) {
        (NoteKind::Tap | NoteKind::Touch, NoteTarget::Pad(pad)) => Some(Action::press(
            *pad,
            tick - PRESS_HALF_WINDOW_TICKS,
            tick + PRESS_HALF_WINDOW_TICKS,
        )),
        (NoteKind::Hold, NoteTarget::Pad(pad)) => {
            Some(Action::press(*pad, tick, tick + note.duration_ticks))
        }
        (NoteKind::Slide, NoteTarget::Path(path)) => Some(Action::slide(
            PathGeometry::from_path(path),
            tick - note.duration_ticks,
            tick,
        )),
        // rejected by validation; nothing sensible to draw
        _ => None,
    }
}
