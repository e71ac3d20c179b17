use crate::slide_path::PathGeometry;
use ringbeat_ports::pad::{Pad, PadMask};
use ringbeat_ports::types::{Circle, Tick, TickF};

#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    Press { pad: Pad },
    SlidePath { geometry: PathGeometry },
}

/// Presentation-only gesture derived from a note. Never consulted for scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    pub start_tick: Tick,
    pub end_tick: Tick,
}

impl Action {
    pub fn press(pad: Pad, start_tick: Tick, end_tick: Tick) -> Self {
        Self {
            kind: ActionKind::Press { pad },
            start_tick,
            end_tick,
        }
    }

    pub fn slide(geometry: PathGeometry, start_tick: Tick, end_tick: Tick) -> Self {
        Self {
            kind: ActionKind::SlidePath { geometry },
            start_tick,
            end_tick,
        }
    }

    pub fn is_active_at(&self, timer: TickF) -> bool {
        self.start_tick as f64 <= timer && timer <= self.end_tick as f64
    }

    pub fn is_expired_at(&self, timer: TickF) -> bool {
        timer > self.end_tick as f64
    }

    /// Center and radius at `timer`, or `None` outside the action's window.
    pub fn sample(&self, timer: TickF) -> Option<Circle> {
        if !self.is_active_at(timer) {
            return None;
        }
        match &self.kind {
            ActionKind::Press { pad } => Some(pad.circle()),
            ActionKind::SlidePath { geometry } => {
                let span = (self.end_tick - self.start_tick) as f64;
                let fraction = if span > 0.0 {
                    (timer - self.start_tick as f64) / span
                } else {
                    1.0
                };
                Some(geometry.sample(fraction))
            }
        }
    }

    /// Pads an automatic player would be touching at `timer`.
    pub fn touched_pads(&self, timer: TickF) -> PadMask {
        let Some(circle) = self.sample(timer) else {
            return PadMask::EMPTY;
        };
        match &self.kind {
            ActionKind::Press { pad } => [*pad].into_iter().collect(),
            ActionKind::SlidePath { .. } => Pad::ALL
                .into_iter()
                .filter(|pad| pad.circle().contains(circle.center))
                .collect(),
        }
    }
}
