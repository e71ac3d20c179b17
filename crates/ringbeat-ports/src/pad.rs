use crate::types::{Circle, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

pub const FIELD_RADIUS: f64 = 540.0;

const RING_A_DISTANCE: f64 = 400.0;
const RING_B_DISTANCE: f64 = 210.0;
const RING_D_DISTANCE: f64 = 430.0;
const RING_E_DISTANCE: f64 = 290.0;

const RING_A_RADIUS: f64 = 90.0;
const RING_B_RADIUS: f64 = 70.0;
const RING_C_RADIUS: f64 = 85.0;
const RING_D_RADIUS: f64 = 60.0;
const RING_E_RADIUS: f64 = 60.0;

const STEP: f64 = PI / 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadRing {
    A,
    B,
    C,
    D,
    E,
}

#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Pad {
    A1, A2, A3, A4, A5, A6, A7, A8,
    B1, B2, B3, B4, B5, B6, B7, B8,
    C,
    D1, D2, D3, D4, D5, D6, D7, D8,
    E1, E2, E3, E4, E5, E6, E7, E8,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown pad label: {0:?}")]
pub struct PadParseError(pub String);

impl Pad {
    pub const COUNT: usize = 33;

    #[rustfmt::skip]
    pub const ALL: [Pad; Pad::COUNT] = [
        Pad::A1, Pad::A2, Pad::A3, Pad::A4, Pad::A5, Pad::A6, Pad::A7, Pad::A8,
        Pad::B1, Pad::B2, Pad::B3, Pad::B4, Pad::B5, Pad::B6, Pad::B7, Pad::B8,
        Pad::C,
        Pad::D1, Pad::D2, Pad::D3, Pad::D4, Pad::D5, Pad::D6, Pad::D7, Pad::D8,
        Pad::E1, Pad::E2, Pad::E3, Pad::E4, Pad::E5, Pad::E6, Pad::E7, Pad::E8,
    ];

    /// Bit index used by [`PadMask`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Pad> {
        Self::ALL.get(index).copied()
    }

    pub fn ring(self) -> PadRing {
        match self.index() {
            0..=7 => PadRing::A,
            8..=15 => PadRing::B,
            16 => PadRing::C,
            17..=24 => PadRing::D,
            _ => PadRing::E,
        }
    }

    /// Position inside the ring, 1..=8. The center pad reports 1.
    pub fn number(self) -> u8 {
        match self.ring() {
            PadRing::A => self.index() as u8 + 1,
            PadRing::B => self.index() as u8 - 7,
            PadRing::C => 1,
            PadRing::D => self.index() as u8 - 16,
            PadRing::E => self.index() as u8 - 24,
        }
    }

    pub fn from_ring(ring: PadRing, number: u8) -> Option<Pad> {
        if !(1..=8).contains(&number) {
            return None;
        }
        let offset = (number - 1) as usize;
        match ring {
            PadRing::A => Pad::from_index(offset),
            PadRing::B => Pad::from_index(8 + offset),
            PadRing::C => Some(Pad::C),
            PadRing::D => Pad::from_index(17 + offset),
            PadRing::E => Pad::from_index(25 + offset),
        }
    }

    /// Screen angle of the pad's center in radians.
    pub fn angle(self) -> f64 {
        let n = (self.number() - 1) as f64;
        match self.ring() {
            PadRing::A | PadRing::B => -3.0 * PI / 8.0 + STEP * n,
            PadRing::D | PadRing::E => -PI / 2.0 + STEP * n,
            PadRing::C => 0.0,
        }
    }

    pub fn distance_from_center(self) -> f64 {
        match self.ring() {
            PadRing::A => RING_A_DISTANCE,
            PadRing::B => RING_B_DISTANCE,
            PadRing::C => 0.0,
            PadRing::D => RING_D_DISTANCE,
            PadRing::E => RING_E_DISTANCE,
        }
    }

    /// Pad center relative to the field center.
    pub fn position(self) -> Vec2 {
        match self.ring() {
            PadRing::C => Vec2::ZERO,
            _ => Vec2::from_polar(self.distance_from_center(), self.angle()),
        }
    }

    pub fn radius(self) -> f64 {
        match self.ring() {
            PadRing::A => RING_A_RADIUS,
            PadRing::B => RING_B_RADIUS,
            PadRing::C => RING_C_RADIUS,
            PadRing::D => RING_D_RADIUS,
            PadRing::E => RING_E_RADIUS,
        }
    }

    pub fn circle(self) -> Circle {
        Circle::new(self.position(), self.radius())
    }

    /// Rotates clockwise by `steps` eighths of a turn, staying in the same ring.
    pub fn rotate(self, steps: i32) -> Pad {
        if self.ring() == PadRing::C {
            return self;
        }
        let n = (self.number() as i32 - 1 + steps).rem_euclid(8) as u8 + 1;
        Pad::from_ring(self.ring(), n).unwrap_or(self)
    }

    /// Mirrors across the vertical axis of the field.
    pub fn mirror(self) -> Pad {
        let n = self.number();
        let mirrored = match self.ring() {
            PadRing::C => return self,
            PadRing::A | PadRing::B => 9 - n,
            PadRing::D | PadRing::E => (10 - n - 1) % 8 + 1,
        };
        Pad::from_ring(self.ring(), mirrored).unwrap_or(self)
    }

    /// Clockwise distance in eighths from `self` to `other`, ignoring rings.
    pub fn clockwise_steps_to(self, other: Pad) -> u8 {
        (other.number() as i32 - self.number() as i32).rem_euclid(8) as u8
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ring() {
            PadRing::C => write!(f, "C"),
            ring => write!(f, "{:?}{}", ring, self.number()),
        }
    }
}

impl FromStr for Pad {
    type Err = PadParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let mut chars = label.chars();
        let ring = match chars.next() {
            Some('A') => PadRing::A,
            Some('B') => PadRing::B,
            Some('C') => PadRing::C,
            Some('D') => PadRing::D,
            Some('E') => PadRing::E,
            _ => return Err(PadParseError(s.to_string())),
        };
        let rest = chars.as_str();
        if ring == PadRing::C {
            // "C1" and "C2" both name the single center sensor.
            return match rest {
                "" | "1" | "2" => Ok(Pad::C),
                _ => Err(PadParseError(s.to_string())),
            };
        }
        rest.parse::<u8>()
            .ok()
            .and_then(|n| Pad::from_ring(ring, n))
            .ok_or_else(|| PadParseError(s.to_string()))
    }
}

/// One bit per [`Pad`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PadMask(pub u64);

impl PadMask {
    pub const EMPTY: PadMask = PadMask(0);

    pub fn insert(&mut self, pad: Pad) {
        self.0 |= 1 << pad.index();
    }

    pub fn remove(&mut self, pad: Pad) {
        self.0 &= !(1 << pad.index());
    }

    pub fn contains(self, pad: Pad) -> bool {
        self.0 & (1 << pad.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Pad> {
        Pad::ALL.into_iter().filter(move |pad| self.contains(*pad))
    }
}

impl FromIterator<Pad> for PadMask {
    fn from_iter<I: IntoIterator<Item = Pad>>(iter: I) -> Self {
        let mut mask = PadMask::EMPTY;
        for pad in iter {
            mask.insert(pad);
        }
        mask
    }
}
