//! Slide path geometry.
//!
//! A path is a chain of segments, each either a straight line or a sweep
//! around the field center. Sampling is by arc length, so a slide moves at
//! constant speed along its drawn shape rather than hop by hop.

use ringbeat_domain_chart::{SlidePath, SlideShape};
use ringbeat_ports::pad::Pad;
use ringbeat_ports::types::{Circle, Vec2};
use std::f64::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq)]
enum SegmentShape {
    Line,
    /// Sweep around the field center. Positive sweep is clockwise on screen.
    Arc {
        start_angle: f64,
        sweep: f64,
        start_distance: f64,
        end_distance: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    from: Vec2,
    to: Vec2,
    from_radius: f64,
    to_radius: f64,
    shape: SegmentShape,
    length: f64,
}

impl Segment {
    fn line(from: Vec2, from_radius: f64, to: Vec2, to_radius: f64) -> Self {
        Self {
            from,
            to,
            from_radius,
            to_radius,
            shape: SegmentShape::Line,
            length: from.distance(to),
        }
    }

    fn arc(from: Pad, to: Pad, sweep: f64) -> Self {
        let start_distance = from.distance_from_center();
        let end_distance = to.distance_from_center();
        let mean = (start_distance + end_distance) / 2.0;
        let length = (sweep * mean).hypot(end_distance - start_distance);
        Self {
            from: from.position(),
            to: to.position(),
            from_radius: from.radius(),
            to_radius: to.radius(),
            shape: SegmentShape::Arc {
                start_angle: from.angle(),
                sweep,
                start_distance,
                end_distance,
            },
            length,
        }
    }

    fn point(&self, t: f64) -> Vec2 {
        if t <= 0.0 {
            return self.from;
        }
        if t >= 1.0 {
            return self.to;
        }
        match self.shape {
            SegmentShape::Line => self.from.lerp(self.to, t),
            SegmentShape::Arc {
                start_angle,
                sweep,
                start_distance,
                end_distance,
            } => {
                let distance = start_distance + (end_distance - start_distance) * t;
                Vec2::from_polar(distance, start_angle + sweep * t)
            }
        }
    }

    fn radius(&self, t: f64) -> f64 {
        self.from_radius + (self.to_radius - self.from_radius) * t.clamp(0.0, 1.0)
    }
}

fn clockwise_sweep(from: Pad, to: Pad) -> f64 {
    let sweep = (to.angle() - from.angle()).rem_euclid(TAU);
    if sweep < 1e-9 {
        TAU
    } else {
        sweep
    }
}

fn counter_clockwise_sweep(from: Pad, to: Pad) -> f64 {
    -clockwise_sweep(to, from)
}

fn hop_segments(from: Pad, to: Pad, shape: SlideShape) -> Vec<Segment> {
    let centered = from == Pad::C || to == Pad::C;
    match shape {
        SlideShape::Straight => vec![Segment::line(
            from.position(),
            from.radius(),
            to.position(),
            to.radius(),
        )],
        _ if centered => hop_segments(from, to, SlideShape::Straight),
        SlideShape::Clockwise => vec![Segment::arc(from, to, clockwise_sweep(from, to))],
        SlideShape::CounterClockwise => {
            vec![Segment::arc(from, to, counter_clockwise_sweep(from, to))]
        }
        SlideShape::ShortArc => {
            let cw = clockwise_sweep(from, to);
            let sweep = if cw <= PI {
                cw
            } else {
                counter_clockwise_sweep(from, to)
            };
            vec![Segment::arc(from, to, sweep)]
        }
        SlideShape::ViaCenter => vec![
            Segment::line(from.position(), from.radius(), Pad::C.position(), Pad::C.radius()),
            Segment::line(Pad::C.position(), Pad::C.radius(), to.position(), to.radius()),
        ],
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathGeometry {
    start: Vec2,
    start_radius: f64,
    end: Vec2,
    end_radius: f64,
    segments: Vec<Segment>,
    total_length: f64,
}

impl PathGeometry {
    pub fn from_path(path: &SlidePath) -> Self {
        let mut segments = Vec::new();
        let mut from = path.start;
        for hop in &path.hops {
            segments.extend(hop_segments(from, hop.to, hop.shape));
            from = hop.to;
        }
        let end = path.end();
        let total_length = segments.iter().map(|segment| segment.length).sum();
        Self {
            start: path.start.position(),
            start_radius: path.start.radius(),
            end: end.position(),
            end_radius: end.radius(),
            segments,
            total_length,
        }
    }

    pub fn length(&self) -> f64 {
        self.total_length
    }

    pub fn start(&self) -> Circle {
        Circle::new(self.start, self.start_radius)
    }

    pub fn end(&self) -> Circle {
        Circle::new(self.end, self.end_radius)
    }

    /// Position and radius after `fraction` of the path has been traced.
    /// Both endpoints are returned exactly.
    pub fn sample(&self, fraction: f64) -> Circle {
        if fraction <= 0.0 || self.total_length <= 0.0 {
            return self.start();
        }
        if fraction >= 1.0 {
            return self.end();
        }

        let mut remaining = fraction * self.total_length;
        for segment in &self.segments {
            if remaining <= segment.length {
                let t = if segment.length > 0.0 {
                    remaining / segment.length
                } else {
                    0.0
                };
                return Circle::new(segment.point(t), segment.radius(t));
            }
            remaining -= segment.length;
        }
        self.end()
    }
}
