use pretty_assertions::assert_eq;
use ringbeat_domain_chart::{Note, SlidePath, SlideShape};
use ringbeat_domain_eval::{generate_actions, ActionKind, PathGeometry, PRESS_HALF_WINDOW_TICKS};
use ringbeat_ports::pad::Pad;

fn chart() -> Vec<Note> {
    vec![
        Note::tap(1, 100, Pad::A1),
        Note::hold(2, 120, 60, Pad::A3),
        Note::slide(
            3,
            400,
            120,
            SlidePath::new(Pad::A1).then(Pad::A4, SlideShape::Clockwise),
        ),
        Note::touch(4, 400, Pad::B2),
    ]
}

#[test]
fn one_action_per_note_with_expected_windows() {
    let actions = generate_actions(&chart());
    assert_eq!(actions.len(), 4);

    let windows: Vec<(i64, i64)> = actions
        .iter()
        .map(|action| (action.start_tick, action.end_tick))
        .collect();
    assert_eq!(
        windows,
        vec![
            (100 - PRESS_HALF_WINDOW_TICKS, 100 + PRESS_HALF_WINDOW_TICKS),
            (120, 180),
            (280, 400),
            (400 - PRESS_HALF_WINDOW_TICKS, 400 + PRESS_HALF_WINDOW_TICKS),
        ]
    );
    assert!(matches!(actions[2].kind, ActionKind::SlidePath { .. }));
}

#[test]
fn generation_is_deterministic() {
    assert_eq!(generate_actions(&chart()), generate_actions(&chart()));
}

#[test]
fn slide_endpoints_are_exact() {
    let actions = generate_actions(&chart());
    let slide = &actions[2];

    let start = slide.sample(slide.start_tick as f64).expect("active at start");
    let end = slide.sample(slide.end_tick as f64).expect("active at end");

    assert_eq!(start.center, Pad::A1.position());
    assert_eq!(start.radius, Pad::A1.radius());
    assert_eq!(end.center, Pad::A4.position());
    assert_eq!(end.radius, Pad::A4.radius());
    assert_eq!(slide.sample(slide.end_tick as f64 + 0.5), None);
}

#[test]
fn clockwise_arc_stays_on_the_ring() {
    let path = SlidePath::new(Pad::A1).then(Pad::A3, SlideShape::Clockwise);
    let geometry = PathGeometry::from_path(&path);
    let mid = geometry.sample(0.5);

    assert!((mid.center.length() - Pad::A1.distance_from_center()).abs() < 1e-6);
    // halfway between A1 and A3 is where A2 sits
    assert!(mid.center.distance(Pad::A2.position()) < 1e-6);
}

#[test]
fn short_arc_goes_the_short_way() {
    let path = SlidePath::new(Pad::A1).then(Pad::A7, SlideShape::ShortArc);
    let geometry = PathGeometry::from_path(&path);
    let mid = geometry.sample(0.5);
    assert!(mid.center.distance(Pad::A8.position()) < 1e-6);
}

#[test]
fn via_center_passes_through_the_middle() {
    let path = SlidePath::new(Pad::A1).then(Pad::A3, SlideShape::ViaCenter);
    let geometry = PathGeometry::from_path(&path);
    let mid = geometry.sample(0.5);
    assert!(mid.center.length() < 1e-6);
}

#[test]
fn interpolation_is_monotonic_in_arc_length() {
    let path = SlidePath::new(Pad::A1)
        .then(Pad::A5, SlideShape::Straight)
        .then(Pad::A7, SlideShape::Clockwise);
    let geometry = PathGeometry::from_path(&path);

    let mut travelled = 0.0;
    let mut prev = geometry.sample(0.0).center;
    for step in 1..=100 {
        let next = geometry.sample(step as f64 / 100.0).center;
        travelled += prev.distance(next);
        prev = next;
    }
    // chords undershoot arcs slightly, never overshoot
    assert!(travelled <= geometry.length() + 1e-6);
    assert!(travelled > geometry.length() * 0.99);
}

#[test]
fn slide_touches_pads_along_its_route() {
    let actions = generate_actions(&[Note::slide(
        1,
        200,
        100,
        SlidePath::new(Pad::A1).then(Pad::A5, SlideShape::Straight),
    )]);
    let slide = &actions[0];

    assert!(slide.touched_pads(100.0).contains(Pad::A1));
    assert!(slide.touched_pads(150.0).contains(Pad::C));
    assert!(slide.touched_pads(200.0).contains(Pad::A5));
    assert!(slide.touched_pads(201.0).is_empty());
}
