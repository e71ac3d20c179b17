use pretty_assertions::assert_eq;
use ringbeat_core::JudgeManager;
use ringbeat_domain_chart::{
    JudgeState, JudgeTier, Judgement, LoadError, Note, SlidePath, SlideShape,
};
use ringbeat_domain_eval::{generate_actions, JudgeConfig, TimingWindows};
use ringbeat_ports::input::{InputSource, PadInput};
use ringbeat_ports::pad::Pad;

fn config(input_source: InputSource) -> JudgeConfig {
    JudgeConfig {
        tap: TimingWindows {
            perfect: 5,
            great: 15,
            good: 30,
        },
        slide: TimingWindows {
            perfect: 10,
            great: 30,
            good: 60,
        },
        lookahead_ticks: 120,
        lead_in_ticks: 240,
        judge_offset_ticks: 0,
        input_source,
    }
}

fn loaded(notes: Vec<Note>, input_source: InputSource) -> JudgeManager {
    loaded_with(config(input_source), notes)
}

fn loaded_with(config: JudgeConfig, notes: Vec<Note>) -> JudgeManager {
    let mut engine = JudgeManager::new(config);
    let actions = generate_actions(&notes);
    engine.load_chart(notes, actions).expect("chart loads");
    engine
}

fn advance_to(engine: &mut JudgeManager, tick: f64) {
    let delta = tick - engine.timer();
    engine.tick(delta);
}

fn tier_of(note: &Note) -> Option<JudgeTier> {
    note.judge_state.judgement().map(|judgement| judgement.tier)
}

fn active_ids(engine: &JudgeManager) -> Vec<u64> {
    engine.active_notes().map(|note| note.id).collect()
}

#[test]
fn load_starts_timer_in_pre_roll() {
    let engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);
    assert_eq!(engine.timer(), -140.0);
    assert_eq!(active_ids(&engine), Vec::<u64>::new());
    assert_eq!(engine.notes()[0].judge_state, JudgeState::Pending);
}

#[test]
fn matching_input_near_target_is_perfect() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 102.0);
    assert_eq!(active_ids(&engine), vec![1]);

    let report = engine.apply_input(PadInput::press(Pad::A1));

    assert_eq!(report.judged, 1);
    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Perfect));
    assert_eq!(
        finished[0].judge_state.judgement().and_then(|j| j.offset_ticks),
        Some(2.0)
    );
    assert_eq!(active_ids(&engine), Vec::<u64>::new());
}

#[test]
fn press_on_the_wrong_pad_does_nothing() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 100.0);
    engine.apply_input(PadInput::press(Pad::A2));
    assert_eq!(engine.finished_notes().len(), 0);
    assert_eq!(active_ids(&engine), vec![1]);
}

#[test]
fn no_input_becomes_miss_after_window() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);

    advance_to(&mut engine, 130.0);
    assert_eq!(engine.finished_notes().len(), 0);

    engine.tick(1.0);
    assert_eq!(engine.timer(), 131.0);
    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Miss));
    assert_eq!(engine.stats().count(JudgeTier::Miss), 1);
}

#[test]
fn late_press_grades_great_then_good() {
    let mut engine = loaded(
        vec![Note::tap(1, 100, Pad::A1), Note::tap(2, 200, Pad::A2)],
        InputSource::Live,
    );
    advance_to(&mut engine, 112.0);
    engine.apply_input(PadInput::press(Pad::A1));
    advance_to(&mut engine, 175.0);
    engine.apply_input(PadInput::press(Pad::A2));

    let tiers: Vec<_> = engine.finished_notes().iter().map(tier_of).collect();
    assert_eq!(tiers, vec![Some(JudgeTier::Great), Some(JudgeTier::Good)]);
}

#[test]
fn one_press_consumes_one_note() {
    let mut engine = loaded(
        vec![Note::tap(1, 100, Pad::A1), Note::tap(2, 110, Pad::A1)],
        InputSource::Live,
    );
    advance_to(&mut engine, 104.0);
    engine.apply_input(PadInput::press(Pad::A1));

    let ids: Vec<u64> = engine.finished_notes().iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(active_ids(&engine), vec![2]);
}

#[test]
fn states_move_pending_active_judged() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);

    advance_to(&mut engine, -21.0);
    assert_eq!(engine.notes()[0].judge_state, JudgeState::Pending);

    advance_to(&mut engine, -20.0);
    assert_eq!(engine.notes()[0].judge_state, JudgeState::Active);

    advance_to(&mut engine, 131.0);
    assert!(engine.notes()[0].judge_state.is_judged());
}

#[test]
fn every_note_is_seen_active_before_judged() {
    let notes = vec![
        Note::tap(1, 0, Pad::A1),
        Note::touch(2, 30, Pad::B4),
        Note::hold(3, 60, 40, Pad::A3),
        Note::slide(
            4,
            200,
            80,
            SlidePath::new(Pad::A3).then(Pad::A6, SlideShape::CounterClockwise),
        ),
    ];
    let mut engine = loaded(notes, InputSource::Simulated);
    let mut seen_active = [false; 4];

    while !engine.is_complete() {
        engine.tick(1.0);
        for note in engine.active_notes() {
            seen_active[(note.id - 1) as usize] = true;
        }
    }

    assert_eq!(seen_active, [true; 4]);
    assert!(engine.notes().iter().all(|note| note.judge_state.is_judged()));
}

#[test]
fn zero_and_negative_ticks_change_nothing() {
    let mut engine = loaded(
        vec![Note::tap(1, 100, Pad::A1), Note::tap(2, 140, Pad::A2)],
        InputSource::Live,
    );
    advance_to(&mut engine, 135.0);
    let timer = engine.timer();
    let active = active_ids(&engine);
    let finished = engine.finished_notes().to_vec();

    for _ in 0..10 {
        engine.tick(0.0);
    }
    engine.tick(-3.0);

    assert_eq!(engine.timer(), timer);
    assert_eq!(active_ids(&engine), active);
    assert_eq!(engine.finished_notes(), finished.as_slice());
}

#[test]
fn non_finite_tick_is_ignored() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 50.0);

    let report = engine.tick(f64::NAN);
    engine.tick(f64::INFINITY);

    assert_eq!(report.judged, 0);
    assert_eq!(engine.timer(), 50.0);
    assert_eq!(active_ids(&engine), vec![1]);
}

#[test]
fn finished_notes_accumulate_until_cleared() {
    let mut engine = loaded(
        vec![Note::tap(1, 100, Pad::A1), Note::tap(2, 110, Pad::A2)],
        InputSource::Live,
    );

    advance_to(&mut engine, 131.0);
    assert_eq!(engine.finished_notes().len(), 1);

    advance_to(&mut engine, 141.0);
    let ids: Vec<u64> = engine.finished_notes().iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![1, 2]);

    engine.clear_finished_notes();
    assert!(engine.finished_notes().is_empty());
    engine.tick(5.0);
    assert!(engine.finished_notes().is_empty());
}

#[test]
fn one_tick_can_activate_and_judge_many_notes_in_chart_order() {
    let mut engine = loaded(
        vec![
            Note::tap(1, 100, Pad::A1),
            Note::tap(2, 100, Pad::A5),
            Note::tap(3, 110, Pad::A2),
        ],
        InputSource::Simulated,
    );

    let report = engine.tick(400.0);

    assert_eq!(report.activated, 3);
    assert_eq!(report.judged, 3);
    let ids: Vec<u64> = engine.finished_notes().iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(engine.stats().count(JudgeTier::Perfect), 3);
}

#[test]
fn equal_ticks_miss_in_chart_order() {
    let mut engine = loaded(
        vec![Note::tap(7, 100, Pad::A4), Note::tap(3, 100, Pad::A2)],
        InputSource::Live,
    );
    engine.tick(1000.0);
    let ids: Vec<u64> = engine.finished_notes().iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![7, 3]);
}

#[test]
fn crossing_zero_is_reported_once() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Simulated);
    assert!(!engine.tick(100.0).crossed_zero);
    assert!(engine.tick(50.0).crossed_zero);
    assert!(!engine.tick(50.0).crossed_zero);
}

#[test]
fn reload_replaces_everything() {
    let mut engine = loaded(
        vec![Note::tap(1, 100, Pad::A1), Note::tap(2, 300, Pad::A2)],
        InputSource::Live,
    );
    advance_to(&mut engine, 185.0);
    assert_eq!(engine.finished_notes().len(), 1);
    assert_eq!(active_ids(&engine), vec![2]);

    let notes = vec![Note::tap(10, 60, Pad::A3)];
    let actions = generate_actions(&notes);
    engine.load_chart(notes, actions).expect("reload");

    assert_eq!(engine.timer(), -180.0);
    assert_eq!(active_ids(&engine), Vec::<u64>::new());
    assert!(engine.finished_notes().is_empty());
    assert_eq!(engine.stats().judged(), 0);
    assert_eq!(engine.active_actions().count(), 0);
}

#[test]
fn rejected_chart_keeps_previous_state() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 50.0);

    let bad = vec![Note::tap(5, 200, Pad::A1), Note::tap(6, 100, Pad::A2)];
    let err = engine.load_chart(bad, Vec::new()).unwrap_err();

    assert_eq!(err, LoadError::NotSorted { index: 1, id: 6 });
    assert_eq!(engine.timer(), 50.0);
    assert_eq!(active_ids(&engine), vec![1]);
}

#[test]
fn hold_is_graded_on_its_head_and_finishes_at_the_tail() {
    let mut engine = loaded(vec![Note::hold(1, 100, 60, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 101.0);
    engine.apply_input(PadInput::press(Pad::A1));
    assert!(engine.finished_notes().is_empty());
    assert_eq!(active_ids(&engine), vec![1]);

    advance_to(&mut engine, 160.0);
    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Perfect));
}

#[test]
fn releasing_a_hold_early_costs_a_tier() {
    let mut engine = loaded(vec![Note::hold(1, 100, 60, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 100.0);
    engine.apply_input(PadInput::press(Pad::A1));
    advance_to(&mut engine, 120.0);
    engine.apply_input(PadInput::release(Pad::A1));

    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Great));
}

#[test]
fn unpressed_hold_misses() {
    let mut engine = loaded(vec![Note::hold(1, 100, 60, Pad::A1)], InputSource::Live);
    advance_to(&mut engine, 131.0);
    assert_eq!(tier_of(&engine.finished_notes()[0]), Some(JudgeTier::Miss));
}

fn slide_chart() -> Vec<Note> {
    vec![Note::slide(
        1,
        300,
        120,
        SlidePath::new(Pad::A1)
            .then(Pad::C, SlideShape::Straight)
            .then(Pad::A5, SlideShape::Straight),
    )]
}

#[test]
fn slide_traced_in_order_is_graded_at_completion() {
    let mut engine = loaded(slide_chart(), InputSource::Live);
    advance_to(&mut engine, 290.0);

    engine.apply_input(PadInput::press(Pad::A1));
    engine.apply_input(PadInput::press(Pad::C));
    engine.apply_input(PadInput::release(Pad::A1));
    assert!(engine.finished_notes().is_empty());

    advance_to(&mut engine, 295.0);
    engine.apply_input(PadInput::press(Pad::A5));

    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Perfect));
}

#[test]
fn slide_skipping_its_start_never_completes() {
    let mut engine = loaded(slide_chart(), InputSource::Live);
    advance_to(&mut engine, 290.0);
    engine.apply_input(PadInput::press(Pad::C));
    engine.apply_input(PadInput::press(Pad::A5));
    assert!(engine.finished_notes().is_empty());

    advance_to(&mut engine, 360.0);
    assert!(engine.finished_notes().is_empty());
    engine.tick(1.0);
    assert_eq!(tier_of(&engine.finished_notes()[0]), Some(JudgeTier::Miss));
}

#[test]
fn slide_cannot_be_traced_before_it_launches() {
    let mut cfg = config(InputSource::Live);
    cfg.lookahead_ticks = 300;
    let mut engine = loaded_with(cfg, slide_chart());
    // tracing opens at 300 - 120 - 60 = 120
    advance_to(&mut engine, 100.0);
    assert_eq!(active_ids(&engine), vec![1]);
    for pad in [Pad::A1, Pad::C, Pad::A5] {
        engine.apply_input(PadInput::press(pad));
    }
    for pad in [Pad::A1, Pad::C, Pad::A5] {
        engine.apply_input(PadInput::release(pad));
    }

    advance_to(&mut engine, 130.0);
    assert!(engine.finished_notes().is_empty());
    assert_eq!(active_ids(&engine), vec![1]);
}

#[test]
fn slide_completed_far_too_early_counts_as_good() {
    let mut cfg = config(InputSource::Live);
    cfg.lookahead_ticks = 300;
    let mut engine = loaded_with(cfg, slide_chart());
    advance_to(&mut engine, 100.0);
    for pad in [Pad::A1, Pad::C, Pad::A5] {
        engine.apply_input(PadInput::press(pad));
    }
    assert!(engine.finished_notes().is_empty());

    advance_to(&mut engine, 130.0);
    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Good));
    assert_eq!(
        finished[0].judge_state.judgement().and_then(|j| j.offset_ticks),
        Some(-170.0)
    );
}

#[test]
fn touch_group_feedback_uses_worst_member() {
    let mut engine = loaded(
        vec![
            Note::touch(1, 100, Pad::B1).in_group(5),
            Note::touch(2, 100, Pad::B2).in_group(5),
        ],
        InputSource::Live,
    );
    advance_to(&mut engine, 100.0);
    engine.apply_input(PadInput::press(Pad::B1));

    let groups = engine.active_touch_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, 5);
    assert_eq!(groups[0].judged, 1);
    assert_eq!(groups[0].feedback, Some(JudgeTier::Perfect));

    advance_to(&mut engine, 112.0);
    engine.apply_input(PadInput::press(Pad::B2));
    assert!(engine.active_touch_groups().is_empty());
    let tiers: Vec<_> = engine.finished_notes().iter().map(tier_of).collect();
    assert_eq!(tiers, vec![Some(JudgeTier::Perfect), Some(JudgeTier::Great)]);
}

#[test]
fn simulated_pad_state_follows_actions() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Simulated);
    advance_to(&mut engine, 97.0);
    assert!(engine.pad_states().contains(Pad::A1));
    assert_eq!(engine.pad_states().len(), 1);

    advance_to(&mut engine, 110.0);
    assert!(engine.pad_states().is_empty());
    assert_eq!(engine.stats().count(JudgeTier::Perfect), 1);
}

#[test]
fn live_pad_state_mirrors_held_pads() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Live);
    engine.apply_input(PadInput::press(Pad::B2));
    assert!(engine.pad_states().contains(Pad::B2));
    engine.apply_input(PadInput::release(Pad::B2));
    assert!(engine.pad_states().is_empty());
}

#[test]
fn simulated_mode_ignores_live_input() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Simulated);
    advance_to(&mut engine, 60.0);
    let report = engine.apply_input(PadInput::press(Pad::A1));
    assert_eq!(report.judged, 0);
    assert_eq!(active_ids(&engine), vec![1]);
}

#[test]
fn judge_offset_shifts_inputs() {
    let mut cfg = config(InputSource::Live);
    cfg.judge_offset_ticks = -10;
    let mut engine = JudgeManager::new(cfg);
    let notes = vec![Note::tap(1, 100, Pad::A1)];
    engine.load_chart(notes, Vec::new()).expect("load");

    advance_to(&mut engine, 110.0);
    engine.apply_input(PadInput::press(Pad::A1));
    assert_eq!(tier_of(&engine.finished_notes()[0]), Some(JudgeTier::Perfect));
}

fn long_slide_chart() -> Vec<Note> {
    vec![Note::slide(
        1,
        400,
        240,
        SlidePath::new(Pad::A1)
            .then(Pad::C, SlideShape::Straight)
            .then(Pad::A5, SlideShape::Straight),
    )]
}

#[test]
fn slide_longer_than_lookahead_is_traceable_from_its_start() {
    let mut engine = JudgeManager::new(JudgeConfig {
        input_source: InputSource::Live,
        ..JudgeConfig::default()
    });
    engine.load_chart(long_slide_chart(), Vec::new()).expect("load");

    // tracing opens at 400 - 240 - 60 = 100, well before 400 - 120
    advance_to(&mut engine, 99.0);
    assert_eq!(active_ids(&engine), Vec::<u64>::new());
    advance_to(&mut engine, 165.0);
    assert_eq!(active_ids(&engine), vec![1]);
    engine.apply_input(PadInput::press(Pad::A1));

    advance_to(&mut engine, 270.0);
    engine.apply_input(PadInput::press(Pad::C));
    engine.apply_input(PadInput::release(Pad::A1));

    advance_to(&mut engine, 398.0);
    engine.apply_input(PadInput::press(Pad::A5));

    let finished = engine.finished_notes();
    assert_eq!(finished.len(), 1);
    assert_eq!(tier_of(&finished[0]), Some(JudgeTier::Perfect));
    assert_eq!(
        finished[0].judge_state.judgement().and_then(|j| j.offset_ticks),
        Some(-2.0)
    );
}

#[test]
fn early_activated_slide_keeps_chart_order() {
    let mut notes = vec![Note::tap(1, 400, Pad::A2)];
    let mut slide = long_slide_chart();
    slide[0].id = 2;
    notes.append(&mut slide);
    let mut engine = loaded(notes, InputSource::Simulated);

    advance_to(&mut engine, 150.0);
    assert_eq!(active_ids(&engine), vec![2]);
    advance_to(&mut engine, 300.0);
    assert_eq!(active_ids(&engine), vec![1, 2]);

    advance_to(&mut engine, 400.0);
    let ids: Vec<u64> = engine.finished_notes().iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn simulated_judgement_is_on_the_beat_even_when_a_tick_overshoots() {
    let mut engine = loaded(vec![Note::tap(1, 100, Pad::A1)], InputSource::Simulated);
    engine.tick(300.0);

    let finished = engine.finished_notes();
    assert_eq!(engine.timer(), 160.0);
    assert_eq!(finished.len(), 1);
    assert_eq!(
        finished[0].judge_state.judgement(),
        Some(Judgement {
            tier: JudgeTier::Perfect,
            offset_ticks: Some(0.0),
        })
    );
}

#[test]
fn huge_lookahead_and_lead_in_saturate() {
    let mut cfg = config(InputSource::Live);
    cfg.lookahead_ticks = i64::MAX;
    cfg.lead_in_ticks = i64::MAX;
    let mut engine = loaded_with(
        cfg,
        vec![
            Note::tap(1, 100, Pad::A1),
            Note::slide(
                2,
                200,
                80,
                SlidePath::new(Pad::A1).then(Pad::A5, SlideShape::Straight),
            ),
        ],
    );

    assert_eq!(engine.timer(), (100 - i64::MAX) as f64);
    engine.tick(1.0);
    assert_eq!(active_ids(&engine), vec![1, 2]);
    assert!(engine.finished_notes().is_empty());
}
