use proptest::prelude::*;
use ringbeat_core::JudgeManager;
use ringbeat_domain_chart::{JudgeState, Note, SlidePath, SlideShape};
use ringbeat_domain_eval::{generate_actions, JudgeConfig};
use ringbeat_ports::input::{InputSource, PadInput};
use ringbeat_ports::pad::Pad;

fn chart() -> Vec<Note> {
    vec![
        Note::tap(1, 40, Pad::A1),
        Note::touch(2, 60, Pad::C).in_group(1),
        Note::touch(3, 60, Pad::E3).in_group(1),
        Note::hold(4, 90, 50, Pad::A4),
        Note::tap(5, 120, Pad::A8),
        Note::slide(
            6,
            260,
            90,
            SlidePath::new(Pad::A8).then(Pad::A3, SlideShape::Clockwise),
        ),
    ]
}

fn engine(input_source: InputSource) -> JudgeManager {
    let config = JudgeConfig {
        input_source,
        ..JudgeConfig::default()
    };
    let mut engine = JudgeManager::new(config);
    let notes = chart();
    let actions = generate_actions(&notes);
    engine.load_chart(notes, actions).expect("chart loads");
    engine
}

#[derive(Clone, Debug)]
enum Step {
    Tick(f64),
    Press(usize),
    Release(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0.0f64..12.0).prop_map(Step::Tick),
        1 => (0..Pad::COUNT).prop_map(Step::Press),
        1 => (0..Pad::COUNT).prop_map(Step::Release),
    ]
}

fn run(engine: &mut JudgeManager, steps: &[Step]) -> Vec<(u64, JudgeState)> {
    let mut log = Vec::new();
    for step in steps {
        match *step {
            Step::Tick(delta) => {
                engine.tick(delta);
            }
            Step::Press(idx) => {
                if let Some(pad) = Pad::from_index(idx) {
                    engine.apply_input(PadInput::press(pad));
                }
            }
            Step::Release(idx) => {
                if let Some(pad) = Pad::from_index(idx) {
                    engine.apply_input(PadInput::release(pad));
                }
            }
        }
        log.extend(
            engine
                .finished_notes()
                .iter()
                .map(|note| (note.id, note.judge_state)),
        );
        engine.clear_finished_notes();
    }
    log
}

proptest! {
    #[test]
    fn same_steps_give_same_judgements(steps in prop::collection::vec(step(), 0..200)) {
        let mut a = engine(InputSource::Live);
        let mut b = engine(InputSource::Live);

        let log_a = run(&mut a, &steps);
        let log_b = run(&mut b, &steps);

        prop_assert_eq!(log_a, log_b);
        prop_assert_eq!(a.timer(), b.timer());
        prop_assert_eq!(a.stats(), b.stats());
        prop_assert_eq!(a.pad_states(), b.pad_states());
    }

    #[test]
    fn zero_tick_is_idempotent(steps in prop::collection::vec(step(), 0..120), repeats in 1usize..8) {
        let mut engine = engine(InputSource::Live);
        run(&mut engine, &steps);

        let timer = engine.timer();
        let states: Vec<JudgeState> = engine.notes().iter().map(|note| note.judge_state).collect();
        let active: Vec<u64> = engine.active_notes().map(|note| note.id).collect();
        let finished = engine.finished_notes().len();

        for _ in 0..repeats {
            engine.tick(0.0);
        }

        let states_after: Vec<JudgeState> =
            engine.notes().iter().map(|note| note.judge_state).collect();
        let active_after: Vec<u64> = engine.active_notes().map(|note| note.id).collect();
        prop_assert_eq!(engine.timer(), timer);
        prop_assert_eq!(states_after, states);
        prop_assert_eq!(active_after, active);
        prop_assert_eq!(engine.finished_notes().len(), finished);
    }

    #[test]
    fn each_note_is_judged_at_most_once(steps in prop::collection::vec(step(), 0..300)) {
        let mut engine = engine(InputSource::Live);
        let log = run(&mut engine, &steps);

        let mut ids: Vec<u64> = log.iter().map(|(id, _)| *id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
        prop_assert_eq!(engine.stats().judged() as usize, total);
    }

    #[test]
    fn simulated_play_is_all_perfect_for_any_step_sizes(
        deltas in prop::collection::vec(0.5f64..20.0, 1..400),
    ) {
        let mut engine = engine(InputSource::Simulated);
        for delta in deltas {
            engine.tick(delta);
        }
        engine.tick(1000.0);

        prop_assert!(engine.is_complete());
        prop_assert_eq!(
            engine.stats().count(ringbeat_domain_chart::JudgeTier::Perfect) as usize,
            engine.notes().len()
        );
    }
}
