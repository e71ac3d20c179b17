use ringbeat_domain_chart::{
    touch_groups, validate_notes, Chart, JudgeState, JudgeTier, Judgement, LoadError, Note,
    NoteKind, TouchGroup,
};
use ringbeat_domain_eval::{
    generate_actions, tier_points, Action, JudgeConfig, JudgeStats, TimingWindows,
    BREAK_MULTIPLIER,
};
use ringbeat_ports::input::{InputKind, InputSource, PadInput};
use ringbeat_ports::pad::{Pad, PadMask};
use ringbeat_ports::types::{Tick, TickF};

/// What one `tick()` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub activated: usize,
    pub judged: usize,
    /// The timer went from negative to non-negative: pre-roll is over.
    pub crossed_zero: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TouchGroupView {
    pub id: u32,
    pub target_tick: Tick,
    pub members: usize,
    pub judged: usize,
    /// Worst tier among judged members so far.
    pub feedback: Option<JudgeTier>,
}

#[derive(Clone, Copy, Debug, Default)]
struct NoteProgress {
    /// Head judgement of a hold that is still being held.
    head: Option<Judgement>,
    /// Number of slide path pads already traced.
    slide_step: usize,
}

pub struct JudgeManager {
    config: JudgeConfig,
    notes: Vec<Note>,
    progress: Vec<NoteProgress>,
    actions: Vec<Action>,
    groups: Vec<TouchGroup>,
    /// Note indices ordered by activation tick, ties in chart order.
    activation_order: Vec<usize>,
    next_note: usize,
    next_action: usize,
    active_notes: Vec<usize>,
    active_actions: Vec<usize>,
    finished_notes: Vec<Note>,
    timer: TickF,
    held: PadMask,
    pad_states: PadMask,
    stats: JudgeStats,
}

impl JudgeManager {
    pub fn new(config: JudgeConfig) -> Self {
        Self {
            config,
            notes: Vec::new(),
            progress: Vec::new(),
            actions: Vec::new(),
            groups: Vec::new(),
            activation_order: Vec::new(),
            next_note: 0,
            next_action: 0,
            active_notes: Vec::new(),
            active_actions: Vec::new(),
            finished_notes: Vec::new(),
            timer: 0.0,
            held: PadMask::EMPTY,
            pad_states: PadMask::EMPTY,
            stats: JudgeStats::default(),
        }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Takes effect for the next loaded chart.
    pub fn set_config(&mut self, config: JudgeConfig) {
        self.config = config;
    }

    /// Loads a chart and derives its actions, honoring the chart's own lead-in.
    pub fn load(&mut self, chart: &Chart) -> Result<(), LoadError> {
        let lead_in = chart.meta.lead_in_ticks.unwrap_or(self.config.lead_in_ticks);
        let actions = generate_actions(&chart.notes);
        self.load_with_lead_in(chart.notes.clone(), actions, lead_in)
    }

    pub fn load_chart(&mut self, notes: Vec<Note>, actions: Vec<Action>) -> Result<(), LoadError> {
        self.load_with_lead_in(notes, actions, self.config.lead_in_ticks)
    }

    /// Validates before touching any state, so a rejected chart leaves the previous one running.
    pub fn load_with_lead_in(
        &mut self,
        mut notes: Vec<Note>,
        mut actions: Vec<Action>,
        lead_in_ticks: Tick,
    ) -> Result<(), LoadError> {
        validate_notes(&notes)?;

        for note in &mut notes {
            note.judge_state = JudgeState::Pending;
        }
        actions.sort_by_key(|action| action.start_tick);

        let first_tick = notes.first().map(|note| note.target_tick).unwrap_or(0);
        let start = first_tick.saturating_sub(lead_in_ticks.max(0)).min(0);
        let mut activation_order: Vec<usize> = (0..notes.len()).collect();
        activation_order.sort_by_key(|&idx| activation_tick(&self.config, &notes[idx]));

        self.reset();
        self.groups = touch_groups(&notes);
        self.activation_order = activation_order;
        self.progress = vec![NoteProgress::default(); notes.len()];
        self.notes = notes;
        self.actions = actions;
        self.timer = start as TickF;

        log::info!(
            "loaded chart: {} notes, {} actions, {} touch groups, timer starts at {}",
            self.notes.len(),
            self.actions.len(),
            self.groups.len(),
            start
        );
        Ok(())
    }

    /// Drops the loaded chart and every piece of in-flight state.
    pub fn reset(&mut self) {
        self.notes.clear();
        self.progress.clear();
        self.actions.clear();
        self.groups.clear();
        self.activation_order.clear();
        self.next_note = 0;
        self.next_action = 0;
        self.active_notes.clear();
        self.active_actions.clear();
        self.finished_notes.clear();
        self.timer = 0.0;
        self.held = PadMask::EMPTY;
        self.pad_states = PadMask::EMPTY;
        self.stats = JudgeStats::default();
    }

    pub fn tick(&mut self, elapsed_ticks: TickF) -> TickReport {
        let mut report = TickReport::default();
        if !elapsed_ticks.is_finite() {
            log::warn!("ignoring tick with non-finite delta {elapsed_ticks}");
            return report;
        }
        if elapsed_ticks <= 0.0 {
            return report;
        }

        let before = self.timer;
        self.timer += elapsed_ticks;
        report.crossed_zero = before < 0.0 && self.timer >= 0.0;

        self.activate(&mut report);
        match self.config.input_source {
            InputSource::Simulated => self.resolve_simulated(&mut report),
            InputSource::Live => {
                self.advance_slides(&mut report);
                self.resolve_live(&mut report);
            }
        }
        self.retire_actions();
        self.refresh_pad_states();
        report
    }

    /// Applies one pad event at the current timer. Ignored when input is simulated.
    pub fn apply_input(&mut self, input: PadInput) -> TickReport {
        let mut report = TickReport::default();
        if self.config.input_source != InputSource::Live {
            log::debug!("dropping {input:?}: input source is simulated");
            return report;
        }

        match input.kind {
            InputKind::Press => {
                self.held.insert(input.pad);
                self.press(input.pad, &mut report);
                self.advance_slides(&mut report);
            }
            InputKind::Release => {
                self.held.remove(input.pad);
                self.release(input.pad, &mut report);
            }
        }
        self.refresh_pad_states();
        report
    }

    pub fn timer(&self) -> TickF {
        self.timer
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn active_notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.active_notes.iter().map(move |&idx| &self.notes[idx])
    }

    pub fn active_actions(&self) -> impl Iterator<Item = &Action> + '_ {
        self.active_actions.iter().map(move |&idx| &self.actions[idx])
    }

    /// Notes judged since the last [`clear_finished_notes`](Self::clear_finished_notes).
    pub fn finished_notes(&self) -> &[Note] {
        &self.finished_notes
    }

    pub fn clear_finished_notes(&mut self) {
        self.finished_notes.clear();
    }

    pub fn pad_states(&self) -> PadMask {
        self.pad_states
    }

    pub fn stats(&self) -> &JudgeStats {
        &self.stats
    }

    /// Score if every note were Perfect.
    pub fn max_score(&self) -> i64 {
        self.notes
            .iter()
            .map(|note| {
                let points = tier_points(JudgeTier::Perfect);
                if note.flags.is_break {
                    points * BREAK_MULTIPLIER
                } else {
                    points
                }
            })
            .sum()
    }

    /// Touch groups with at least one member still on screen.
    pub fn active_touch_groups(&self) -> Vec<TouchGroupView> {
        self.groups
            .iter()
            .filter(|group| {
                group
                    .members
                    .iter()
                    .any(|idx| self.notes[*idx].judge_state == JudgeState::Active)
            })
            .map(|group| TouchGroupView {
                id: group.id,
                target_tick: group.target_tick,
                members: group.members.len(),
                judged: group.judged_count(&self.notes),
                feedback: group.feedback_tier(&self.notes),
            })
            .collect()
    }

    /// Every note judged and every action expired.
    pub fn is_complete(&self) -> bool {
        self.next_note == self.notes.len()
            && self.active_notes.is_empty()
            && self.next_action == self.actions.len()
            && self.active_actions.is_empty()
    }

    fn activate(&mut self, report: &mut TickReport) {
        while let Some(&idx) = self.activation_order.get(self.next_note) {
            if (activation_tick(&self.config, &self.notes[idx]) as TickF) > self.timer {
                break;
            }
            self.notes[idx].judge_state = JudgeState::Active;
            let pos = self.active_notes.partition_point(|&other| other < idx);
            self.active_notes.insert(pos, idx);
            self.next_note += 1;
            report.activated += 1;
            log::debug!(
                "note {} active at {:.2} (target {})",
                self.notes[idx].id,
                self.timer,
                self.notes[idx].target_tick
            );
        }

        while let Some(action) = self.actions.get(self.next_action) {
            if action.start_tick as TickF > self.timer {
                break;
            }
            if !action.is_expired_at(self.timer) {
                self.active_actions.push(self.next_action);
            }
            self.next_action += 1;
        }
    }

    fn retire_actions(&mut self) {
        let timer = self.timer;
        let actions = &self.actions;
        self.active_actions.retain(|&idx| !actions[idx].is_expired_at(timer));
    }

    fn resolve_simulated(&mut self, report: &mut TickReport) {
        let active = self.active_notes.clone();
        for idx in active {
            let note = &self.notes[idx];
            let windows = self.config.windows_for(note.kind);
            if (note.target_tick as TickF) > self.timer {
                continue;
            }
            let hit = windows.judge(0.0);
            match note.kind {
                NoteKind::Hold => {
                    if self.progress[idx].head.is_none() {
                        self.progress[idx].head = Some(hit);
                    }
                    if (note.judge_tick() as TickF) <= self.timer {
                        self.finish(idx, hit, report);
                    }
                }
                NoteKind::Tap | NoteKind::Touch | NoteKind::Slide => {
                    self.finish(idx, hit, report);
                }
            }
        }
        self.sweep_active();
    }

    fn resolve_live(&mut self, report: &mut TickReport) {
        let active = self.active_notes.clone();
        for idx in active {
            let note = &self.notes[idx];
            let miss_window = self.config.windows_for(note.kind).miss_window();
            let miss_at = note.target_tick.saturating_add(miss_window) as TickF;
            match (note.kind, self.progress[idx].head) {
                (NoteKind::Hold, Some(head)) => {
                    if (note.judge_tick() as TickF) <= self.timer {
                        self.finish(idx, head, report);
                    }
                }
                _ => {
                    if self.timer > miss_at {
                        self.finish(idx, Judgement::miss(), report);
                    }
                }
            }
        }
        self.sweep_active();
    }

    fn press(&mut self, pad: Pad, report: &mut TickReport) {
        let input_time = self.timer + self.config.judge_offset_ticks as TickF;
        let candidate = self.active_notes.iter().copied().find(|&idx| {
            let note = &self.notes[idx];
            let pressable = match note.kind {
                NoteKind::Tap | NoteKind::Touch => true,
                NoteKind::Hold => self.progress[idx].head.is_none(),
                NoteKind::Slide => false,
            };
            let offset = input_time - note.target_tick as TickF;
            pressable
                && note.target.primary_pad() == pad
                && offset.abs() <= self.config.windows_for(note.kind).miss_window() as TickF
        });

        let Some(idx) = candidate else {
            return;
        };
        let note = &self.notes[idx];
        let judgement = self
            .config
            .windows_for(note.kind)
            .judge(input_time - note.target_tick as TickF);
        match note.kind {
            NoteKind::Hold => {
                log::debug!("hold {} head {:?}", note.id, judgement.tier);
                self.progress[idx].head = Some(judgement);
            }
            NoteKind::Tap | NoteKind::Touch | NoteKind::Slide => {
                self.finish(idx, judgement, report);
                self.sweep_active();
            }
        }
    }

    fn release(&mut self, pad: Pad, report: &mut TickReport) {
        let active = self.active_notes.clone();
        for idx in active {
            let note = &self.notes[idx];
            if note.kind != NoteKind::Hold || note.target.primary_pad() != pad {
                continue;
            }
            let Some(head) = self.progress[idx].head else {
                continue;
            };
            let early_limit = note.judge_tick().saturating_sub(self.config.tap.good) as TickF;
            let judgement = if self.timer < early_limit {
                Judgement {
                    tier: head.tier.degrade(),
                    offset_ticks: head.offset_ticks,
                }
            } else {
                head
            };
            self.finish(idx, judgement, report);
        }
        self.sweep_active();
    }

    /// Moves every traceable slide forward over the pads currently held.
    fn advance_slides(&mut self, report: &mut TickReport) {
        let input_time = self.timer + self.config.judge_offset_ticks as TickF;
        let active = self.active_notes.clone();
        for idx in active {
            let note = &self.notes[idx];
            let Some(path) = note.slide_path() else {
                continue;
            };
            let windows = self.config.slide;
            let trace_from = trace_start(note, &windows) as TickF;
            if input_time < trace_from || note.judge_state != JudgeState::Active {
                continue;
            }

            let pads: Vec<Pad> = path.pads().collect();
            let mut step = self.progress[idx].slide_step;
            while step < pads.len() && self.held.contains(pads[step]) {
                step += 1;
            }
            self.progress[idx].slide_step = step;

            if step == pads.len() {
                let offset = input_time - note.target_tick as TickF;
                // finishing ahead of the window still counts, as the weakest hit
                let tier = windows.grade(offset).unwrap_or(JudgeTier::Good);
                self.finish(
                    idx,
                    Judgement {
                        tier,
                        offset_ticks: Some(offset),
                    },
                    report,
                );
            }
        }
        self.sweep_active();
    }

    fn finish(&mut self, idx: usize, judgement: Judgement, report: &mut TickReport) {
        let note = &mut self.notes[idx];
        if note.judge_state != JudgeState::Active {
            return;
        }
        note.judge_state = JudgeState::Judged(judgement);
        self.stats.record(judgement, note.flags.is_break);
        self.finished_notes.push(note.clone());
        report.judged += 1;
        log::debug!(
            "note {} judged {:?} ({:?}) at {:.2}",
            note.id,
            judgement.tier,
            judgement.offset_ticks,
            self.timer
        );
    }

    fn sweep_active(&mut self) {
        let notes = &self.notes;
        self.active_notes.retain(|&idx| notes[idx].judge_state == JudgeState::Active);
    }

    fn refresh_pad_states(&mut self) {
        self.pad_states = match self.config.input_source {
            InputSource::Live => self.held,
            InputSource::Simulated => {
                let mut mask = PadMask::EMPTY;
                for &idx in &self.active_actions {
                    for pad in self.actions[idx].touched_pads(self.timer).iter() {
                        mask.insert(pad);
                    }
                }
                mask
            }
        };
    }
}

/// Earliest tick at which a slide may be traced.
fn trace_start(note: &Note, windows: &TimingWindows) -> Tick {
    note.target_tick
        .saturating_sub(note.duration_ticks)
        .saturating_sub(windows.good)
}

/// Slides come on screen early enough to be traced from their first pad.
fn activation_tick(config: &JudgeConfig, note: &Note) -> Tick {
    let by_lookahead = note.target_tick.saturating_sub(config.lookahead_ticks);
    match note.kind {
        NoteKind::Slide => by_lookahead.min(trace_start(note, &config.slide)),
        NoteKind::Tap | NoteKind::Hold | NoteKind::Touch => by_lookahead,
    }
}
