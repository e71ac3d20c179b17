use crate::clock::TickClock;
use crate::diagnostics::export_diagnostics;
use crate::ipc::{ChartSource, Command, Event, SessionState};
use crate::judge_manager::{JudgeManager, TickReport};
use parking_lot::Mutex;
use ringbeat_domain_chart::{import_chart_path, Chart, ChartFileError, JudgeTier, LoadError};
use ringbeat_domain_eval::JudgeConfig;
use ringbeat_ports::input::{InputError, PadInput, PadInputPort, PadInputStream};
use ringbeat_ports::storage::{SettingsDto, StorageError, StoragePort};
use ringbeat_ports::types::TickF;
use rtrb::{Consumer, RingBuffer};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const INPUT_QUEUE_CAPACITY: usize = 1024;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("chart file error: {0}")]
    ChartFile(#[from] ChartFileError),
    #[error("chart rejected: {0}")]
    Load(#[from] LoadError),
    #[error("no chart loaded")]
    NoChart,
}

/// Owns the engine for one player and drives it from the clock and the input queue.
pub struct Session {
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    state: SessionState,
    engine: JudgeManager,
    clock: TickClock,
    chart: Option<Chart>,
    input_stream: Option<Box<dyn PadInputStream>>,
    input_rx: Option<Consumer<PadInput>>,
    events: VecDeque<Event>,
    group_feedback: HashMap<u32, (usize, Option<JudgeTier>)>,
}

impl Session {
    pub fn new(storage: Option<Box<dyn StoragePort>>) -> Self {
        let settings = match storage.as_ref().map(|storage| storage.load_settings()) {
            Some(Ok(settings)) => settings,
            Some(Err(err)) => {
                log::warn!("falling back to default settings: {err}");
                SettingsDto::default()
            }
            None => SettingsDto::default(),
        };
        Self::with_settings(storage, settings)
    }

    pub fn with_settings(storage: Option<Box<dyn StoragePort>>, settings: SettingsDto) -> Self {
        let engine = JudgeManager::new(JudgeConfig::from_settings(&settings));
        Self {
            storage,
            settings,
            state: SessionState::Idle,
            engine,
            clock: TickClock::default(),
            chart: None,
            input_stream: None,
            input_rx: None,
            events: VecDeque::new(),
            group_feedback: HashMap::new(),
        }
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::LoadChart { source } => {
                let chart = match source {
                    ChartSource::File(path) => import_chart_path(Path::new(&path))?,
                    ChartSource::Inline(chart) => chart,
                };
                self.apply_chart(chart)?;
            }
            Command::Start => {
                if self.chart.is_none() {
                    return Err(SessionError::NoChart);
                }
                if self.state == SessionState::Finished {
                    self.restart()?;
                }
                self.clock.start(Instant::now());
                self.state = SessionState::Running;
                self.emit_session_state();
            }
            Command::Pause => {
                if self.state == SessionState::Running {
                    self.clock.pause();
                    self.state = SessionState::Paused;
                    self.emit_session_state();
                }
            }
            Command::Resume => {
                if self.state == SessionState::Paused {
                    self.clock.resume(Instant::now());
                    self.state = SessionState::Running;
                    self.emit_session_state();
                }
            }
            Command::Restart => {
                self.restart()?;
            }
            Command::SetInputSource { source } => {
                self.settings.input_source = source;
                self.reconfigure()?;
            }
            Command::SetJudgeOffsetMs { ms } => {
                self.settings.judge_offset_ms = ms;
                self.reconfigure()?;
            }
            Command::SetRateMultiplier { x } => {
                self.clock.set_rate_multiplier(x);
            }
            Command::ExportDiagnostics { path } => {
                export_diagnostics(
                    Path::new(&path),
                    &self.settings,
                    self.engine.notes(),
                    self.engine.stats(),
                    self.engine.timer(),
                )?;
            }
        }
        Ok(())
    }

    /// Routes a pad input port into the lock-free queue drained every tick.
    pub fn open_input(&mut self, port: &dyn PadInputPort) -> Result<(), SessionError> {
        if let Some(stream) = self.input_stream.take() {
            stream.close();
        }

        let (producer, consumer) = RingBuffer::new(INPUT_QUEUE_CAPACITY);
        let producer = Arc::new(Mutex::new(producer));
        let cb = Arc::new(move |input: PadInput| {
            if producer.lock().push(input).is_err() {
                log::warn!("input queue full, dropping {input:?}");
            }
        });

        let stream = port.open(cb)?;
        self.input_stream = Some(stream);
        self.input_rx = Some(consumer);
        Ok(())
    }

    /// Advances by wall-clock time since the previous call.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let elapsed = self.clock.elapsed_ticks(now);
        self.advance(elapsed)
    }

    /// Advances by an explicit number of ticks, for fixed-step or headless drivers.
    pub fn advance(&mut self, elapsed_ticks: TickF) -> TickReport {
        if self.state != SessionState::Running {
            return TickReport::default();
        }

        // queued inputs land at the timer before this step, at most one step early
        self.process_inputs();
        let report = self.engine.tick(elapsed_ticks);
        if report.crossed_zero {
            self.events.push_back(Event::PlaybackStarted {
                timer: self.engine.timer(),
            });
        }

        self.emit_finished_notes();
        self.emit_touch_groups();

        if self.engine.is_complete() {
            self.state = SessionState::Finished;
            self.clock.stop();
            log::info!(
                "chart finished: score {} / {}",
                self.engine.stats().score,
                self.engine.max_score()
            );
            self.emit_session_state();
        }
        report
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn engine(&self) -> &JudgeManager {
        &self.engine
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    fn apply_chart(&mut self, chart: Chart) -> Result<(), SessionError> {
        self.engine.load(&chart)?;
        self.chart = Some(chart);
        self.group_feedback.clear();
        self.clock.stop();
        self.state = SessionState::Ready;
        self.emit_session_state();
        Ok(())
    }

    fn restart(&mut self) -> Result<(), SessionError> {
        let chart = self.chart.clone().ok_or(SessionError::NoChart)?;
        self.apply_chart(chart)
    }

    /// New judge settings only apply to a freshly loaded chart, so reload it.
    fn reconfigure(&mut self) -> Result<(), SessionError> {
        self.engine.set_config(JudgeConfig::from_settings(&self.settings));
        self.save_settings();
        if self.chart.is_some() {
            self.restart()?;
        } else {
            self.emit_session_state();
        }
        Ok(())
    }

    fn process_inputs(&mut self) {
        let Some(consumer) = self.input_rx.as_mut() else {
            return;
        };
        while let Ok(input) = consumer.pop() {
            self.engine.apply_input(input);
        }
    }

    fn emit_finished_notes(&mut self) {
        for note in self.engine.finished_notes() {
            let Some(judgement) = note.judge_state.judgement() else {
                continue;
            };
            self.events.push_back(Event::NoteJudged {
                note_id: note.id,
                tier: judgement.tier,
                offset_ticks: judgement.offset_ticks,
                is_break: note.flags.is_break,
            });
        }
        let judged_any = !self.engine.finished_notes().is_empty();
        self.engine.clear_finished_notes();

        if judged_any {
            let stats = self.engine.stats();
            self.events.push_back(Event::ScoreSummaryUpdated {
                combo: stats.combo,
                score: stats.score,
                accuracy: stats.accuracy(self.engine.max_score()),
            });
        }
    }

    fn emit_touch_groups(&mut self) {
        for group in self.engine.active_touch_groups() {
            let snapshot = (group.judged, group.feedback);
            if self.group_feedback.get(&group.id) == Some(&snapshot) {
                continue;
            }
            self.group_feedback.insert(group.id, snapshot);
            self.events.push_back(Event::TouchGroupFeedback {
                group_id: group.id,
                judged: group.judged,
                members: group.members,
                tier: group.feedback,
            });
        }
    }

    fn emit_session_state(&mut self) {
        self.events.push_back(Event::SessionStateUpdated {
            state: self.state,
            settings: self.settings.clone(),
        });
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                log::warn!("failed to save settings: {err}");
            }
        }
    }
}
