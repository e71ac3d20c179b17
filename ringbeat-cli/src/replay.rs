use anyhow::{Context, Result};
use parking_lot::Mutex;
use ringbeat_ports::input::{
    InputError, InputKind, PadInput, PadInputCallback, PadInputPort, PadInputStream,
};
use ringbeat_ports::pad::Pad;
use ringbeat_ports::types::TickF;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct InputRecord {
    tick: TickF,
    pad: String,
    kind: InputKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedInput {
    pub tick: TickF,
    pub input: PadInput,
}

pub fn parse_inputs(text: &str) -> Result<Vec<TimedInput>> {
    let records: Vec<InputRecord> = serde_json::from_str(text).context("malformed input script")?;
    let mut inputs = records
        .into_iter()
        .map(|record| {
            let pad: Pad = record
                .pad
                .parse()
                .with_context(|| format!("input at tick {}", record.tick))?;
            Ok(TimedInput {
                tick: record.tick,
                input: PadInput {
                    pad,
                    kind: record.kind,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;
    inputs.sort_by(|a, b| a.tick.total_cmp(&b.tick));
    Ok(inputs)
}

pub fn load_inputs(path: &Path) -> Result<Vec<TimedInput>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read input script {}", path.display()))?;
    parse_inputs(&text).with_context(|| format!("in {}", path.display()))
}

/// Pad input port fed from a recorded script, released as the engine timer reaches each input.
pub struct ReplayInputPort {
    cb: Arc<Mutex<Option<PadInputCallback>>>,
    pending: Mutex<VecDeque<TimedInput>>,
}

struct ReplayStream {
    cb: Arc<Mutex<Option<PadInputCallback>>>,
}

impl PadInputStream for ReplayStream {
    fn close(self: Box<Self>) {
        self.cb.lock().take();
    }
}

impl ReplayInputPort {
    pub fn new(inputs: Vec<TimedInput>) -> Self {
        Self {
            cb: Arc::new(Mutex::new(None)),
            pending: Mutex::new(inputs.into()),
        }
    }

    /// Sends every input due at or before `timer`. Returns how many were sent.
    pub fn pump(&self, timer: TickF) -> usize {
        let Some(cb) = self.cb.lock().clone() else {
            return 0;
        };
        let mut pending = self.pending.lock();
        let mut sent = 0;
        while pending.front().is_some_and(|next| next.tick <= timer) {
            if let Some(next) = pending.pop_front() {
                cb(next.input);
                sent += 1;
            }
        }
        sent
    }

    pub fn remaining(&self) -> usize {
        self.pending.lock().len()
    }
}

impl PadInputPort for ReplayInputPort {
    fn open(&self, cb: PadInputCallback) -> Result<Box<dyn PadInputStream>, InputError> {
        *self.cb.lock() = Some(cb);
        Ok(Box::new(ReplayStream {
            cb: self.cb.clone(),
        }))
    }
}
