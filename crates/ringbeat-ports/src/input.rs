use crate::pad::Pad;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Press,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadInput {
    pub pad: Pad,
    pub kind: InputKind,
}

impl PadInput {
    pub fn press(pad: Pad) -> Self {
        Self {
            pad,
            kind: InputKind::Press,
        }
    }

    pub fn release(pad: Pad) -> Self {
        Self {
            pad,
            kind: InputKind::Release,
        }
    }
}

/// Where pad state comes from: real sampled input, or inferred from the chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    Live,
    #[default]
    Simulated,
}

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Input stream handle: drop closes it.
pub trait PadInputStream: Send {
    fn close(self: Box<Self>);
}

pub type PadInputCallback = Arc<dyn Fn(PadInput) + Send + Sync + 'static>;

pub trait PadInputPort: Send + Sync {
    /// Open input stream: implementation should invoke cb from a background thread/callback.
    fn open(&self, cb: PadInputCallback) -> Result<Box<dyn PadInputStream>, InputError>;
}
