use crate::input::InputSource;
use serde::{Deserialize, Serialize};

fn default_lookahead_ticks() -> i64 {
    120
}

fn default_lead_in_ticks() -> i64 {
    240
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Window overrides in ticks, tightest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowOverride {
    pub perfect: i64,
    pub great: i64,
    pub good: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    pub input_source: InputSource,
    pub judge_offset_ms: i32,
    pub tap_window: Option<WindowOverride>,
    pub slide_window: Option<WindowOverride>,
    #[serde(default = "default_lookahead_ticks")]
    pub lookahead_ticks: i64,
    #[serde(default = "default_lead_in_ticks")]
    pub lead_in_ticks: i64,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            input_source: InputSource::Simulated,
            judge_offset_ms: 0,
            tap_window: None,
            slide_window: None,
            lookahead_ticks: default_lookahead_ticks(),
            lead_in_ticks: default_lead_in_ticks(),
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
