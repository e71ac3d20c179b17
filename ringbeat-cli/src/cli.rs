use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use ringbeat_ports::input::InputSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Judge pad input (from --inputs)
    Live,
    /// Let the chart play itself, every note Perfect
    Demo,
}

impl From<Mode> for InputSource {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Live => InputSource::Live,
            Mode::Demo => InputSource::Simulated,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Plays a ring chart through the judgment engine", version)]
pub struct Args {
    /// Chart JSON file
    pub chart: PathBuf,

    /// Input source; remembered in settings when given
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// JSON list of timed pad inputs to replay in live mode
    #[arg(long)]
    pub inputs: Option<PathBuf>,

    /// Pace the loop against the wall clock instead of running headless
    #[arg(long)]
    pub realtime: bool,

    /// Driver loop frequency
    #[arg(long, default_value_t = 200.0)]
    pub tick_hz: f64,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub rate: f64,

    /// Input offset in milliseconds; remembered in settings when given
    #[arg(long, allow_negative_numbers = true)]
    pub judge_offset_ms: Option<i32>,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,

    /// Directory holding settings.json (default: user config dir)
    #[arg(long)]
    pub settings_dir: Option<PathBuf>,

    /// Directory to write a diagnostics bundle into after the run
    #[arg(long)]
    pub diagnostics: Option<PathBuf>,
}
