use crate::model::{
    Chart, ChartMeta, JudgeState, Note, NoteFlags, NoteKind, NoteTarget, SlideHop, SlidePath,
    SlideShape,
};
use crate::validate::{validate_notes, LoadError};
use ringbeat_ports::pad::Pad;
use ringbeat_ports::types::Tick;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CHART_SCHEMA_VERSION: &str = "1";

#[derive(thiserror::Error, Debug)]
pub enum ChartFileError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported schema version {0:?}")]
    Schema(String),
    #[error("invalid chart: {0}")]
    Load(#[from] LoadError),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartFile {
    pub schema_version: String,
    #[serde(default)]
    pub meta: ChartMeta,
    pub notes: Vec<NoteRecord>,
}

/// On-disk note: pads are labels so a typo surfaces as [`LoadError::UnknownPad`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: u64,
    pub kind: NoteKind,
    pub target_tick: Tick,
    #[serde(default)]
    pub duration_ticks: Tick,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathRecord>,
    #[serde(default)]
    pub is_break: bool,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub each: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_group: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathRecord {
    pub start: String,
    pub hops: Vec<HopRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HopRecord {
    pub to: String,
    pub shape: SlideShape,
}

fn parse_pad(label: &str) -> Result<Pad, LoadError> {
    label
        .parse::<Pad>()
        .map_err(|_| LoadError::UnknownPad(label.to_string()))
}

impl NoteRecord {
    fn into_note(self) -> Result<Note, LoadError> {
        let target = match (self.pad, self.path) {
            (Some(pad), None) => NoteTarget::Pad(parse_pad(&pad)?),
            (None, Some(path)) => {
                let start = parse_pad(&path.start)?;
                let hops = path
                    .hops
                    .iter()
                    .map(|hop| {
                        Ok(SlideHop {
                            to: parse_pad(&hop.to)?,
                            shape: hop.shape,
                        })
                    })
                    .collect::<Result<Vec<_>, LoadError>>()?;
                NoteTarget::Path(SlidePath { start, hops })
            }
            (Some(pad), Some(_)) => {
                return Err(LoadError::TargetMismatch {
                    id: self.id,
                    kind: self.kind,
                    target: format!("both pad {pad} and a path"),
                })
            }
            (None, None) => {
                return Err(LoadError::TargetMismatch {
                    id: self.id,
                    kind: self.kind,
                    target: "nothing".to_string(),
                })
            }
        };

        Ok(Note {
            id: self.id,
            kind: self.kind,
            target_tick: self.target_tick,
            duration_ticks: self.duration_ticks,
            target,
            flags: NoteFlags {
                is_break: self.is_break,
                star: self.star,
                each: self.each,
            },
            touch_group: self.touch_group,
            judge_state: JudgeState::Pending,
        })
    }

    fn from_note(note: &Note) -> Self {
        let (pad, path) = match &note.target {
            NoteTarget::Pad(pad) => (Some(pad.to_string()), None),
            NoteTarget::Path(path) => (
                None,
                Some(PathRecord {
                    start: path.start.to_string(),
                    hops: path
                        .hops
                        .iter()
                        .map(|hop| HopRecord {
                            to: hop.to.to_string(),
                            shape: hop.shape,
                        })
                        .collect(),
                }),
            ),
        };
        Self {
            id: note.id,
            kind: note.kind,
            target_tick: note.target_tick,
            duration_ticks: note.duration_ticks,
            pad,
            path,
            is_break: note.flags.is_break,
            star: note.flags.star,
            each: note.flags.each,
            touch_group: note.touch_group,
        }
    }
}

impl ChartFile {
    pub fn from_chart(chart: &Chart) -> Self {
        Self {
            schema_version: CHART_SCHEMA_VERSION.to_string(),
            meta: chart.meta.clone(),
            notes: chart.notes.iter().map(NoteRecord::from_note).collect(),
        }
    }

    pub fn into_chart(self) -> Result<Chart, ChartFileError> {
        if self.schema_version != CHART_SCHEMA_VERSION {
            return Err(ChartFileError::Schema(self.schema_version));
        }
        let notes = self
            .notes
            .into_iter()
            .map(NoteRecord::into_note)
            .collect::<Result<Vec<_>, LoadError>>()?;
        validate_notes(&notes)?;
        Ok(Chart::new(self.meta, notes))
    }
}

pub fn parse_chart_json(text: &str) -> Result<Chart, ChartFileError> {
    let file: ChartFile =
        serde_json::from_str(text).map_err(|e| ChartFileError::Parse(e.to_string()))?;
    file.into_chart()
}

pub fn import_chart_path(path: &Path) -> Result<Chart, ChartFileError> {
    let text = fs::read_to_string(path).map_err(|e| ChartFileError::Io(e.to_string()))?;
    let chart = parse_chart_json(&text)?;
    log::info!(
        "imported chart {:?} with {} notes from {}",
        chart.meta.title,
        chart.notes.len(),
        path.display()
    );
    Ok(chart)
}

pub fn export_chart_path(chart: &Chart, path: &Path) -> Result<(), ChartFileError> {
    let data = serde_json::to_vec_pretty(&ChartFile::from_chart(chart))
        .map_err(|e| ChartFileError::Parse(e.to_string()))?;
    fs::write(path, data).map_err(|e| ChartFileError::Io(e.to_string()))
}
