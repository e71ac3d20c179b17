use ringbeat_domain_chart::{JudgeState, Note, NoteKind};
use ringbeat_domain_eval::JudgeStats;
use ringbeat_ports::storage::{SettingsDto, StorageError};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct AppVersion {
    name: String,
    version: String,
}

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct NoteOutcome {
    id: u64,
    kind: NoteKind,
    target_tick: i64,
    state: JudgeState,
}

#[derive(Serialize)]
struct Outcomes {
    timer: f64,
    notes: Vec<NoteOutcome>,
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &SettingsDto,
    notes: &[Note],
    stats: &JudgeStats,
    timer: f64,
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;

    let app_version = AppVersion {
        name: "ringbeat".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let platform = PlatformInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
    };

    let outcomes = Outcomes {
        timer,
        notes: notes
            .iter()
            .map(|note| NoteOutcome {
                id: note.id,
                kind: note.kind,
                target_tick: note.target_tick,
                state: note.judge_state,
            })
            .collect(),
    };

    write_json(&dir.join("app_version.json"), &app_version)?;
    write_json(&dir.join("platform.json"), &platform)?;
    write_json(&dir.join("settings.json"), settings)?;
    write_json(&dir.join("stats.json"), stats)?;
    write_json(&dir.join("judgements.json"), &outcomes)?;

    log::info!("diagnostics written to {}", dir.display());
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
    fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
}
