mod cli;
mod replay;
mod report;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Args;
use replay::{load_inputs, ReplayInputPort};
use ringbeat_core::{ChartSource, Command, Session, SessionState};
use ringbeat_infra_storage_fs::FsStorage;
use ringbeat_ports::input::InputSource;
use ringbeat_ports::storage::StoragePort;
use ringbeat_ports::types::JUDGE_TPS;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::builder()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    if !(args.tick_hz.is_finite() && args.tick_hz > 0.0) {
        bail!("--tick-hz must be a positive number, got {}", args.tick_hz);
    }

    let storage = match &args.settings_dir {
        Some(dir) => FsStorage::new(dir.clone()),
        None => FsStorage::default(),
    };
    log::debug!("settings file: {}", storage.settings_path().display());
    let storage: Option<Box<dyn StoragePort>> = Some(Box::new(storage));
    let mut session = Session::new(storage);

    if let Some(mode) = args.mode {
        session.handle_command(Command::SetInputSource {
            source: mode.into(),
        })?;
    }
    if let Some(ms) = args.judge_offset_ms {
        session.handle_command(Command::SetJudgeOffsetMs { ms })?;
    }

    let replay = match &args.inputs {
        Some(path) => {
            let port = ReplayInputPort::new(load_inputs(path)?);
            session.open_input(&port)?;
            Some(port)
        }
        None => None,
    };
    match (session.settings().input_source, &replay) {
        (InputSource::Live, None) => {
            log::warn!("live mode without --inputs: nothing will press the pads")
        }
        (InputSource::Simulated, Some(_)) => log::warn!("demo mode ignores --inputs"),
        _ => {}
    }

    session
        .handle_command(Command::LoadChart {
            source: ChartSource::File(args.chart.to_string_lossy().into_owned()),
        })
        .with_context(|| format!("failed to load {}", args.chart.display()))?;
    session.handle_command(Command::SetRateMultiplier { x: args.rate })?;
    session.handle_command(Command::Start)?;

    run(&mut session, &args, replay.as_ref());
    report::print_summary(session.engine());

    if let Some(port) = &replay {
        if port.remaining() > 0 {
            log::info!("{} scripted inputs were never reached", port.remaining());
        }
    }

    if let Some(dir) = &args.diagnostics {
        session.handle_command(Command::ExportDiagnostics {
            path: dir.to_string_lossy().into_owned(),
        })?;
    }
    Ok(())
}

fn run(session: &mut Session, args: &Args, replay: Option<&ReplayInputPort>) {
    let period = Duration::from_secs_f64(1.0 / args.tick_hz);
    let step_ticks = JUDGE_TPS / args.tick_hz * args.rate.max(0.1);

    while session.state() == SessionState::Running {
        if let Some(port) = replay {
            port.pump(session.engine().timer());
        }

        if args.realtime {
            session.tick(Instant::now());
        } else {
            session.advance(step_ticks);
        }

        let timer = session.engine().timer();
        for event in session.drain_events() {
            report::print_event(&event, timer);
        }

        if args.realtime {
            thread::sleep(period);
        }
    }
}
