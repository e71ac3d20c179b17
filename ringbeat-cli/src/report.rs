use ringbeat_core::{format_timer, Event, JudgeManager};
use ringbeat_domain_chart::JudgeTier;
use ringbeat_ports::types::TickF;

pub fn print_event(event: &Event, timer: TickF) {
    match event {
        Event::SessionStateUpdated { state, .. } => log::info!("session {state:?}"),
        Event::PlaybackStarted { timer } => {
            println!("{}  playback started", format_timer(*timer));
        }
        Event::NoteJudged {
            note_id,
            tier,
            offset_ticks,
            is_break,
        } => {
            let offset = offset_ticks
                .map(|offset| format!("{offset:+.1}"))
                .unwrap_or_else(|| "-".to_string());
            let tag = if *is_break { " BREAK" } else { "" };
            println!(
                "{}  note {note_id:<4} {tier:<7} {offset:>6}{tag}",
                format_timer(timer),
                tier = format!("{tier:?}"),
            );
        }
        Event::TouchGroupFeedback {
            group_id,
            judged,
            members,
            tier,
        } => {
            if let Some(tier) = tier {
                println!(
                    "{}  group {group_id} {judged}/{members} {tier:?}",
                    format_timer(timer)
                );
            }
        }
        Event::ScoreSummaryUpdated {
            combo,
            score,
            accuracy,
        } => log::debug!("combo {combo} score {score} ({:.2}%)", accuracy * 100.0),
    }
}

pub fn print_summary(engine: &JudgeManager) {
    let stats = engine.stats();
    println!();
    for tier in JudgeTier::ALL {
        println!("{:<8} {}", format!("{tier:?}"), stats.count(tier));
    }
    println!("max combo {}", stats.max_combo);
    println!("fast/late {}/{}", stats.early, stats.late);
    println!(
        "score    {} / {} ({:.2}%)",
        stats.score,
        engine.max_score(),
        stats.accuracy(engine.max_score()) * 100.0
    );
}
