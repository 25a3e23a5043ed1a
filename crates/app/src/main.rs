use serde::Serialize;
use services::{AppServices, Clock, StatusReport, TrackerConfig};
use tracker_core::calendar;
use tracker_core::mastery::MasteryTier;
use tracker_core::schedule::QuizSchedule;
use tracker_core::streak::{RolloverDecision, StreakAction};

mod args;
mod logging;

use args::{Args, ArgsError, Command, ScheduleArgs, normalize_sqlite_url, print_usage};

fn emit<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn decision_label(decision: RolloverDecision) -> &'static str {
    match decision {
        RolloverDecision::Hold => "streak holds",
        RolloverDecision::Reset => "streak reset",
    }
}

fn tier_label(mastery: u8) -> &'static str {
    match MasteryTier::from_mastery(mastery) {
        MasteryTier::None => "not started",
        MasteryTier::Partial => "in progress",
        MasteryTier::Complete => "mastered",
    }
}

fn render_status(report: &StatusReport) -> String {
    let mut out = format!(
        "today: {}\nstreak: {} (highest {})\nlast study day: {}\nhours: {} today, {} this week, {} this month",
        calendar::date_key(report.today),
        report.streak,
        report.highest_streak,
        report
            .last_study_date
            .map_or_else(|| "never".to_string(), calendar::date_key),
        report.hours_today,
        report.hours_week,
        report.hours_month,
    );
    for subject in &report.subject_hours {
        out.push_str(&format!("\n  {}: {}h", subject.subject, subject.hours));
    }
    if report.term_week > 0 {
        out.push_str(&format!("\nterm week: {}", report.term_week));
    }
    if let Some(subject) = &report.quiz_today {
        out.push_str(&format!("\nquiz today: {subject}"));
    }
    for record in &report.lessons {
        out.push_str(&format!(
            "\n  {}: {}% ({})",
            record.lesson_id,
            record.mastery,
            tier_label(record.mastery)
        ));
    }
    out
}

fn render_schedule(schedule: &QuizSchedule) -> String {
    let mut out = format!(
        "quiz weeks {}..={}",
        schedule.start_week(),
        schedule.end_week()
    );
    for (slot, subject) in schedule.slots() {
        out.push_str(&format!(
            "\n  week {} {}: {subject}",
            slot.week(),
            slot.weekday()
        ));
    }
    out
}

#[derive(Serialize)]
struct ScheduleView<'a> {
    start_week: u8,
    end_week: u8,
    slots: Vec<SlotView<'a>>,
}

#[derive(Serialize)]
struct SlotView<'a> {
    week: u8,
    day: String,
    subject: &'a str,
}

impl<'a> ScheduleView<'a> {
    fn new(schedule: &'a QuizSchedule) -> Self {
        Self {
            start_week: schedule.start_week(),
            end_week: schedule.end_week(),
            slots: schedule
                .slots()
                .map(|(slot, subject)| SlotView {
                    week: slot.week(),
                    day: slot.weekday().to_string(),
                    subject,
                })
                .collect(),
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    logging::init_tracing();

    let mut config = TrackerConfig::from_env()?;
    config.db_url = normalize_sqlite_url(parsed.db_url.clone().unwrap_or(config.db_url));

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let app = AppServices::new_sqlite(&config, Clock::default_clock()).await?;
    let json = parsed.json;

    // Every launch first catches up on days missed while the tracker was closed.
    if !matches!(parsed.command, Command::Refresh | Command::Tick) {
        app.streak().refresh_on_load().await?;
    }

    match parsed.command {
        Command::Study => {
            let update = app.streak().record_study_session().await?;
            emit(json, &update.state, || match update.action {
                StreakAction::Noop => {
                    format!("already studied today, streak {}", update.state.streak())
                }
                StreakAction::Extend | StreakAction::Reset => {
                    format!("streak {}", update.state.streak())
                }
            })
        }
        Command::Tick => {
            let decision = app.streak().handle_midnight_tick().await?;
            emit(json, &decision, || decision_label(decision).to_string())
        }
        Command::Refresh => {
            let decision = app.streak().refresh_on_load().await?;
            emit(json, &decision, || decision_label(decision).to_string())
        }
        Command::Quiz {
            lesson,
            score,
            out_of,
        } => {
            let submission = app.mastery().submit_quiz(&lesson, score, out_of).await?;
            emit(json, &submission, || {
                let mut text = format!(
                    "{lesson}: {:.0}% on this quiz, mastery {}%",
                    submission.result.percent(),
                    submission.mastery
                );
                if submission.reached_complete() {
                    text.push_str("\nlesson mastered");
                }
                text
            })
        }
        Command::Mastery { lesson: Some(lesson) } => {
            let stats = app.mastery().stats(&lesson).await?;
            emit(json, &stats, || {
                format!(
                    "{lesson}: mastery {}% ({}), {} quizzes, average {}%",
                    stats.mastery,
                    tier_label(stats.mastery),
                    stats.quizzes_taken,
                    stats.average_percent
                )
            })
        }
        Command::Mastery { lesson: None } => {
            let records = app.mastery().overview().await?;
            emit(json, &records, || {
                if records.is_empty() {
                    return "no quizzes recorded".to_string();
                }
                records
                    .iter()
                    .map(|r| format!("{}: {}% ({})", r.lesson_id, r.mastery, tier_label(r.mastery)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Hours { subject } => {
            let update = app.hours().add_hour(subject.as_deref()).await?;
            emit(json, &update.entry, || {
                format!(
                    "{}: {}h today ({}h across subjects), streak {}",
                    update.entry.subject,
                    update.entry.hours,
                    update.today_total,
                    update.streak.state.streak()
                )
            })
        }
        Command::Schedule(ScheduleArgs { slot, from, to }) => {
            let schedule_service = app.schedule();
            if from.is_some() || to.is_some() {
                schedule_service.set_range(from, to).await?;
            }
            if let Some((week, day, subject)) = slot {
                schedule_service.assign(week, day, &subject).await?;
            }
            let schedule = schedule_service.load().await?;
            emit(json, &ScheduleView::new(&schedule), || render_schedule(&schedule))
        }
        Command::Status => {
            let report = app.status().await?;
            emit(json, &report, || render_status(&report))
        }
        Command::Help => Ok(()),
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
