use std::fmt;

use chrono::Weekday;
use tracker_core::calendar;
use tracker_core::model::LessonId;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDay { raw: String },
    InvalidLesson { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDay { raw } => write!(f, "invalid --day value: {raw}"),
            ArgsError::InvalidLesson { raw } => write!(f, "invalid --lesson value: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Study,
    Tick,
    Refresh,
    Quiz {
        lesson: LessonId,
        score: f64,
        out_of: f64,
    },
    Mastery {
        lesson: Option<LessonId>,
    },
    Hours {
        subject: Option<String>,
    },
    Schedule(ScheduleArgs),
    Status,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleArgs {
    pub slot: Option<(u8, Weekday, String)>,
    pub from: Option<u8>,
    pub to: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub command: Command,
    /// Overrides `TRACKER_DB_URL` when set.
    pub db_url: Option<String>,
    pub json: bool,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app study                                   # record a study session today");
    eprintln!("  app tick                                    # day-boundary streak check");
    eprintln!("  app refresh                                 # catch up after time away");
    eprintln!("  app quiz --lesson <id> --score <n> --out-of <n>");
    eprintln!("  app mastery [--lesson <id>]");
    eprintln!("  app hours [--subject <s>]                   # log one study hour");
    eprintln!("  app schedule [--week <n> --day <sun..sat> --subject <s>] [--from <n>] [--to <n>]");
    eprintln!("  app status");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>   --json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_DB_URL, TRACKER_UTC_OFFSET_MINUTES, TRACKER_REST_DAYS,");
    eprintln!("  TRACKER_TERM_START, TRACKER_TERM_WEEKS, TRACKER_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

#[derive(Default)]
struct Flags {
    db_url: Option<String>,
    json: bool,
    lesson: Option<String>,
    score: Option<f64>,
    out_of: Option<f64>,
    week: Option<u8>,
    day: Option<Weekday>,
    subject: Option<String>,
    from: Option<u8>,
    to: Option<u8>,
}

impl Args {
    pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut iter = argv.into_iter();
        let name = iter.next().ok_or(ArgsError::MissingCommand)?;
        if matches!(name.as_str(), "--help" | "-h" | "help") {
            return Ok(Self {
                command: Command::Help,
                db_url: None,
                json: false,
            });
        }

        let flags = parse_flags(&mut iter)?;
        let command = match name.as_str() {
            "study" => Command::Study,
            "tick" => Command::Tick,
            "refresh" => Command::Refresh,
            "quiz" => Command::Quiz {
                lesson: lesson(required(flags.lesson.clone(), "--lesson")?)?,
                score: required(flags.score, "--score")?,
                out_of: required(flags.out_of, "--out-of")?,
            },
            "mastery" => Command::Mastery {
                lesson: flags.lesson.clone().map(lesson).transpose()?,
            },
            "hours" => Command::Hours {
                subject: flags.subject.clone(),
            },
            "schedule" => Command::Schedule(schedule_args(&flags)?),
            "status" => Command::Status,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        Ok(Self {
            command,
            db_url: flags.db_url,
            json: flags.json,
        })
    }
}

fn parse_flags(args: &mut impl Iterator<Item = String>) -> Result<Flags, ArgsError> {
    let mut flags = Flags::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                flags.db_url = Some(value);
            }
            "--json" => flags.json = true,
            "--lesson" => flags.lesson = Some(require_value(args, "--lesson")?),
            "--score" => {
                flags.score = Some(parse_number("--score", require_value(args, "--score")?)?);
            }
            "--out-of" => {
                flags.out_of = Some(parse_number("--out-of", require_value(args, "--out-of")?)?);
            }
            "--week" => flags.week = Some(parse_number("--week", require_value(args, "--week")?)?),
            "--day" => {
                let value = require_value(args, "--day")?;
                let day = calendar::parse_weekday(&value)
                    .map_err(|_| ArgsError::InvalidDay { raw: value.clone() })?;
                flags.day = Some(day);
            }
            "--subject" => flags.subject = Some(require_value(args, "--subject")?),
            "--from" => flags.from = Some(parse_number("--from", require_value(args, "--from")?)?),
            "--to" => flags.to = Some(parse_number("--to", require_value(args, "--to")?)?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(flags)
}

fn required<T>(value: Option<T>, flag: &'static str) -> Result<T, ArgsError> {
    value.ok_or(ArgsError::MissingFlag { flag })
}

fn lesson(raw: String) -> Result<LessonId, ArgsError> {
    LessonId::new(raw.clone()).map_err(|_| ArgsError::InvalidLesson { raw })
}

fn schedule_args(flags: &Flags) -> Result<ScheduleArgs, ArgsError> {
    let slot = match (flags.week, flags.day, &flags.subject) {
        (None, None, None) => None,
        (Some(week), Some(day), subject) => {
            Some((week, day, subject.clone().unwrap_or_default()))
        }
        (None, _, _) => return Err(ArgsError::MissingFlag { flag: "--week" }),
        (_, None, _) => return Err(ArgsError::MissingFlag { flag: "--day" }),
    };
    Ok(ScheduleArgs {
        slot,
        from: flags.from,
        to: flags.to,
    })
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(raw.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn parses_quiz_with_common_flags() {
        let args = parse(&[
            "quiz", "--lesson", "physics-ch1", "--score", "8.5", "--out-of", "10", "--db",
            "sqlite::memory:", "--json",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Quiz {
                lesson: LessonId::new("physics-ch1").unwrap(),
                score: 8.5,
                out_of: 10.0,
            }
        );
        assert_eq!(args.db_url.as_deref(), Some("sqlite::memory:"));
        assert!(args.json);
    }

    #[test]
    fn quiz_requires_all_numbers() {
        assert_eq!(
            parse(&["quiz", "--lesson", "x", "--score", "3"]).unwrap_err(),
            ArgsError::MissingFlag { flag: "--out-of" }
        );
        assert_eq!(
            parse(&["quiz", "--lesson", "x", "--score", "ten", "--out-of", "10"]).unwrap_err(),
            ArgsError::InvalidNumber {
                flag: "--score",
                raw: "ten".into()
            }
        );
        assert_eq!(
            parse(&["quiz", "--lesson", "  ", "--score", "1", "--out-of", "10"]).unwrap_err(),
            ArgsError::InvalidLesson { raw: "  ".into() }
        );
    }

    #[test]
    fn parses_schedule_slot_and_range() {
        let args = parse(&[
            "schedule", "--week", "3", "--day", "tue", "--subject", "Physics", "--from", "2",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Schedule(ScheduleArgs {
                slot: Some((3, Weekday::Tue, "Physics".into())),
                from: Some(2),
                to: None,
            })
        );

        assert_eq!(
            parse(&["schedule", "--week", "3"]).unwrap_err(),
            ArgsError::MissingFlag { flag: "--day" }
        );
        assert_eq!(
            parse(&["schedule", "--week", "3", "--day", "someday"]).unwrap_err(),
            ArgsError::InvalidDay {
                raw: "someday".into()
            }
        );
    }

    #[test]
    fn hours_takes_an_optional_subject() {
        assert_eq!(
            parse(&["hours"]).unwrap().command,
            Command::Hours { subject: None }
        );
        assert_eq!(
            parse(&["hours", "--subject", "Physics"]).unwrap().command,
            Command::Hours {
                subject: Some("Physics".into())
            }
        );
        assert_eq!(
            parse(&["hours", "--subject"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--subject" }
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!(parse(&[]).unwrap_err(), ArgsError::MissingCommand);
        assert_eq!(
            parse(&["launch"]).unwrap_err(),
            ArgsError::UnknownCommand("launch".into())
        );
        assert_eq!(
            parse(&["status", "--verbose"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert_eq!(
            parse(&["status", "--db"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--db" }
        );
        assert_eq!(parse(&["--help"]).unwrap().command, Command::Help);
    }

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/t.sqlite3".into()),
            "sqlite:///tmp/t.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("/var/data/t.sqlite3".into()),
            "sqlite:///var/data/t.sqlite3"
        );
        assert!(normalize_sqlite_url("t.sqlite3".into()).starts_with("sqlite://"));
    }
}
