use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{Grade, Level, PlayerName, QuizMode, QuizSettings};
use services::{AppServices, Clock, DEFAULT_LEADERBOARD_LIMIT};
use storage::repository::LeaderboardRow;
use tracing_subscriber::EnvFilter;

mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidPlayer { raw: String },
    InvalidGrade { raw: String },
    InvalidLevel { raw: String },
    InvalidMode { raw: String },
    InvalidTimeLimit { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    MissingFile { command: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPlayer { raw } => write!(f, "invalid --player value: {raw:?}"),
            ArgsError::InvalidGrade { raw } => {
                write!(f, "invalid --grade value: {raw} (expected 2-10)")
            }
            ArgsError::InvalidLevel { raw } => {
                write!(f, "invalid --level value: {raw} (expected 1-20)")
            }
            ArgsError::InvalidMode { raw } => {
                write!(f, "invalid --mode value: {raw} (expected math or shape)")
            }
            ArgsError::InvalidTimeLimit { raw } => {
                write!(f, "invalid --time-limit value: {raw} (expected 10-120 seconds)")
            }
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::MissingFile { command } => write!(f, "{command} requires --file <path>"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play        [--player <name>] [--grade <2-10>] [--level <1-20>]");
    eprintln!("                                  [--mode math|shape] [--time-limit <secs>] [--seed <n>]");
    eprintln!("  cargo run -p app -- progress    [--player <name>]");
    eprintln!("  cargo run -p app -- leaderboard [--player <name>] [--limit <n>]");
    eprintln!("  cargo run -p app -- export      [--player <name>] [--file <path>]");
    eprintln!("  cargo run -p app -- import      [--player <name>] --file <path>");
    eprintln!();
    eprintln!("Every command accepts --db <sqlite_url> (default sqlite://math_hero.sqlite3).");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATH_HERO_DB_URL, MATH_HERO_PLAYER, MATH_HERO_GRADE, MATH_HERO_TIME_LIMIT");
    eprintln!("  RUST_LOG (default info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Progress,
    Leaderboard,
    Export,
    Import,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "progress" => Some(Self::Progress),
            "leaderboard" => Some(Self::Leaderboard),
            "export" => Some(Self::Export),
            "import" => Some(Self::Import),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    player: PlayerName,
    grade: Grade,
    mode: QuizMode,
    level: Option<Level>,
    settings: QuizSettings,
    seed: Option<u64>,
    file: Option<PathBuf>,
    limit: u32,
    player_filter: bool,
}

impl Args {
    fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok();
        Self {
            db_url: env("MATH_HERO_DB_URL")
                .map_or_else(|| "sqlite://math_hero.sqlite3".into(), normalize_sqlite_url),
            player: env("MATH_HERO_PLAYER")
                .and_then(|value| PlayerName::new(value).ok())
                .unwrap_or_default(),
            grade: env("MATH_HERO_GRADE")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            mode: QuizMode::default(),
            level: None,
            settings: env("MATH_HERO_TIME_LIMIT")
                .and_then(|value| value.trim().parse().ok())
                .and_then(|secs| QuizSettings::new(secs).ok())
                .unwrap_or_default(),
            seed: None,
            file: None,
            limit: DEFAULT_LEADERBOARD_LIMIT,
            player_filter: false,
        }
    }

    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::from_env();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--player" => {
                    let value = require_value(args, "--player")?;
                    parsed.player = PlayerName::new(value.as_str())
                        .map_err(|_| ArgsError::InvalidPlayer { raw: value })?;
                    parsed.player_filter = true;
                }
                "--grade" => {
                    let value = require_value(args, "--grade")?;
                    parsed.grade = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidGrade { raw: value.clone() })?;
                }
                "--level" => {
                    let value = require_value(args, "--level")?;
                    let level = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLevel { raw: value.clone() })?;
                    parsed.level = Some(level);
                }
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    parsed.mode = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: value.clone() })?;
                }
                "--time-limit" => {
                    let value = require_value(args, "--time-limit")?;
                    parsed.settings = value
                        .trim()
                        .parse()
                        .ok()
                        .and_then(|secs| QuizSettings::new(secs).ok())
                        .ok_or_else(|| ArgsError::InvalidTimeLimit { raw: value.clone() })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let seed = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--seed",
                        raw: value.clone(),
                    })?;
                    parsed.seed = Some(seed);
                }
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    parsed.limit = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        flag: "--limit",
                        raw: value.clone(),
                    })?;
                }
                "--file" => {
                    parsed.file = Some(PathBuf::from(require_value(args, "--file")?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim().to_owned();
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let path = PathBuf::from(raw.strip_prefix("sqlite:").unwrap_or(&raw));
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default()).await?;
    tracing::debug!(db = %parsed.db_url, command = ?cmd, "storage ready");

    match cmd {
        Command::Play => play::run(&services, play::PlayOptions::from(&parsed)).await,
        Command::Progress => {
            let state = services.quiz_loop().load_state(parsed.player.clone()).await;
            print_progress(&parsed.player, state.progress());
            Ok(())
        }
        Command::Leaderboard => {
            let filter = parsed.player_filter.then_some(&parsed.player);
            let rows = services.leaderboard().recent(filter, parsed.limit).await?;
            print_leaderboard(&rows);
            Ok(())
        }
        Command::Export => {
            let json = services
                .progress_transfer()
                .export_json(&parsed.player)
                .await?;
            match &parsed.file {
                Some(path) => {
                    std::fs::write(path, json)?;
                    println!("Progress of {} written to {}", parsed.player, path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Command::Import => {
            let path = parsed
                .file
                .as_ref()
                .ok_or(ArgsError::MissingFile { command: "import" })?;
            let raw = std::fs::read_to_string(path)?;
            let merged = services
                .progress_transfer()
                .import_json(&parsed.player, &raw)
                .await?;
            println!("Imported {} into the progress of {}", path.display(), parsed.player);
            print_progress(&parsed.player, &merged);
            Ok(())
        }
    }
}

fn print_progress(player: &PlayerName, progress: &quiz_core::model::ProgressStore) {
    if progress.is_empty() {
        println!("{player} has no saved progress yet.");
        return;
    }
    println!("Progress of {player}");
    for grade in progress.grades() {
        println!(
            "  Grade {grade}: levels 1-{} unlocked",
            progress.unlocked_ceiling(grade)
        );
        for (level, result) in progress.results_for(grade) {
            println!(
                "    Level {:>2}: {}/{} ({}%) {}",
                level.value(),
                result.correct_count(),
                result.total(),
                result.percent(),
                if result.passed() { "passed" } else { "failed" }
            );
        }
    }
}

fn print_leaderboard(rows: &[LeaderboardRow]) {
    if rows.is_empty() {
        println!("Leaderboard is empty.");
        return;
    }
    for row in rows {
        let level_percent = row
            .percent_level
            .map(|p| format!("  level {p}%"))
            .unwrap_or_default();
        println!(
            "{}  {:<12} G{} L{:<2} Q{:<2} {} given {:?}, answer {} ({:.1}s){level_percent}",
            row.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            row.player,
            row.grade,
            row.level.value(),
            row.q_no,
            if row.is_correct { "✓" } else { "✗" },
            row.given,
            row.correct_answer,
            row.time_taken_secs,
        );
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--db",
            "sqlite::memory:",
            "--player",
            "  Zara ",
            "--grade",
            "7",
            "--level",
            "3",
            "--mode",
            "shape",
            "--time-limit",
            "30",
            "--seed",
            "99",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.player.as_str(), "Zara");
        assert_eq!(args.grade.value(), 7);
        assert_eq!(args.level.map(|level| level.value()), Some(3));
        assert_eq!(args.mode, QuizMode::ShapeChallenge);
        assert_eq!(args.settings.time_limit_secs(), 30);
        assert_eq!(args.seed, Some(99));
        assert!(args.player_filter);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            parse(&["--grade", "11"]),
            Err(ArgsError::InvalidGrade { .. })
        ));
        assert!(matches!(
            parse(&["--level", "0"]),
            Err(ArgsError::InvalidLevel { .. })
        ));
        assert!(matches!(
            parse(&["--time-limit", "5"]),
            Err(ArgsError::InvalidTimeLimit { .. })
        ));
        assert!(matches!(
            parse(&["--mode", "poetry"]),
            Err(ArgsError::InvalidMode { .. })
        ));
        assert!(matches!(
            parse(&["--player", "   "]),
            Err(ArgsError::InvalidPlayer { .. })
        ));
    }

    #[test]
    fn missing_values_and_unknown_flags() {
        assert!(matches!(
            parse(&["--grade"]),
            Err(ArgsError::MissingValue { flag: "--grade" })
        ));
        assert!(matches!(parse(&["--wat"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
    }
}
