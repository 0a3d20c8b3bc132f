mod commands;
mod render;

use std::fmt;
use std::str::FromStr;

use quiz_core::model::LevelId;
use services::{Clock, LoadedBank, QuestionBankLoader, QuizLoopService, QuizSession};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;

use crate::commands::{Command, help_text};

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
const DEFAULT_LEVEL: u32 = 2;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  phish-quiz [--db <sqlite_url>] [--player <name>] [--level <id>] [--wait-remote]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --level {DEFAULT_LEVEL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_LEVEL, QUIZ_LOG");
    eprintln!("  QUIZ_REMOTE_URL, QUIZ_REMOTE_KEY, QUIZ_REMOTE_TIMEOUT_MS");
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    db_url: String,
    player: Option<String>,
    level: LevelId,
    wait_remote: bool,
    help: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut level = env("QUIZ_LEVEL")
            .and_then(|value| LevelId::from_str(&value).ok())
            .unwrap_or_else(|| LevelId::new(DEFAULT_LEVEL));
        let mut player = None;
        let mut wait_remote = false;
        let mut help = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--player" => {
                    player = Some(require_value(args, "--player")?);
                }
                "--level" => {
                    let value = require_value(args, "--level")?;
                    level = LevelId::from_str(&value)
                        .map_err(|_| ArgsError::InvalidLevel { raw: value.clone() })?;
                }
                "--wait-remote" => wait_remote = true,
                "--help" | "-h" => help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            player,
            level,
            wait_remote,
            help,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
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

fn init_logging() {
    let level = std::env::var("QUIZ_LOG")
        .ok()
        .and_then(|raw| Level::from_str(raw.trim()).ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {err}");
    }
}

/// Open storage, degrading to an in-memory store so play is never blocked.
async fn open_storage(db_url: &str) -> Storage {
    if let Err(err) = prepare_sqlite_file(db_url) {
        warn!(%err, db_url, "cannot prepare database file, progress will not be kept");
        return Storage::in_memory();
    }
    match Storage::sqlite(db_url).await {
        Ok(storage) => storage,
        Err(err) => {
            warn!(%err, db_url, "cannot open database, progress will not be kept");
            Storage::in_memory()
        }
    }
}

/// Offer a finished background fetch to the session. Late banks are ignored by the session.
async fn deliver_pending_bank(
    session: &mut QuizSession,
    pending: &mut Option<JoinHandle<LoadedBank>>,
) {
    let Some(handle) = pending.take_if(|handle| handle.is_finished()) else {
        return;
    };
    match handle.await {
        Ok(loaded) => {
            session.offer_bank(loaded.bank, loaded.source);
        }
        Err(err) => debug!(%err, "background question fetch did not finish"),
    }
}

async fn play(
    loop_svc: &QuizLoopService,
    mut session: QuizSession,
    mut pending: Option<JoinHandle<LoadedBank>>,
) -> Result<(), Box<dyn std::error::Error>> {
    deliver_pending_bank(&mut session, &mut pending).await;
    println!("{}", render::render_snapshot(&session.snapshot()));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        deliver_pending_bank(&mut session, &mut pending).await;

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match command {
            Command::Action(action) => {
                let result = session.submit_free_action(&action);
                print!("{}", render::render_free_action(&result));
            }
            Command::Answer(index) => match session.answer_current(index) {
                Ok(outcome) => print!("{}", render::render_answer(&outcome)),
                Err(err) => println!("{err}"),
            },
            Command::Move(delta) => {
                session.navigate(delta);
                if let Some(view) = session.snapshot().current_question {
                    print!("{}", render::render_question(&view));
                }
            }
            Command::Jump(index) => match session.jump_to(index) {
                Ok(_) => {
                    if let Some(view) = session.snapshot().current_question {
                        print!("{}", render::render_question(&view));
                    }
                }
                Err(err) => println!("{err}"),
            },
            Command::Status => print!("{}", render::render_snapshot(&session.snapshot())),
            Command::Help => println!("{}", help_text()),
            Command::Quit => break,
        }
    }

    if let Some(handle) = pending {
        handle.abort();
    }
    loop_svc.finish_session(&session).await;
    print!("{}", render::render_status(&session.snapshot()));
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.help {
        print_usage();
        return Ok(());
    }

    init_logging();

    let storage = open_storage(&parsed.db_url).await;
    let loop_svc = QuizLoopService::new(Clock::default_clock(), storage.identity)
        .with_loader(QuestionBankLoader::from_env());
    let player = parsed.player.as_deref();

    let (session, pending) = if parsed.wait_remote {
        let session = loop_svc
            .start_session_with_remote(player, parsed.level)
            .await;
        (session, None)
    } else {
        let session = loop_svc.start_session(player).await;
        let fetcher = loop_svc.clone();
        let level = parsed.level;
        let pending = tokio::spawn(async move { fetcher.load_bank(level).await });
        (session, Some(pending))
    };

    play(&loop_svc, session, pending).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        Args::parse(&mut iter, move |key| {
            env.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn defaults_without_flags() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.level, LevelId::new(DEFAULT_LEVEL));
        assert_eq!(args.player, None);
        assert!(!args.wait_remote);
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--level", "4", "--player", "Ada", "--wait-remote", "--db", "sqlite::memory:"],
            &[("QUIZ_LEVEL", "3"), ("QUIZ_DB_URL", "sqlite://env.sqlite3")],
        )
        .unwrap();
        assert_eq!(args.level, LevelId::new(4));
        assert_eq!(args.player.as_deref(), Some("Ada"));
        assert!(args.wait_remote);
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn environment_level_is_used() {
        let args = parse(&[], &[("QUIZ_LEVEL", "5")]).unwrap();
        assert_eq!(args.level, LevelId::new(5));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(matches!(
            parse(&["--level", "high"], &[]),
            Err(ArgsError::InvalidLevel { .. })
        ));
        assert!(matches!(
            parse(&["--player"], &[]),
            Err(ArgsError::MissingValue { flag: "--player" })
        ));
        assert!(matches!(
            parse(&["--colour"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["--db", " "], &[]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".to_string()),
            "sqlite::memory:"
        );
    }
}
