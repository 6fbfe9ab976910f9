//! Vocab - vocabulary quiz trainer TUI
//!
//! Ten-question quizzes mixing multiple-choice and typed answers, with a
//! per-user miss list, day streaks and badges.

mod catalog;
mod clock;
mod config;
mod models;
mod quiz;
mod storage;
mod streak;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clock::Clock;
use models::Catalog;
use storage::{FileBackend, MemoryBackend, UserStore};
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "vocab")]
#[command(author, version, about = "Vocabulary quiz trainer", long_about = None)]
struct Args {
    /// Directory holding the user store and log file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Load the word list from a JSON file instead of the bundled one
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// Select (and create if needed) this user; with --stats, only report on it
    #[arg(short, long)]
    user: Option<String>,

    /// Print the user's progress and exit
    #[arg(long)]
    stats: bool,

    /// Treat this date (YYYY-MM-DD) as today, for trying out streaks
    #[arg(long, hide = true)]
    today: Option<chrono::NaiveDate>,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = args.data_dir.unwrap_or_else(UserStore::default_path);
    let mut store = open_store(&data_dir);

    let catalog = match args.words {
        Some(ref path) => Catalog::from_file(path)
            .with_context(|| format!("Failed to load word list {:?}", path))?,
        None => Catalog::bundled().context("Bundled word list is broken")?,
    };

    if args.stats {
        let name = match args.user {
            Some(ref name) => Some(
                UserStore::validate_name(name)
                    .with_context(|| format!("Invalid user name {:?}", name))?,
            ),
            None => store.last_active_user(),
        };
        return print_stats(&store, name);
    }

    if let Some(ref name) = args.user {
        store
            .select_user(name)
            .with_context(|| format!("Invalid user name {:?}", name))?;
    } else if let Some(last) = store.last_active_user().map(str::to_string) {
        if let Err(e) = store.ensure_user(&last) {
            warn!(error = %e, "ignoring last active user");
            store.clear_last_active_user();
        }
    }

    let clock = match args.today {
        Some(day) => Clock::on_day(day)
            .with_context(|| format!("{} does not exist in the local timezone", day))?,
        None => Clock::default(),
    };
    run_tui(store, catalog, clock)
}

/// Open the on-disk store, falling back to memory if the directory is unusable.
fn open_store(data_dir: &Path) -> UserStore {
    match fs::create_dir_all(data_dir) {
        Ok(()) => {
            if let Err(e) = init_logging(data_dir) {
                eprintln!("Warning: logging disabled: {}", e);
            }
            info!(dir = %data_dir.display(), "opening user store");
            UserStore::open(FileBackend::new(data_dir.to_path_buf()))
        }
        Err(e) => {
            eprintln!(
                "Warning: cannot use {:?} ({}), progress will not be saved",
                data_dir, e
            );
            UserStore::open(MemoryBackend::new())
        }
    }
}

/// Log to a file; the terminal belongs to the TUI.
fn init_logging(data_dir: &Path) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("vocab.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Report a user's progress without touching the store.
fn print_stats(store: &UserStore, name: Option<&str>) -> Result<()> {
    let known: Vec<&str> = store.user_names().collect();
    let Some((name, record)) = name.and_then(|n| store.record(n).ok().map(|r| (n, r))) else {
        if let Some(name) = name {
            println!("No progress recorded for {:?} yet.", name);
        }
        if known.is_empty() {
            println!("No user yet. Start the trainer or pass --user <NAME>.");
        } else {
            println!("Known users: {}. Pass --user <NAME>.", known.join(", "));
        }
        return Ok(());
    };
    let overview = record.overview();

    println!("User:      {}", name);
    println!("Answered:  {}", overview.total_answered);
    println!("Correct:   {}", overview.total_correct);
    println!("Accuracy:  {}%", overview.accuracy_percent);
    println!("Misses:    {}", overview.miss_count);
    println!("Streak:    {}", overview.streak);
    println!(
        "Badge:     {} ({}+ correct)",
        overview.badge.label(),
        overview.badge.threshold()
    );

    for entry in record.misses.values() {
        println!("  ✗ {} = {} (missed {}x)", entry.source, entry.target, entry.miss_count);
    }

    Ok(())
}

fn run_tui(store: UserStore, catalog: Catalog, clock: Clock) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let config = config::Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "using default config");
        config::Config::default()
    });

    let mut app = App::new(store, catalog, config, clock);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_for_unknown_user_leave_store_untouched() {
        let backend = MemoryBackend::new();
        let mut store = UserStore::open(backend.clone());
        store.select_user("kai").unwrap();

        print_stats(&store, Some("lena")).unwrap();

        let reopened = UserStore::open(backend);
        assert_eq!(reopened.user_names().collect::<Vec<_>>(), vec!["kai"]);
        assert_eq!(reopened.last_active_user(), Some("kai"));
    }

    #[test]
    fn stats_without_user_succeed() {
        let store = UserStore::open(MemoryBackend::new());
        print_stats(&store, None).unwrap();
        print_stats(&store, store.last_active_user()).unwrap();
    }
}
