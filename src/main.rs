//! Flashdeck - review generated flashcard decks with SM-2 spaced repetition.

mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use flashdeck::assemble::{default_deck_name, default_description};
use flashdeck::config::Config;
use flashdeck::models::today;
use flashdeck::sm2::format_interval;
use flashdeck::{
    assemble_deck, attach_images, parse_model_output, DeckRepository, DeckStore, LocalImageDir,
    Quality, ReviewRating, StoreHealth,
};
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "flashdeck")]
#[command(author, version, about = "Spaced repetition for generated flashcard decks", long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Deck collection file, overriding the config
    #[arg(short, long, global = true)]
    decks_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a deck from generated cards (a JSON array of question/answer objects)
    Import {
        /// Completion model output to read
        cards: PathBuf,

        /// Deck name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Deck description
        #[arg(long)]
        description: Option<String>,

        /// Directory of images named after card keywords
        #[arg(long)]
        images: Option<PathBuf>,
    },

    /// List decks with their card counts
    List,

    /// Show cards due today
    Due {
        /// Only this deck
        #[arg(long)]
        deck: Option<String>,
    },

    /// Record a review: grade is forgot, hard, easy or 0-5
    Review {
        deck_id: String,
        card_id: String,
        grade: String,

        /// Clamp numeric grades outside 0-5 instead of rejecting them
        #[arg(long)]
        clamp: bool,
    },

    /// Delete a deck and all its cards
    Delete { deck_id: String },
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from(&config_path)?;
    let decks_file = args.decks_file.clone().unwrap_or_else(|| config.decks_file());

    let store = DeckStore::new(decks_file.clone())
        .with_context(|| format!("Failed to open deck store: {:?}", decks_file))?;
    let repo = DeckRepository::with_lock_timeout(store, config.lock_timeout());

    match args.command {
        None => {
            init_file_logging(&decks_file);
            run_tui(repo, config, config_path)
        }
        Some(command) => {
            init_logging();
            run_command(&repo, command)
        }
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Log to a file next to the deck store while the TUI owns the terminal.
fn init_file_logging(decks_file: &Path) {
    let log_path = decks_file.with_file_name("flashdeck.log");
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn run_command(repo: &DeckRepository, command: Command) -> Result<()> {
    match command {
        Command::Import {
            cards,
            name,
            description,
            images,
        } => {
            let text = fs::read_to_string(&cards)
                .with_context(|| format!("Failed to read {:?}", cards))?;
            let mut raw = parse_model_output(&text)?;

            if let Some(dir) = images {
                let attached = attach_images(&mut raw, &LocalImageDir::new(dir));
                println!("Attached {} images", attached);
            }

            let deck = assemble_deck(
                name.unwrap_or_else(|| default_deck_name(&cards)),
                description.unwrap_or_else(|| default_description(&cards)),
                raw,
            )?;
            if deck.cards.is_empty() {
                eprintln!("Warning: no cards were generated for '{}'", deck.name);
            }

            let (id, name, count) = (deck.id.clone(), deck.name.clone(), deck.cards.len());
            let health = repo.insert_deck(deck)?;
            warn_if_recovered(&health);
            println!("✓ Created deck '{}' with {} cards ({})", name, count, id);
        }

        Command::List => {
            let report = repo.load()?;
            warn_if_recovered(&report.health);

            let today = today();
            for mut deck in report.decks {
                deck.refresh_counters(today);
                println!(
                    "{}  {}  total {}  learned {}  due {}",
                    deck.id, deck.name, deck.total, deck.learned, deck.due
                );
            }
        }

        Command::Due { deck } => {
            let today = today();
            let decks = match deck {
                Some(id) => vec![repo.deck(&id)?],
                None => repo.decks()?,
            };
            for d in decks {
                for card in d.get_due_cards(today) {
                    println!("{}  {}  {}  (due {})", d.id, card.id, card.question, card.due);
                }
            }
        }

        Command::Review {
            deck_id,
            card_id,
            grade,
            clamp,
        } => {
            let quality = parse_grade(&grade, clamp)?;
            let card = repo.review(&deck_id, &card_id, quality)?;
            println!(
                "✓ Next review in {} on {} (ease {:.2}, streak {})",
                format_interval(card.interval),
                card.due,
                card.ease_factor,
                card.repetitions
            );
        }

        Command::Delete { deck_id } => {
            if repo.delete_deck(&deck_id)? {
                println!("✓ Deleted deck {}", deck_id);
            } else {
                bail!("no deck with id {}", deck_id);
            }
        }
    }

    Ok(())
}

/// Accept a button name or a raw 0-5 quality.
fn parse_grade(grade: &str, clamp: bool) -> Result<Quality> {
    if let Some(rating) = ReviewRating::from_name(grade) {
        return Ok(rating.quality());
    }
    let value: i64 = grade
        .parse()
        .with_context(|| format!("grade must be forgot, hard, easy or 0-5, got '{}'", grade))?;
    if clamp {
        return Ok(Quality::clamped(value));
    }
    Ok(Quality::new(value)?)
}

fn warn_if_recovered(health: &StoreHealth) {
    if let StoreHealth::Recovered { reason, backup } = health {
        eprintln!("Warning: deck file was {} and has been reset", reason);
        if let Some(path) = backup {
            eprintln!("         the previous contents were kept in {}", path.display());
        }
    }
}

fn run_tui(repo: DeckRepository, config: Config, config_path: PathBuf) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(repo, config, config_path);

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
    fn test_parse_grade() {
        assert_eq!(parse_grade("forgot", false).unwrap().value(), 1);
        assert_eq!(parse_grade("Hard", false).unwrap().value(), 3);
        assert_eq!(parse_grade("easy", false).unwrap().value(), 5);
        assert_eq!(parse_grade("0", false).unwrap().value(), 0);
        assert_eq!(parse_grade("4", false).unwrap().value(), 4);
        assert!(parse_grade("6", false).is_err());
        assert!(parse_grade("great", false).is_err());
    }

    #[test]
    fn test_parse_grade_clamped() {
        assert_eq!(parse_grade("9", true).unwrap().value(), 5);
        assert_eq!(parse_grade("-2", true).unwrap().value(), 0);
        assert_eq!(parse_grade("easy", true).unwrap().value(), 5);
        assert!(parse_grade("great", true).is_err());
    }

    #[test]
    fn test_cli_parses_review() {
        let args = Args::parse_from(["flashdeck", "review", "d1", "c1", "easy"]);
        match args.command {
            Some(Command::Review { deck_id, card_id, grade, clamp }) => {
                assert_eq!((deck_id.as_str(), card_id.as_str(), grade.as_str()), ("d1", "c1", "easy"));
                assert!(!clamp);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_import_command_creates_deck() {
        let dir = tempfile::tempdir().unwrap();
        let cards = dir.path().join("lecture 4.json");
        fs::write(
            &cards,
            r#"[{"question": "Q1", "answer": "A1"}, {"question": "Q2", "answer": "A2"}]"#,
        )
        .unwrap();
        let repo = DeckRepository::new(DeckStore::new(dir.path().join("decks.json")).unwrap());

        run_command(
            &repo,
            Command::Import {
                cards,
                name: None,
                description: None,
                images: None,
            },
        )
        .unwrap();

        let decks = repo.decks().unwrap();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].name, "lecture 4");
        assert_eq!(decks[0].description, "Generated from lecture 4.json");
        assert_eq!(decks[0].due, 2);
    }

    #[test]
    fn test_due_for_unknown_deck_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DeckRepository::new(DeckStore::new(dir.path().join("decks.json")).unwrap());

        let err = run_command(&repo, Command::Due { deck: Some("missing".into()) }).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
