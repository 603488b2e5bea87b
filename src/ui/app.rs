//! Main application state and logic.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use flashdeck::config::Config;
use flashdeck::models::today;
use flashdeck::sm2::preview_intervals;
use flashdeck::{Deck, DeckRepository, ReviewRating, StoreHealth};
use log::warn;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::theme::Theme;
use super::widgets::{CompletionScreen, FlashcardWidget, KeyHints, Logo, RatingButtons, StatsBar};

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    DeckSelect,
    Study,
    Complete,
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    pub config_path: PathBuf,
    pub theme: Theme,

    pub repo: DeckRepository,

    // Deck selection
    pub decks: Vec<Deck>,
    pub deck_list_state: ListState,

    // Current deck
    pub current_deck: Option<Deck>,

    // Study state
    pub study_queue: Vec<usize>, // Indices into deck.cards
    pub current_card_idx: Option<usize>,
    pub showing_answer: bool,
    pub cards_studied: usize,
    pub cards_recalled: usize,
    pub session_start: Option<Instant>,
    pub interval_preview: [(ReviewRating, String); 3],

    // Status message (shown temporarily)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(repo: DeckRepository, config: Config, config_path: PathBuf) -> Self {
        let theme = Theme::from_name(&config.theme);

        let mut app = Self {
            screen: Screen::DeckSelect,
            running: true,
            config,
            config_path,
            theme,
            repo,
            decks: Vec::new(),
            deck_list_state: ListState::default().with_selected(Some(0)),
            current_deck: None,
            study_queue: Vec::new(),
            current_card_idx: None,
            showing_answer: false,
            cards_studied: 0,
            cards_recalled: 0,
            session_start: None,
            interval_preview: ReviewRating::ALL.map(|r| (r, String::new())),
            status_message: None,
        };
        app.refresh_deck_list();
        app
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    pub fn refresh_deck_list(&mut self) {
        match self.repo.load() {
            Ok(report) => {
                if let StoreHealth::Recovered { backup, .. } = &report.health {
                    let kept = backup
                        .as_ref()
                        .map(|p| format!(", kept as {}", p.display()))
                        .unwrap_or_default();
                    self.set_status(format!("Deck file was unreadable and was reset{}", kept));
                }
                let today = today();
                self.decks = report.decks;
                for deck in &mut self.decks {
                    deck.refresh_counters(today);
                }
            }
            Err(e) => self.set_status(format!("Could not load decks: {}", e)),
        }

        if self.decks.is_empty() {
            self.deck_list_state.select(None);
        } else if self.deck_list_state.selected().map_or(true, |i| i >= self.decks.len()) {
            self.deck_list_state.select(Some(self.decks.len() - 1));
        }
    }

    pub fn delete_selected_deck(&mut self) {
        let Some(deck) = self.deck_list_state.selected().and_then(|i| self.decks.get(i)) else {
            return;
        };
        let (id, name) = (deck.id.clone(), deck.name.clone());

        match self.repo.delete_deck(&id) {
            Ok(_) => self.set_status(format!("Deleted '{}'", name)),
            Err(e) => self.set_status(format!("Delete failed: {}", e)),
        }
        self.refresh_deck_list();
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!("could not save theme choice: {:#}", e);
        }
    }

    pub fn select_deck(&mut self, index: usize) {
        if let Some(deck) = self.decks.get(index) {
            self.current_deck = Some(deck.clone());
            self.start_study();
        }
    }

    pub fn start_study(&mut self) {
        let Some(ref deck) = self.current_deck else {
            return;
        };
        let today = today();

        // Due cards that have been seen before come first
        self.study_queue = (0..deck.cards.len())
            .filter(|&i| deck.cards[i].is_due(today) && !deck.cards[i].is_new())
            .collect();

        self.study_queue.extend(
            (0..deck.cards.len())
                .filter(|&i| deck.cards[i].is_new() && deck.cards[i].is_due(today))
                .take(self.config.new_cards_per_session),
        );

        if self.study_queue.is_empty() {
            let message = format!("Nothing due in '{}'", deck.name);
            self.current_deck = None;
            self.set_status(message);
            return;
        }

        self.cards_studied = 0;
        self.cards_recalled = 0;
        self.session_start = Some(Instant::now());
        self.screen = Screen::Study;

        self.next_card();
    }

    pub fn next_card(&mut self) {
        if self.study_queue.is_empty() {
            self.screen = Screen::Complete;
            return;
        }

        self.current_card_idx = Some(self.study_queue.remove(0));
        self.showing_answer = false;

        if let (Some(deck), Some(idx)) = (&self.current_deck, self.current_card_idx) {
            self.interval_preview = preview_intervals(&deck.cards[idx]);
        }
    }

    pub fn show_answer(&mut self) {
        self.showing_answer = true;
    }

    pub fn rate_card(&mut self, rating: ReviewRating) {
        if !self.showing_answer {
            return;
        }

        let (Some(deck), Some(idx)) = (&mut self.current_deck, self.current_card_idx) else {
            return;
        };
        let quality = rating.quality();

        match self.repo.review(&deck.id, &deck.cards[idx].id, quality) {
            Ok(card) => {
                deck.cards[idx] = card;
                deck.studied = true;
                deck.refresh_counters(today());
                self.cards_studied += 1;
                if quality.is_passing() {
                    self.cards_recalled += 1;
                } else {
                    // Forgotten cards come back later in the session
                    self.study_queue.push(idx);
                }
                self.next_card();
            }
            Err(e) => {
                let message = format!("Review not saved: {}", e);
                self.set_status(message);
            }
        }
    }

    fn leave_deck(&mut self) {
        self.screen = Screen::DeckSelect;
        self.current_deck = None;
        self.current_card_idx = None;
        self.study_queue.clear();
        self.refresh_deck_list();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }

                match self.screen {
                    Screen::DeckSelect => self.handle_deck_select_keys(key.code),
                    Screen::Study => self.handle_study_keys(key.code),
                    Screen::Complete => self.handle_complete_keys(key.code),
                }
            }
        }
        Ok(())
    }

    fn handle_deck_select_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.delete_selected_deck(),
            KeyCode::Char('r') => self.refresh_deck_list(),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.deck_list_state.selected().unwrap_or(0);
                let new_i = if i == 0 {
                    self.decks.len().saturating_sub(1)
                } else {
                    i - 1
                };
                self.deck_list_state.select(Some(new_i));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.deck_list_state.selected().unwrap_or(0);
                let new_i = if i >= self.decks.len().saturating_sub(1) {
                    0
                } else {
                    i + 1
                };
                self.deck_list_state.select(Some(new_i));
            }
            KeyCode::Enter => {
                if let Some(i) = self.deck_list_state.selected() {
                    self.select_deck(i);
                }
            }
            _ => {}
        }
    }

    fn handle_study_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.leave_deck(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if !self.showing_answer {
                    self.show_answer();
                }
            }
            KeyCode::Char(c) => {
                if let Some(rating) = ReviewRating::from_key(c) {
                    self.rate_card(rating);
                }
            }
            _ => {}
        }
    }

    fn handle_complete_keys(&mut self, key: KeyCode) {
        if let KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') = key {
            self.leave_deck();
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.surface)),
            area,
        );

        match self.screen {
            Screen::DeckSelect => self.render_deck_select(frame, area),
            Screen::Study => self.render_study(frame, area),
            Screen::Complete => self.render_complete(frame, area),
        }
    }

    fn render_deck_select(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2), // Top padding
            Constraint::Length(6), // Logo
            Constraint::Length(2), // Spacing
            Constraint::Min(5),    // Deck list
            Constraint::Length(3), // Help
        ])
        .split(area);

        Logo::render_to(&self.theme, chunks[1], frame.buffer_mut());

        let list_area = centered_rect(60, 100, chunks[3]);

        let items: Vec<ListItem> = self
            .decks
            .iter()
            .map(|deck| {
                let due_style = if deck.due > 0 {
                    self.theme.stats_due()
                } else {
                    Style::default().fg(self.theme.colors.dim)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(&deck.name, Style::default().add_modifier(Modifier::BOLD)),
                    Span::styled(
                        format!(" ({} cards, {} learned) ", deck.total, deck.learned),
                        Style::default().fg(self.theme.colors.muted),
                    ),
                    Span::styled(format!("{} due", deck.due), due_style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.primary))
                    .title(" Decks ")
                    .title_style(self.theme.highlight()),
            )
            .highlight_style(self.theme.selected())
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, list_area, &mut self.deck_list_state);

        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let hints_data: [(&str, &str); 6] = [
            ("j/k", "nav"),
            ("Enter", "study"),
            ("d", "del"),
            ("r", "reload"),
            ("t", &theme_hint),
            ("q", "quit"),
        ];
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[4]);

        self.render_status(frame, chunks[4]);
    }

    /// Show the status message just above `anchor` for a few seconds.
    fn render_status(&self, frame: &mut Frame, anchor: Rect) {
        if let Some((ref msg, time)) = self.status_message {
            if time.elapsed().as_secs() < 5 {
                let status = Paragraph::new(msg.as_str())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(self.theme.colors.warning));
                let status_area = Rect {
                    x: anchor.x,
                    y: anchor.y.saturating_sub(1),
                    width: anchor.width,
                    height: 1,
                };
                frame.render_widget(status, status_area);
            }
        }
    }

    fn render_study(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Stats
            Constraint::Length(1), // Separator
            Constraint::Min(10),   // Card
            Constraint::Length(1), // Separator
            Constraint::Length(5), // Buttons
            Constraint::Length(2), // Hints
        ])
        .split(area);

        if let Some(ref deck) = self.current_deck {
            let header = Paragraph::new(Line::from(Span::styled(&deck.name, self.theme.title())))
                .alignment(Alignment::Center);
            frame.render_widget(header, chunks[0]);

            frame.render_widget(StatsBar::new(deck.get_stats(today()), &self.theme), chunks[1]);
        }

        let card_area = centered_rect(80, 100, chunks[3]);

        if let (Some(ref deck), Some(idx)) = (&self.current_deck, self.current_card_idx) {
            let card = &deck.cards[idx];
            let widget = if self.showing_answer {
                let detail = match (&card.image, &card.keyword) {
                    (Some(image), _) => Some(format!("Image: {}", image)),
                    (None, Some(keyword)) => Some(format!("Keyword: {}", keyword)),
                    (None, None) => None,
                };
                FlashcardWidget::new(&card.answer, false, &self.theme).detail(detail)
            } else {
                FlashcardWidget::new(&card.question, true, &self.theme)
            };
            frame.render_widget(widget, card_area);
        }

        let buttons_area = centered_rect(90, 100, chunks[5]);
        frame.render_widget(
            RatingButtons::new(&self.interval_preview, self.showing_answer, &self.theme),
            buttons_area,
        );

        let hints = if self.showing_answer {
            KeyHints::new(
                &[("1", "Forgot"), ("2", "Hard"), ("3", "Easy"), ("Esc", "quit")],
                &self.theme,
            )
        } else {
            KeyHints::new(&[("Space", "show answer"), ("Esc", "quit")], &self.theme)
        };
        frame.render_widget(hints, chunks[6]);

        self.render_status(frame, chunks[6]);
    }

    fn render_complete(&mut self, frame: &mut Frame, area: Rect) {
        let card_area = centered_rect(50, 40, area);

        let duration_mins = self
            .session_start
            .map(|s| s.elapsed().as_secs() / 60)
            .unwrap_or(0);

        frame.render_widget(
            CompletionScreen::new(self.cards_studied, self.cards_recalled, duration_mins, &self.theme),
            card_area,
        );
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashdeck::{assemble_deck, DeckStore, RawCard};

    fn app_with_deck(dir: &tempfile::TempDir, cards: usize) -> App {
        let store = DeckStore::new(dir.path().join("decks.json")).unwrap();
        let repo = DeckRepository::new(store);
        let raw = (0..cards)
            .map(|i| RawCard::new(format!("Q{}", i), format!("A{}", i)))
            .collect();
        repo.insert_deck(assemble_deck("Deck", "", raw).unwrap()).unwrap();
        App::new(repo, Config::default(), dir.path().join("config.toml"))
    }

    #[test]
    fn test_session_requeues_forgotten_cards() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_deck(&dir, 2);

        app.select_deck(0);
        assert_eq!(app.screen, Screen::Study);

        // Rating before the answer is shown does nothing
        app.rate_card(ReviewRating::Easy);
        assert_eq!(app.cards_studied, 0);

        app.show_answer();
        app.rate_card(ReviewRating::Forgot);
        app.show_answer();
        app.rate_card(ReviewRating::Easy);
        assert_eq!(app.screen, Screen::Study);

        // The forgotten card is shown again
        app.show_answer();
        app.rate_card(ReviewRating::Hard);
        assert_eq!(app.screen, Screen::Complete);
        assert_eq!(app.cards_studied, 3);
        assert_eq!(app.cards_recalled, 2);

        let stored = app.repo.store().load_all().remove(0);
        assert!(stored.studied);
        assert_eq!(stored.learned, 2);
        assert_eq!(stored.due, 0);
    }

    #[test]
    fn test_new_card_cap_and_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_deck(&dir, 5);
        app.config.new_cards_per_session = 2;

        app.select_deck(0);
        assert_eq!(app.study_queue.len(), 1);

        app.show_answer();
        app.rate_card(ReviewRating::Easy);
        app.show_answer();
        app.rate_card(ReviewRating::Easy);
        assert_eq!(app.screen, Screen::Complete);

        app.leave_deck();
        app.config.new_cards_per_session = 0;
        app.select_deck(0);
        assert_eq!(app.screen, Screen::DeckSelect);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_delete_selected_deck() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_deck(&dir, 1);

        app.delete_selected_deck();
        assert!(app.decks.is_empty());
        assert_eq!(app.deck_list_state.selected(), None);
    }
}
