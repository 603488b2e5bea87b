//! Custom widgets for the review TUI.

use flashdeck::{DeckStats, ReviewRating};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};

use super::theme::Theme;

// ══════════════════════════════════════════════════════════════════════════
// Logo Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Logo;

impl Logo {
    const ART: &'static str = r#"
    ╭──────────────────────────────────────╮
    │   ┌─┐┬  ┌─┐┌─┐┬ ┬┌┬┐┌─┐┌─┐┬┌─        │
    │   ├┤ │  ├─┤└─┐├─┤ ││├┤ │  ├┴┐        │
    │   └  ┴─┘┴ ┴└─┘┴ ┴─┴┘└─┘└─┘┴ ┴        │
    │      generate · review · remember    │
    ╰──────────────────────────────────────╯"#;

    pub fn render_to(theme: &Theme, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = Self::ART
            .lines()
            .skip(1)
            .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.colors.primary))))
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Stats Bar Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct StatsBar<'a> {
    stats: DeckStats,
    theme: &'a Theme,
}

impl<'a> StatsBar<'a> {
    pub fn new(stats: DeckStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }

    fn entry(&self, label: &'a str, value: usize, style: Style) -> Line<'a> {
        Line::from(vec![
            Span::styled("● ", style),
            Span::styled(label, Style::default().fg(self.theme.colors.muted)),
            Span::styled(value.to_string(), style),
        ])
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

        let lines = [
            self.entry("New: ", self.stats.new_cards, self.theme.stats_new()),
            self.entry("Learning: ", self.stats.learning_cards, self.theme.stats_learning()),
            self.entry("Due: ", self.stats.due_cards, self.theme.stats_due()),
            Line::from(vec![
                Span::styled("Total: ", Style::default().fg(self.theme.colors.muted)),
                Span::styled(
                    self.stats.total_cards.to_string(),
                    Style::default().fg(self.theme.colors.dim),
                ),
            ]),
        ];

        for (line, chunk) in lines.into_iter().zip(chunks.iter()) {
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(*chunk, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Flashcard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FlashcardWidget<'a> {
    content: &'a str,
    is_front: bool,
    /// Keyword or image reference shown under the answer.
    detail: Option<String>,
    theme: &'a Theme,
}

impl<'a> FlashcardWidget<'a> {
    pub fn new(content: &'a str, is_front: bool, theme: &'a Theme) -> Self {
        Self { content, is_front, detail: None, theme }
    }

    pub fn detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

impl Widget for FlashcardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, label_style, border_style) = if self.is_front {
            ("QUESTION", self.theme.card_front(), Style::default().fg(self.theme.colors.accent))
        } else {
            ("ANSWER", self.theme.card_back(), Style::default().fg(self.theme.colors.success))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(label, label_style),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = self
            .content
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(self.theme.colors.text))))
            .collect();
        if let Some(detail) = self.detail {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                detail,
                Style::default().fg(self.theme.colors.muted),
            )));
        }

        // Center vertically
        let content_height = lines.len() as u16;
        let vertical_padding = inner.height.saturating_sub(content_height) / 2;

        let content_area = Rect {
            x: inner.x + 2,
            y: inner.y + vertical_padding,
            width: inner.width.saturating_sub(4),
            height: inner.height.saturating_sub(vertical_padding),
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Rating Buttons Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct RatingButtons<'a> {
    intervals: &'a [(ReviewRating, String)],
    enabled: bool,
    theme: &'a Theme,
}

impl<'a> RatingButtons<'a> {
    pub fn new(intervals: &'a [(ReviewRating, String)], enabled: bool, theme: &'a Theme) -> Self {
        Self { intervals, enabled, theme }
    }
}

impl Widget for RatingButtons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

        for (i, ((rating, interval), chunk)) in self.intervals.iter().zip(chunks.iter()).enumerate() {
            let color = if self.enabled {
                self.theme.rating_color(*rating)
            } else {
                self.theme.colors.dim
            };

            let button = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color));

            let inner = button.inner(*chunk);
            button.render(*chunk, buf);

            let mut lines = vec![
                Line::from(Span::styled(
                    (i + 1).to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(rating.name(), Style::default().fg(color))),
            ];
            if self.enabled {
                lines.push(Line::from(Span::styled(
                    interval.as_str(),
                    Style::default().fg(self.theme.colors.muted),
                )));
            }

            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .render(inner, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {} ", desc), self.theme.key_hint()),
                    Span::styled("│ ", Style::default().fg(self.theme.colors.dim)),
                ]
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Completion Screen Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct CompletionScreen<'a> {
    cards_studied: usize,
    cards_recalled: usize,
    duration_mins: u64,
    theme: &'a Theme,
}

impl<'a> CompletionScreen<'a> {
    pub fn new(cards_studied: usize, cards_recalled: usize, duration_mins: u64, theme: &'a Theme) -> Self {
        Self {
            cards_studied,
            cards_recalled,
            duration_mins,
            theme,
        }
    }

    fn stat_line(&self, label: &'a str, value: String) -> Line<'a> {
        Line::from(vec![
            Span::styled(label, Style::default().fg(self.theme.colors.muted)),
            Span::styled(
                value,
                Style::default().fg(self.theme.colors.primary).add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

impl Widget for CompletionScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.success))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("SESSION COMPLETE", self.theme.card_back()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Great job!",
                Style::default().fg(self.theme.colors.success).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            self.stat_line("Reviews: ", self.cards_studied.to_string()),
            self.stat_line("Recalled: ", format!("{}/{}", self.cards_recalled, self.cards_studied)),
            self.stat_line("Time: ", format!("{} minutes", self.duration_mins)),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(self.theme.colors.dim)),
                Span::styled("ESC", self.theme.key_highlight()),
                Span::styled(" to return", Style::default().fg(self.theme.colors.dim)),
            ]),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
