//! Colour palettes for the review screens.

use flashdeck::ReviewRating;
use ratatui::style::{Color, Modifier, Style};

/// Colours a palette assigns to each role on screen.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,
    pub surface: Color,
    pub selection: Color,
    pub text: Color,
    pub muted: Color,
    pub dim: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Default,
    Gruvbox,
}

impl ThemeName {
    const ALL: [ThemeName; 2] = [ThemeName::Default, ThemeName::Gruvbox];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::Gruvbox => "gruvbox",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::Gruvbox => "Gruvbox",
        }
    }

    /// Unknown names fall back to the default palette.
    pub fn parse(s: &str) -> Self {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .unwrap_or(ThemeName::Default)
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|n| n == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Default => ThemeColors {
                primary: Color::Rgb(56, 189, 248),
                accent: Color::Rgb(167, 139, 250),
                success: Color::Rgb(74, 222, 128),
                warning: Color::Rgb(251, 191, 36),
                danger: Color::Rgb(248, 113, 113),
                info: Color::Rgb(96, 165, 250),
                surface: Color::Rgb(17, 24, 39),
                selection: Color::Rgb(55, 65, 81),
                text: Color::Rgb(243, 244, 246),
                muted: Color::Rgb(156, 163, 175),
                dim: Color::Rgb(107, 114, 128),
            },
            ThemeName::Gruvbox => ThemeColors {
                primary: Color::Rgb(0x83, 0xA5, 0x98),
                accent: Color::Rgb(0xD3, 0x86, 0x9B),
                success: Color::Rgb(0xB8, 0xBB, 0x26),
                warning: Color::Rgb(0xFA, 0xBD, 0x2F),
                danger: Color::Rgb(0xFB, 0x49, 0x34),
                info: Color::Rgb(0x8E, 0xC0, 0x7C),
                surface: Color::Rgb(0x28, 0x28, 0x28),
                selection: Color::Rgb(0x50, 0x49, 0x45),
                text: Color::Rgb(0xEB, 0xDB, 0xB2),
                muted: Color::Rgb(0xBD, 0xAE, 0x93),
                dim: Color::Rgb(0x92, 0x83, 0x74),
            },
        };
        Self { name, colors }
    }

    pub fn from_name(name: &str) -> Self {
        Self::new(ThemeName::parse(name))
    }

    pub fn rating_color(&self, rating: ReviewRating) -> Color {
        match rating {
            ReviewRating::Forgot => self.colors.danger,
            ReviewRating::Hard => self.colors.warning,
            ReviewRating::Easy => self.colors.success,
        }
    }

    fn bold(color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Self::bold(self.colors.text)
    }

    pub fn highlight(&self) -> Style {
        Self::bold(self.colors.primary)
    }

    pub fn selected(&self) -> Style {
        Style::default().bg(self.colors.selection).fg(self.colors.text)
    }

    pub fn card_front(&self) -> Style {
        Self::bold(self.colors.accent)
    }

    pub fn card_back(&self) -> Style {
        Self::bold(self.colors.success)
    }

    pub fn stats_new(&self) -> Style {
        Self::bold(self.colors.info)
    }

    pub fn stats_learning(&self) -> Style {
        Self::bold(self.colors.warning)
    }

    pub fn stats_due(&self) -> Style {
        Self::bold(self.colors.success)
    }

    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.colors.dim)
    }

    pub fn key_highlight(&self) -> Style {
        Self::bold(self.colors.accent)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_names_round_trip() {
        for name in ThemeName::ALL {
            assert_eq!(ThemeName::parse(name.as_str()), name);
        }
        assert_eq!(ThemeName::parse(" Gruvbox "), ThemeName::Gruvbox);
        assert_eq!(ThemeName::parse("unknown"), ThemeName::Default);
        assert_eq!(ThemeName::Default.next(), ThemeName::Gruvbox);
        assert_eq!(ThemeName::Default.next().next(), ThemeName::Default);
    }

    #[test]
    fn test_rating_colors_differ() {
        let theme = Theme::default();
        assert_ne!(
            theme.rating_color(ReviewRating::Forgot),
            theme.rating_color(ReviewRating::Easy)
        );
        assert_ne!(
            theme.rating_color(ReviewRating::Hard),
            theme.rating_color(ReviewRating::Easy)
        );
    }
}
