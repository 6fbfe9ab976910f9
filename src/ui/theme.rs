//! Theme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Brand Colors
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,

    // Semantic Colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Background Colors
    pub bg_dark: Color,
    pub bg_card: Color,
    pub bg_highlight: Color,

    // Text Colors
    pub text: Color,
    pub text_muted: Color,
    pub text_dim: Color,
}

/// Available theme names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Default,
    KanagawaWave,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::KanagawaWave => "kanagawa-wave",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::KanagawaWave => "Kanagawa Wave",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "kanagawa-wave" | "kanagawa_wave" | "kanagawa" => ThemeName::KanagawaWave,
            _ => ThemeName::Default,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Default => ThemeName::KanagawaWave,
            ThemeName::KanagawaWave => ThemeName::Default,
        }
    }
}

/// Theme struct that holds colors and provides style methods.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Default => Self::default_colors(),
            ThemeName::KanagawaWave => Self::kanagawa_wave_colors(),
        };
        Self { name, colors }
    }

    pub fn from_name(name: &str) -> Self {
        Self::new(ThemeName::parse(name))
    }

    fn default_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(20, 184, 166),      // Teal
            secondary: Color::Rgb(139, 92, 246),    // Violet
            accent: Color::Rgb(245, 158, 11),       // Amber

            success: Color::Rgb(34, 197, 94),       // Green
            warning: Color::Rgb(250, 204, 21),      // Yellow
            error: Color::Rgb(239, 68, 68),         // Red
            info: Color::Rgb(59, 130, 246),         // Blue

            bg_dark: Color::Rgb(15, 23, 42),        // Slate 900
            bg_card: Color::Rgb(30, 41, 59),        // Slate 800
            bg_highlight: Color::Rgb(71, 85, 105),  // Slate 600

            text: Color::Rgb(248, 250, 252),        // Slate 50
            text_muted: Color::Rgb(148, 163, 184),  // Slate 400
            text_dim: Color::Rgb(100, 116, 139),    // Slate 500
        }
    }

    /// Kanagawa Wave palette
    fn kanagawa_wave_colors() -> ThemeColors {
        ThemeColors {
            primary: Color::Rgb(0x7E, 0x9C, 0xD8),      // crystalBlue
            secondary: Color::Rgb(0x95, 0x7F, 0xB8),    // oniViolet
            accent: Color::Rgb(0xFF, 0xA0, 0x66),       // surimiOrange

            success: Color::Rgb(0x98, 0xBB, 0x6C),      // springGreen
            warning: Color::Rgb(0xFF, 0x9E, 0x3B),      // roninYellow
            error: Color::Rgb(0xE8, 0x24, 0x24),        // samuraiRed
            info: Color::Rgb(0x7F, 0xB4, 0xCA),         // springBlue

            bg_dark: Color::Rgb(0x16, 0x16, 0x1D),      // sumiInk0
            bg_card: Color::Rgb(0x1F, 0x1F, 0x28),      // sumiInk1
            bg_highlight: Color::Rgb(0x36, 0x36, 0x46), // sumiInk3

            text: Color::Rgb(0xDC, 0xD7, 0xBA),         // fujiWhite
            text_muted: Color::Rgb(0xC8, 0xC0, 0x93),   // oldWhite
            text_dim: Color::Rgb(0x54, 0x54, 0x6D),     // sumiInk4
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Styles
    // ══════════════════════════════════════════════════════════════════════

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.colors.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.colors.text_muted)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.colors.bg_highlight)
            .fg(self.colors.text)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.colors.primary)
        } else {
            Style::default().fg(self.colors.text_dim)
        }
    }

    pub fn prompt(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn pill_choice(&self) -> Style {
        Style::default()
            .fg(self.colors.bg_dark)
            .bg(self.colors.info)
            .add_modifier(Modifier::BOLD)
    }

    pub fn pill_typed(&self) -> Style {
        Style::default()
            .fg(self.colors.bg_dark)
            .bg(self.colors.secondary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn correct(&self) -> Style {
        Style::default()
            .fg(self.colors.success)
            .add_modifier(Modifier::BOLD)
    }

    pub fn wrong(&self) -> Style {
        Style::default()
            .fg(self.colors.error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn badge(&self) -> Style {
        Style::default()
            .fg(self.colors.warning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.colors.text_dim)
    }

    pub fn key_highlight(&self) -> Style {
        Style::default()
            .fg(self.colors.accent)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeName::Default)
    }
}

pub mod icons {
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";
    pub const FIRE: &str = "🔥";
    pub const STAR: &str = "★";
    pub const BOOK: &str = "📚";
}
