//! Color themes for the terminal explorer.
//!
//! Four retro schemes selectable with `--theme` / `ECASHX_THEME`.

use ratatui::style::Color;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Nord-inspired muted colors (default)
    Nord,
    /// Bright white on blue
    DosBlue,
    /// Amber on black
    AmberCrt,
    /// Green on black
    GreenPhosphor,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::Nord,
        Theme::DosBlue,
        Theme::AmberCrt,
        Theme::GreenPhosphor,
    ];

    pub fn colors(&self) -> ColorScheme {
        match self {
            Theme::Nord => ColorScheme::nord(),
            Theme::DosBlue => ColorScheme::dos_blue(),
            Theme::AmberCrt => ColorScheme::amber_crt(),
            Theme::GreenPhosphor => ColorScheme::green_phosphor(),
        }
    }

    pub fn next(self) -> Theme {
        let idx = Theme::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Theme::ALL[(idx + 1) % Theme::ALL.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Nord
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "nord" => Ok(Theme::Nord),
            "dos" | "dosblue" | "dos-blue" => Ok(Theme::DosBlue),
            "amber" | "ambercrt" | "amber-crt" => Ok(Theme::AmberCrt),
            "green" | "greenphosphor" | "green-phosphor" => Ok(Theme::GreenPhosphor),
            _ => Err(anyhow::anyhow!(
                "Unknown theme '{s}'. Available: nord, dos-blue, amber-crt, green-phosphor"
            )),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Nord => write!(f, "nord"),
            Theme::DosBlue => write!(f, "dos-blue"),
            Theme::AmberCrt => write!(f, "amber-crt"),
            Theme::GreenPhosphor => write!(f, "green-phosphor"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
    /// Secondary info and `Small` digit groups
    pub text_dim: Color,
    /// Trailing zero groups of amounts and leading zeros of hashes
    pub zeros: Color,
    /// View title, active tab and column headers
    pub accent: Color,
    pub border: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    /// Page links in the pagination bar
    pub link: Color,
    pub current_page: Color,
    /// Incoming amounts
    pub positive: Color,
    /// Outgoing amounts
    pub negative: Color,
    pub toast_success: Color,
    pub toast_error: Color,
}

impl ColorScheme {
    pub fn nord() -> Self {
        Self {
            background: Color::Black,
            text: Color::White,
            text_dim: Color::Gray,
            zeros: Color::DarkGray,
            accent: Color::Cyan,
            border: Color::Gray,
            selection_bg: Color::Yellow,
            selection_fg: Color::Black,
            link: Color::LightBlue,
            current_page: Color::Yellow,
            positive: Color::Green,
            negative: Color::Red,
            toast_success: Color::Green,
            toast_error: Color::Red,
        }
    }

    pub fn dos_blue() -> Self {
        Self {
            background: Color::Blue,
            text: Color::White,
            text_dim: Color::LightBlue,
            zeros: Color::Rgb(90, 90, 200),
            accent: Color::Yellow,
            border: Color::Cyan,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            link: Color::LightCyan,
            current_page: Color::Yellow,
            positive: Color::LightGreen,
            negative: Color::LightRed,
            toast_success: Color::LightGreen,
            toast_error: Color::LightRed,
        }
    }

    pub fn amber_crt() -> Self {
        let amber = Color::Rgb(255, 176, 0);
        let amber_bright = Color::Rgb(255, 200, 100);
        let amber_dim = Color::Rgb(180, 120, 0);

        Self {
            background: Color::Black,
            text: amber,
            text_dim: amber_dim,
            zeros: Color::Rgb(110, 75, 0),
            accent: amber_bright,
            border: amber_dim,
            selection_bg: amber,
            selection_fg: Color::Black,
            link: amber_bright,
            current_page: Color::Rgb(255, 230, 160),
            positive: Color::Rgb(100, 255, 100),
            negative: Color::Red,
            toast_success: Color::Rgb(100, 255, 100),
            toast_error: Color::Red,
        }
    }

    pub fn green_phosphor() -> Self {
        let green = Color::Rgb(0, 255, 0);
        let green_dim = Color::Rgb(0, 180, 0);
        let green_bright = Color::Rgb(100, 255, 100);

        Self {
            background: Color::Black,
            text: green,
            text_dim: green_dim,
            zeros: Color::Rgb(0, 100, 0),
            accent: green_bright,
            border: green_dim,
            selection_bg: green,
            selection_fg: Color::Black,
            link: green_bright,
            current_page: Color::Rgb(180, 255, 180),
            positive: green_bright,
            negative: Color::Red,
            toast_success: green_bright,
            toast_error: Color::Red,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::nord()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parsing() {
        assert_eq!("nord".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("NORD".parse::<Theme>().unwrap(), Theme::Nord);
        assert_eq!("dos".parse::<Theme>().unwrap(), Theme::DosBlue);
        assert_eq!("amber-crt".parse::<Theme>().unwrap(), Theme::AmberCrt);
        assert_eq!("green".parse::<Theme>().unwrap(), Theme::GreenPhosphor);
        assert!("invalid".parse::<Theme>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for theme in Theme::ALL {
            assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
        }
    }

    #[test]
    fn test_cycle_visits_every_theme() {
        let mut t = Theme::Nord;
        for _ in 0..Theme::ALL.len() {
            t = t.next();
        }
        assert_eq!(t, Theme::Nord);
        assert_eq!(Theme::Nord.next(), Theme::DosBlue);
    }

    #[test]
    fn test_zeros_are_dimmer_than_text() {
        for theme in Theme::ALL {
            let c = theme.colors();
            assert_ne!(c.zeros, c.text);
            assert_ne!(c.selection_bg, c.selection_fg);
        }
    }
}
