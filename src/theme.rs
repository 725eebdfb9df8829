use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The persisted appearance flag: `theme = "light" | "dark"` in config.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hex color as written in a palette file, e.g. `"#1e293b"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
struct Hex(Color);

impl TryFrom<String> for Hex {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex(&value)
            .map(Hex)
            .ok_or_else(|| format!("invalid color {:?}", value))
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let digits = value.trim().strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let rgb = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

// Palette files under themes/, one per mode, in the Alacritty `[colors.*]` layout.
#[derive(Debug, Deserialize)]
struct PaletteFile {
    colors: Palette,
}

#[derive(Debug, Deserialize)]
struct Palette {
    primary: Pair,
    cursor: CursorPair,
    selection: SelectionPair,
    normal: Ansi,
    bright: Ansi,
}

#[derive(Debug, Deserialize)]
struct Pair {
    background: Hex,
    foreground: Hex,
}

#[derive(Debug, Deserialize)]
struct CursorPair {
    text: Hex,
    cursor: Hex,
}

#[derive(Debug, Deserialize)]
struct SelectionPair {
    text: Hex,
    background: Hex,
}

#[derive(Debug, Deserialize)]
struct Ansi {
    black: Hex,
    red: Hex,
    green: Hex,
    yellow: Hex,
    blue: Hex,
    magenta: Hex,
    cyan: Hex,
    white: Hex,
}

fn bundled_palette(mode: ThemeMode) -> Option<Palette> {
    let content = match mode {
        ThemeMode::Light => include_str!("../themes/focusx-light.toml"),
        ThemeMode::Dark => include_str!("../themes/focusx-dark.toml"),
    };
    match toml::from_str::<PaletteFile>(content) {
        Ok(file) => Some(file.colors),
        Err(e) => {
            log::warn!("invalid {} palette: {}", mode, e);
            None
        }
    }
}

/// Colors the UI draws with, resolved for one mode.
#[derive(Debug, Clone)]
pub struct Theme {
    pub mode: ThemeMode,

    pub background: Color,
    pub foreground: Color,

    pub cursor_text: Color,
    pub cursor: Color,

    pub selection_text: Color,
    pub selection_bg: Color,

    pub black: Color,
    pub red: Color,
    pub green: Color,
    pub yellow: Color,
    pub blue: Color,
    pub magenta: Color,
    pub cyan: Color,
    pub white: Color,

    pub bright_black: Color,
    pub bright_red: Color,
    pub bright_green: Color,
    pub bright_yellow: Color,
    pub bright_blue: Color,
    pub bright_magenta: Color,
    pub bright_cyan: Color,
    pub bright_white: Color,
}

impl Theme {
    fn from_palette(mode: ThemeMode, p: &Palette) -> Self {
        let (n, b) = (&p.normal, &p.bright);
        Self {
            mode,
            background: p.primary.background.0,
            foreground: p.primary.foreground.0,
            cursor_text: p.cursor.text.0,
            cursor: p.cursor.cursor.0,
            selection_text: p.selection.text.0,
            selection_bg: p.selection.background.0,
            black: n.black.0,
            red: n.red.0,
            green: n.green.0,
            yellow: n.yellow.0,
            blue: n.blue.0,
            magenta: n.magenta.0,
            cyan: n.cyan.0,
            white: n.white.0,
            bright_black: b.black.0,
            bright_red: b.red.0,
            bright_green: b.green.0,
            bright_yellow: b.yellow.0,
            bright_blue: b.blue.0,
            bright_magenta: b.magenta.0,
            bright_cyan: b.cyan.0,
            bright_white: b.white.0,
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match bundled_palette(mode) {
            Some(palette) => Self::from_palette(mode, &palette),
            None => Self::fallback(mode),
        }
    }

    /// Terminal palette, used only if a bundled palette fails to parse.
    fn fallback(mode: ThemeMode) -> Self {
        let (background, foreground) = match mode {
            ThemeMode::Light => (Color::White, Color::Black),
            ThemeMode::Dark => (Color::Black, Color::White),
        };
        Self {
            mode,
            background,
            foreground,
            cursor_text: background,
            cursor: foreground,
            selection_text: foreground,
            selection_bg: Color::DarkGray,
            black: Color::Black,
            red: Color::Red,
            green: Color::Green,
            yellow: Color::Yellow,
            blue: Color::Blue,
            magenta: Color::Magenta,
            cyan: Color::Cyan,
            white: Color::Gray,
            bright_black: Color::DarkGray,
            bright_red: Color::LightRed,
            bright_green: Color::LightGreen,
            bright_yellow: Color::LightYellow,
            bright_blue: Color::LightBlue,
            bright_magenta: Color::LightMagenta,
            bright_cyan: Color::LightCyan,
            bright_white: Color::White,
        }
    }

    /// Accent used for the brand, focused borders and the saved badge.
    pub fn accent(&self) -> Color {
        match self.mode {
            ThemeMode::Light => self.yellow,
            ThemeMode::Dark => self.green,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}
