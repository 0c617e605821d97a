//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tumbletiles::{Resources, TileColor};

/// One Dark tile palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours in `TileColor` order: red, blue, orange, grey, brown, green.
    pub tiles: [Color; TileColor::COUNT],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (counters, hints).
    pub main_fg: Color,
    /// Highlight / titles / cursor.
    pub title: Color,
    /// Secondary text and the connected-group preview.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Exact hex values from onedark.theme; brown and grey borrow its muted tones.
const ONEDARK: Theme = Theme {
    tiles: [
        Color::Rgb(0xE0, 0x6C, 0x75), // cpu_end / red
        Color::Rgb(0x61, 0xAF, 0xEF), // cpu_box / blue
        Color::Rgb(0xD1, 0x9A, 0x66), // temp_mid / orange
        Color::Rgb(0x7F, 0x84, 0x8E), // graph_text / grey
        Color::Rgb(0xBE, 0x50, 0x46), // used_end / dark red-brown
        Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
    ],
    bg: Color::Rgb(0x31, 0x35, 0x3F),          // meter_bg
    div_line: Color::Rgb(0x3F, 0x44, 0x4F),    // div_line
    main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),     // main_fg
    title: Color::Rgb(0xE5, 0xC0, 0x7B),       // title
    inactive_fg: Color::Rgb(0x5C, 0x63, 0x70), // inactive_fg
};

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        ONEDARK
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.tiles = [
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x99, 0x00),
                    Color::Rgb(0xC0, 0xC0, 0xC0),
                    Color::Rgb(0x99, 0x55, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                ];
            }
            crate::Palette::Colorblind => {
                // Tol "vibrant": red and green never sit next to each other in hue.
                self.tiles = [
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xBB, 0xBB, 0xBB),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0x00, 0x99, 0x88),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        let [red, blue, orange, grey, brown, green] = ONEDARK.tiles;
        Self {
            tiles: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(red),
                get("cpu_box").unwrap_or(blue),
                get("temp_mid").or_else(|| get("cpu_mid")).unwrap_or(orange),
                get("graph_text").unwrap_or(grey),
                get("used_end").unwrap_or(brown),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(green),
            ],
            bg: get("meter_bg").unwrap_or(ONEDARK.bg),
            div_line: get("div_line").unwrap_or(ONEDARK.div_line),
            main_fg: get("main_fg").unwrap_or(ONEDARK.main_fg),
            title: get("title").unwrap_or(ONEDARK.title),
            inactive_fg: get("inactive_fg").unwrap_or(ONEDARK.inactive_fg),
        }
    }

    #[inline]
    pub fn tile_color(&self, color: TileColor) -> Color {
        self.tiles[color.index()]
    }

    /// The palette as a per-colour handle store for the renderer.
    pub fn resources(&self) -> Resources<Color> {
        TileColor::ALL.into_iter().zip(self.tiles).collect()
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |digits: &str| {
        u8::from_str_radix(digits, 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    if !s.is_ascii() {
        return Err(ThemeError::InvalidHex(s.to_string()));
    }
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGHHII").is_err());
    }

    #[test]
    fn test_parse_hex_rejects_multibyte_digits() {
        assert!(matches!(parse_hex("#ééé"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("€€"), Err(ThemeError::InvalidHex(_))));
        assert!(parse_hex("#a€").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_keys_override_tiles() {
        let map = parse_theme_file("theme[cpu_box]=\"#010203\"\ntheme[main_fg]='#FFF'");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.tile_color(TileColor::Blue), Color::Rgb(1, 2, 3));
        assert_eq!(theme.main_fg, Color::Rgb(255, 255, 255));
        assert_eq!(theme.tile_color(TileColor::Red), ONEDARK.tiles[0]);
    }

    #[test]
    fn test_resources_cover_every_colour() {
        let res = Theme::default().resources();
        assert!(res.is_complete());
        assert_eq!(res.get(TileColor::Green), Some(&ONEDARK.tiles[5]));
    }
}
