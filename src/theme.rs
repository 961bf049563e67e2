//! UI palette, with optional hex-string overrides from the config file

use crate::config::ThemeOverrides;
use ratatui::style::Color;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active borders, highlights
    pub success: Color,     // Success notifications
    pub warning: Color,     // Info notifications, transient status
    pub danger: Color,      // Failure notifications
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Dimmed text, hints
    pub bg_selected: Color, // Selection background
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Table headers, popup titles
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback palette
        Self {
            accent: Color::Rgb(250, 179, 135),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(245, 194, 231),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Build the theme, applying any overrides from config
    pub fn load(overrides: Option<&ThemeOverrides>) -> Self {
        let mut theme = Self::default();

        if let Some(o) = overrides {
            apply(&mut theme.accent, o.accent.as_deref());
            apply(&mut theme.success, o.success.as_deref());
            apply(&mut theme.warning, o.warning.as_deref());
            apply(&mut theme.danger, o.danger.as_deref());
            apply(&mut theme.text, o.text.as_deref());
            apply(&mut theme.text_dim, o.text_dim.as_deref());
        }

        theme
    }
}

fn apply(slot: &mut Color, value: Option<&str>) {
    if let Some(s) = value {
        match parse_hex_color(s) {
            Some(color) => *slot = color,
            None => tracing::warn!("Ignoring invalid theme color: {}", s),
        }
    }
}

/// Parse a hex color string (#RRGGBB or #RGB)
fn parse_hex_color(s: &str) -> Option<Color> {
    let s = s.trim().trim_start_matches('#');

    if s.len() == 6 {
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
        let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
        let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("zzzzzz"), None);
    }

    #[test]
    fn test_overrides_applied() {
        let overrides = ThemeOverrides {
            danger: Some("#ff0000".to_string()),
            text: Some("bogus".to_string()), // Invalid: keeps the default
            ..Default::default()
        };

        let theme = Theme::load(Some(&overrides));
        assert_eq!(theme.danger, Color::Rgb(255, 0, 0));
        assert_eq!(theme.text, Theme::default().text);
    }
}
