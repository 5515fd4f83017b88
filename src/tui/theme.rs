use ratatui::style::Color;

use crate::model::Priority;

/// Color palette for the TUI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub dark: bool,
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub green: Color,
    pub selection_bg: Color,
    /// Header colors for buckets A through E
    pub buckets: [Color; 5],
}

impl Default for Theme {
    fn default() -> Self {
        Theme::light()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            dark: true,
            background: Color::Rgb(0x12, 0x14, 0x1A),
            text: Color::Rgb(0xC8, 0xCC, 0xD4),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFF, 0x6B, 0x5B),
            dim: Color::Rgb(0x6E, 0x75, 0x82),
            red: Color::Rgb(0xFF, 0x55, 0x55),
            green: Color::Rgb(0x5F, 0xD7, 0x87),
            selection_bg: Color::Rgb(0x2A, 0x2F, 0x3A),
            buckets: [
                Color::Rgb(0xFF, 0x55, 0x55),
                Color::Rgb(0xFF, 0xA6, 0x4D),
                Color::Rgb(0xFF, 0xD7, 0x00),
                Color::Rgb(0x5F, 0xD7, 0x87),
                Color::Rgb(0x6C, 0xA8, 0xFF),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            dark: false,
            background: Color::Rgb(0xFA, 0xFA, 0xF7),
            text: Color::Rgb(0x33, 0x36, 0x3D),
            text_bright: Color::Rgb(0x00, 0x00, 0x00),
            highlight: Color::Rgb(0xD9, 0x48, 0x3B),
            dim: Color::Rgb(0x8A, 0x8F, 0x98),
            red: Color::Rgb(0xC6, 0x28, 0x28),
            green: Color::Rgb(0x2E, 0x7D, 0x32),
            selection_bg: Color::Rgb(0xE4, 0xE8, 0xF0),
            buckets: [
                Color::Rgb(0xC6, 0x28, 0x28),
                Color::Rgb(0xE0, 0x6C, 0x00),
                Color::Rgb(0xA6, 0x7C, 0x00),
                Color::Rgb(0x2E, 0x7D, 0x32),
                Color::Rgb(0x15, 0x65, 0xC0),
            ],
        }
    }

    /// Palette for the saved `darkMode` preference
    pub fn for_mode(dark: bool) -> Self {
        if dark { Theme::dark() } else { Theme::light() }
    }

    pub fn bucket_color(&self, priority: Priority) -> Color {
        self.buckets[priority.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_mode() {
        assert!(Theme::for_mode(true).dark);
        assert!(!Theme::for_mode(false).dark);
        assert_ne!(Theme::dark().background, Theme::light().background);
    }

    #[test]
    fn test_default_is_light() {
        assert_eq!(Theme::default(), Theme::light());
    }

    #[test]
    fn test_bucket_color() {
        let theme = Theme::dark();
        assert_eq!(theme.bucket_color(Priority::A), theme.buckets[0]);
        assert_eq!(theme.bucket_color(Priority::E), theme.buckets[4]);
    }
}
