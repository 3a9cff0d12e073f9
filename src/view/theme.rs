//! Colours used by the renderer

use crate::primitives::highlighter::HighlightCategory;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    pub editor_fg: Color,
    pub gutter_marker_fg: Color,

    pub keyword_fg: Color,
    pub string_fg: Color,
    pub number_fg: Color,
    pub comment_fg: Color,

    pub status_bar_fg: Color,
    pub status_bar_bg: Color,
    pub status_modified_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            editor_fg: Color::Reset,
            gutter_marker_fg: Color::Yellow,
            keyword_fg: Color::Magenta,
            string_fg: Color::Green,
            number_fg: Color::Cyan,
            comment_fg: Color::DarkGray,
            status_bar_fg: Color::Black,
            status_bar_bg: Color::Gray,
            status_modified_fg: Color::Red,
        }
    }
}

impl Theme {
    /// Foreground for a highlight category
    pub fn color_for(&self, category: HighlightCategory) -> Color {
        match category {
            HighlightCategory::Normal => self.editor_fg,
            HighlightCategory::Keyword => self.keyword_fg,
            HighlightCategory::String => self.string_fg,
            HighlightCategory::Number => self.number_fg,
            HighlightCategory::Comment => self.comment_fg,
        }
    }
}
