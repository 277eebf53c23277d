use crossterm::style::Color;
use std::collections::HashMap;

use super::Highlight;
use crate::config::ColorSettings;

/// Resolved 256-color palette for highlight tags and editor chrome
#[derive(Debug, Clone)]
pub struct Theme {
    colors: HashMap<Highlight, Color>,
    pub background: Color,
    pub linenum: Color,
    pub linenum_bg: Color,
    pub status: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_settings(&ColorSettings::default())
    }
}

impl Theme {
    pub fn from_settings(settings: &ColorSettings) -> Self {
        let mut colors = HashMap::new();
        colors.insert(Highlight::Normal, Color::AnsiValue(settings.normal));
        colors.insert(Highlight::Function, Color::AnsiValue(settings.function));
        colors.insert(Highlight::Comment, Color::AnsiValue(settings.comment));
        colors.insert(Highlight::MlComment, Color::AnsiValue(settings.comment));
        colors.insert(Highlight::Keyword1, Color::AnsiValue(settings.keyword1));
        colors.insert(Highlight::Keyword2, Color::AnsiValue(settings.keyword2));
        colors.insert(Highlight::String, Color::AnsiValue(settings.string));
        colors.insert(Highlight::Number, Color::AnsiValue(settings.number));
        colors.insert(Highlight::Macro, Color::AnsiValue(settings.macro_color));
        colors.insert(Highlight::Match, Color::AnsiValue(settings.match_color));
        colors.insert(Highlight::Visual, Color::AnsiValue(settings.visual));

        Self {
            colors,
            background: Color::AnsiValue(settings.background),
            linenum: Color::AnsiValue(settings.linenum),
            linenum_bg: Color::AnsiValue(settings.linenum_bg),
            status: Color::AnsiValue(settings.status),
        }
    }

    /// Foreground color for a highlight tag
    pub fn color(&self, hl: Highlight) -> Color {
        self.colors
            .get(&hl)
            .copied()
            .unwrap_or(Color::Reset)
    }

    /// Overlay tags paint as a background so the text stays readable
    pub fn style(&self, hl: Highlight) -> (Color, Color) {
        match hl {
            Highlight::Match | Highlight::Visual => (self.background, self.color(hl)),
            _ => (self.color(hl), self.background),
        }
    }
}
