mod language;
mod theme;

pub use language::{
    rules_for, HighlightError, HighlightKind, HighlightRule, HighlightToken, Highlighter, PYTHON_KEYWORDS,
};
pub use theme::{
    parse_color, parse_highlight_palette, Color, ColorParseError, HighlightPalette,
    HighlightStyle, ThemeParseError,
};
