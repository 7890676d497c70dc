use crate::language::HighlightKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    pub foreground: Color,
    pub italic: bool,
}

impl HighlightStyle {
    pub const fn plain(foreground: Color) -> Self {
        Self {
            foreground,
            italic: false,
        }
    }
}

/// Colors applied to each highlight kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightPalette {
    keyword: HighlightStyle,
    string: HighlightStyle,
    tag: HighlightStyle,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            keyword: HighlightStyle::plain(Color::rgb(0x5e, 0xa2, 0xff)),
            string: HighlightStyle::plain(Color::rgb(0xff, 0xcc, 0x66)),
            tag: HighlightStyle::plain(Color::rgb(0x66, 0xd9, 0xef)),
        }
    }
}

impl HighlightPalette {
    pub fn style_for(&self, kind: HighlightKind) -> &HighlightStyle {
        match kind {
            HighlightKind::Keyword => &self.keyword,
            HighlightKind::String => &self.string,
            HighlightKind::Tag => &self.tag,
        }
    }

    pub fn set(&mut self, kind: HighlightKind, style: HighlightStyle) {
        match kind {
            HighlightKind::Keyword => self.keyword = style,
            HighlightKind::String => self.string = style,
            HighlightKind::Tag => self.tag = style,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ThemeParseError {
    #[error("syntax entries must be objects")]
    InvalidSyntax,
    #[error("unknown highlight kind '{0}'")]
    UnknownKind(String),
    #[error("invalid color '{value}': {reason}")]
    InvalidColor {
        value: String,
        reason: ColorParseError,
    },
    #[error("entries must contain foreground color")]
    MissingForeground,
    #[error("unsupported style attribute '{0}'")]
    UnsupportedAttribute(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorParseError {
    MissingHash,
    InvalidLength,
    InvalidHex,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorParseError::MissingHash => write!(f, "missing leading '#'"),
            ColorParseError::InvalidLength => write!(f, "expected 6 or 8 hex digits"),
            ColorParseError::InvalidHex => write!(f, "contains non-hex digits"),
        }
    }
}

/// Builds a palette from a JSON object such as
/// `{"keyword": {"foreground": "#5ea2ff", "italic": true}}`. Kinds that are not
/// mentioned keep their default style; attributes other than `foreground` and
/// `italic` are rejected.
pub fn parse_highlight_palette(
    syntax_value: &serde_json::Value,
) -> Result<HighlightPalette, ThemeParseError> {
    let map = syntax_value
        .as_object()
        .ok_or(ThemeParseError::InvalidSyntax)?;
    let mut palette = HighlightPalette::default();
    for (name, entry) in map {
        let kind = match name.as_str() {
            "keyword" => HighlightKind::Keyword,
            "string" => HighlightKind::String,
            "tag" => HighlightKind::Tag,
            other => return Err(ThemeParseError::UnknownKind(other.to_string())),
        };
        palette.set(kind, parse_style(entry)?);
    }
    Ok(palette)
}

fn parse_style(value: &serde_json::Value) -> Result<HighlightStyle, ThemeParseError> {
    let map = value.as_object().ok_or(ThemeParseError::InvalidSyntax)?;
    if let Some(key) = map
        .keys()
        .find(|key| !matches!(key.as_str(), "foreground" | "italic"))
    {
        return Err(ThemeParseError::UnsupportedAttribute(key.clone()));
    }

    let foreground = map
        .get("foreground")
        .and_then(|value| value.as_str())
        .ok_or(ThemeParseError::MissingForeground)?;
    let foreground = parse_color(foreground).map_err(|reason| ThemeParseError::InvalidColor {
        value: foreground.to_string(),
        reason,
    })?;

    let italic = map
        .get("italic")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    Ok(HighlightStyle { foreground, italic })
}

pub fn parse_color(input: &str) -> Result<Color, ColorParseError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix('#')
        .ok_or(ColorParseError::MissingHash)?;
    if hex.len() != 6 && hex.len() != 8 {
        return Err(ColorParseError::InvalidLength);
    }
    let mut components = [0u8; 4];
    for index in 0..(hex.len() / 2) {
        let slice = hex
            .get(index * 2..index * 2 + 2)
            .ok_or(ColorParseError::InvalidHex)?;
        components[index] =
            u8::from_str_radix(slice, 16).map_err(|_| ColorParseError::InvalidHex)?;
    }
    if hex.len() == 6 {
        components[3] = 255;
    }
    Ok(Color {
        r: components[0],
        g: components[1],
        b: components[2],
        a: components[3],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_palette_matches_editor_colors() {
        let palette = HighlightPalette::default();
        assert_eq!(
            palette.style_for(HighlightKind::Keyword).foreground,
            Color::rgb(0x5e, 0xa2, 0xff)
        );
        assert_eq!(
            palette.style_for(HighlightKind::Tag).foreground,
            Color::rgb(0x66, 0xd9, 0xef)
        );
    }

    #[test]
    fn parses_partial_palette() {
        let value = json!({
            "string": {
                "foreground": "#11AAFF",
                "italic": true
            }
        });

        let palette = parse_highlight_palette(&value).unwrap();
        let string = palette.style_for(HighlightKind::String);
        assert_eq!(string.foreground, Color::rgb(0x11, 0xaa, 0xff));
        assert!(string.italic);
        assert_eq!(
            palette.style_for(HighlightKind::Keyword),
            HighlightPalette::default().style_for(HighlightKind::Keyword)
        );
    }

    #[test]
    fn rejects_unknown_kind_and_bad_colors() {
        let unknown = json!({ "comment": { "foreground": "#ffffff" } });
        assert!(matches!(
            parse_highlight_palette(&unknown),
            Err(ThemeParseError::UnknownKind(_))
        ));
        assert_eq!(parse_color("ffffff"), Err(ColorParseError::MissingHash));
        assert_eq!(parse_color("#fff"), Err(ColorParseError::InvalidLength));
        assert_eq!(parse_color("#gg0000"), Err(ColorParseError::InvalidHex));
        assert_eq!(parse_color("#00000080").unwrap().a, 0x80);
    }

    #[test]
    fn rejects_style_attributes_the_editor_cannot_draw() {
        let value = json!({ "keyword": { "foreground": "#ffffff", "bold": true } });
        match parse_highlight_palette(&value) {
            Err(ThemeParseError::UnsupportedAttribute(key)) => assert_eq!(key, "bold"),
            other => panic!("expected unsupported attribute error, got {other:?}"),
        }
    }
}
