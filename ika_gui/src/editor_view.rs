//! 編輯器的語法著色與行號。 / Syntax colouring and the line-number gutter for the editor widget.

use std::ops::Range;

use eframe::egui;
use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId};
use ika_highlight::{Color, HighlightKind, HighlightPalette, HighlightToken};

/// Splits `len` bytes into consecutive runs, each either plain or coloured by one kind.
///
/// Tokens may overlap (a keyword inside a string literal). The token that
/// starts first owns the overlapping bytes.
pub fn paint_segments(
    len: usize,
    tokens: &[HighlightToken],
) -> Vec<(Range<usize>, Option<HighlightKind>)> {
    let mut ordered: Vec<&HighlightToken> = tokens.iter().collect();
    ordered.sort_by_key(|token| (token.range.start, token.kind));

    let mut segments = Vec::new();
    let mut cursor = 0;
    for token in ordered {
        let end = token.range.end.min(len);
        if end <= cursor {
            continue;
        }
        let start = token.range.start.max(cursor);
        if start > cursor {
            segments.push((cursor..start, None));
        }
        segments.push((start..end, Some(token.kind)));
        cursor = end;
    }
    if cursor < len {
        segments.push((cursor..len, None));
    }
    segments
}

/// Builds the galley description used by the editor's layouter.
pub fn layout_job(
    text: &str,
    tokens: &[HighlightToken],
    palette: &HighlightPalette,
    font_id: FontId,
    plain: Color32,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    for (range, kind) in paint_segments(text.len(), tokens) {
        let Some(slice) = text.get(range) else {
            continue;
        };
        let format = match kind {
            Some(kind) => {
                let style = palette.style_for(kind);
                TextFormat {
                    font_id: font_id.clone(),
                    color: color32(style.foreground),
                    italics: style.italic,
                    ..Default::default()
                }
            }
            None => TextFormat::simple(font_id.clone(), plain),
        };
        job.append(slice, 0.0, format);
    }
    job
}

/// Gutter text: one right-aligned number per line.
pub fn gutter_text(line_count: usize) -> String {
    let width = line_count.max(1).to_string().len();
    (1..=line_count.max(1))
        .map(|line| format!("{line:>width$}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}
