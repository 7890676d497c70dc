/// 描述插入點與選取範圍（以字元索引計）。 / Represents the caret within a document, in char indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caret {
    position: usize,
    selection: Option<Selection>,
}

impl Caret {
    /// 建立指定位置的游標。 / Creates a caret at the given position.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            selection: None,
        }
    }

    /// 建立帶有選取範圍的游標。 / Creates a caret with the provided selection range.
    pub fn with_selection(position: usize, selection: Selection) -> Self {
        let mut caret = Self {
            position,
            selection: Some(selection),
        };
        caret.drop_empty_selection();
        caret
    }

    /// 取得游標所在位置。 / Returns the caret position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// 取得選取範圍（若有）。 / Returns the active selection if present.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub(crate) fn edit_range(&self) -> (usize, usize) {
        if let Some(selection) = &self.selection {
            (selection.start, selection.end)
        } else {
            (self.position, self.position)
        }
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
        self.selection = None;
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        if self.position > len {
            self.position = len;
        }
        if let Some(selection) = &mut self.selection {
            selection.clamp(len);
            if self.position < selection.start {
                self.position = selection.start;
            } else if self.position > selection.end {
                self.position = selection.end;
            }
        }
        self.drop_empty_selection();
    }

    fn drop_empty_selection(&mut self) {
        if self
            .selection
            .as_ref()
            .is_some_and(|selection| selection.is_empty())
        {
            self.selection = None;
        }
    }
}

/// 定義一段已排序（start <= end）的文字範圍。 / Represents an ordered selection range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// 建立新的選取範圍，會自動將 start/end 排序。 / Creates a selection with automatically ordered bounds.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// 範圍起點。 / Returns the start of the selection.
    pub fn start(&self) -> usize {
        self.start
    }

    /// 範圍終點。 / Returns the end of the selection.
    pub fn end(&self) -> usize {
        self.end
    }

    /// 選取長度。 / Returns the length of the selection.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clamp(&mut self, len: usize) {
        if self.start > len {
            self.start = len;
        }
        if self.end > len {
            self.end = len;
        }
        if self.start > self.end {
            self.start = self.end;
        }
    }
}

/// Converts a char index into a byte offset, clamping past-the-end indices.
pub fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_orders_bounds() {
        let selection = Selection::new(7, 2);
        assert_eq!(selection.start(), 2);
        assert_eq!(selection.end(), 7);
        assert_eq!(selection.len(), 5);
    }

    #[test]
    fn empty_selection_is_dropped() {
        let caret = Caret::with_selection(3, Selection::new(3, 3));
        assert!(caret.selection().is_none());
    }

    #[test]
    fn clamp_keeps_caret_inside_text() {
        let mut caret = Caret::with_selection(10, Selection::new(4, 10));
        caret.clamp(6);
        assert_eq!(caret.position(), 6);
        assert_eq!(caret.selection(), Some(&Selection::new(4, 6)));
    }

    #[test]
    fn char_to_byte_handles_multibyte_text() {
        let text = "é中a";
        assert_eq!(char_to_byte(text, 0), 0);
        assert_eq!(char_to_byte(text, 1), 2);
        assert_eq!(char_to_byte(text, 2), 5);
        assert_eq!(char_to_byte(text, 9), text.len());
    }
}
