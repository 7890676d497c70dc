use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::chunks::{ChunkError, ChunkSet};
use crate::editor::{char_to_byte, Caret, Selection};
use crate::language::Language;

/// 表示文件目前使用的行尾樣式。 / Represents the current line ending style for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// 回傳序列化文字時使用的行尾字串。 / Returns the literal string representation used when serialising text.
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// 文件載入或儲存時可能發生的錯誤。 / Errors that can occur while loading or saving a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document has no associated path")]
    NoPath,
}

impl DocumentError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 編輯中的文字緩衝，包含路徑、語言與游標。 / The buffer being edited: text, optional path, language tag and caret.
#[derive(Debug, Clone, Default)]
pub struct Document {
    path: Option<PathBuf>,
    contents: String,
    language: Language,
    line_ending: LineEnding,
    caret: Caret,
    is_dirty: bool,
}

impl Document {
    /// 建立一個空內容且尚未儲存的文件。 / Creates an unsaved, empty Python document.
    pub fn new() -> Self {
        Self::default()
    }

    /// 以給定文字與語言建立未命名文件。 / Creates an untitled document holding `text`.
    pub fn with_text(text: impl Into<String>, language: Language) -> Self {
        let text = text.into();
        Self {
            line_ending: detect_line_ending(&text),
            contents: normalize_newlines(&text),
            language,
            ..Self::default()
        }
    }

    /// 從磁碟載入文件，並依副檔名推斷語言。 / Loads a document from disk and infers its language from the extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::io(path, source))?;
        let language = Language::from_path(path);
        debug!(path = %path.display(), %language, "opened document");
        Ok(Self {
            path: Some(path.to_path_buf()),
            line_ending: detect_line_ending(&text),
            contents: normalize_newlines(&text),
            language,
            caret: Caret::new(0),
            is_dirty: false,
        })
    }

    /// 將文件儲存至現有路徑；若尚未指定路徑則失敗。 / Saves the document to its current path; fails if no path is set.
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;
        self.save_as(path)
    }

    /// 將文件另存為新路徑。 / Saves the document to a new path and adopts it.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let payload = self.contents.replace('\n', self.line_ending.as_str());

        // 先寫入暫存檔再重新命名。 / Write a uniquely named sibling temp file, then persist it over the target.
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp_file =
            NamedTempFile::new_in(parent).map_err(|source| DocumentError::io(parent, source))?;
        tmp_file
            .write_all(payload.as_bytes())
            .map_err(|source| DocumentError::io(tmp_file.path(), source))?;
        tmp_file
            .as_file()
            .sync_all()
            .map_err(|source| DocumentError::io(tmp_file.path(), source))?;
        tmp_file
            .persist(path)
            .map_err(|err| DocumentError::io(path, err.error))?;

        debug!(path = %path.display(), bytes = payload.len(), "saved document");
        self.path = Some(path.to_path_buf());
        self.is_dirty = false;
        Ok(())
    }

    /// 取得目前文件內容（行尾已正規化為 `\n`）。 / Returns the current contents, normalised to `\n` line endings.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Mutable access for widgets that edit the text in place. Callers report
    /// actual edits through [`Document::mark_dirty`].
    pub fn contents_mut(&mut self) -> &mut String {
        &mut self.contents
    }

    /// 以新文字取代記憶體內容並標記文件為已修改。 / Replaces the whole buffer, marking the document as dirty.
    pub fn set_contents(&mut self, text: impl Into<String>) {
        self.contents = normalize_newlines(&text.into());
        self.caret.clamp(self.char_len());
        self.is_dirty = true;
    }

    /// Replaces the buffer with the stitched fragments of `chunks`.
    pub fn stitch_from(&mut self, chunks: &ChunkSet) -> Result<(), ChunkError> {
        let merged = chunks.stitch()?;
        self.set_contents(merged);
        Ok(())
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn default_extension(&self) -> &'static str {
        self.language.default_extension()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// 判斷文件是否仍有未儲存變更。 / Returns whether the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    /// 取得文件所屬的檔案路徑（若存在）。 / Retrieves the associated path if the document is linked to one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn caret(&self) -> &Caret {
        &self.caret
    }

    /// Moves the caret (char index), clearing any selection.
    pub fn set_caret(&mut self, position: usize) {
        self.caret.set_position(position);
        self.caret.clamp(self.char_len());
    }

    /// Sets the selection between two char indices; the caret sits at `head`.
    pub fn select(&mut self, anchor: usize, head: usize) {
        self.caret = Caret::with_selection(head, Selection::new(anchor, head));
        self.caret.clamp(self.char_len());
    }

    /// 取得目前選取的文字。 / Returns the selected text, `None` when nothing is selected.
    pub fn selected_text(&self) -> Option<&str> {
        let selection = self.caret.selection()?;
        let start = char_to_byte(&self.contents, selection.start());
        let end = char_to_byte(&self.contents, selection.end());
        self.contents.get(start..end).filter(|text| !text.is_empty())
    }

    /// 在游標處插入文字（有選取時取代之）。 / Inserts `text` at the caret, replacing the selection if any.
    pub fn insert_at_caret(&mut self, text: &str) {
        let (start, end) = self.caret.edit_range();
        let start_byte = char_to_byte(&self.contents, start);
        let end_byte = char_to_byte(&self.contents, end);
        let text = normalize_newlines(text);
        self.contents.replace_range(start_byte..end_byte, &text);
        self.caret.set_position(start + text.chars().count());
        self.is_dirty = true;
    }

    /// Number of lines shown in the gutter; an empty buffer still has one line.
    pub fn line_count(&self) -> usize {
        line_count(&self.contents)
    }

    /// 視窗標題。 / Window title, e.g. `IKA – main.py (Python)`.
    pub fn title(&self) -> String {
        let dirty = if self.is_dirty { "*" } else { "" };
        match self.path.as_ref().and_then(|path| path.file_name()) {
            Some(name) => format!(
                "IKA – {}{dirty} ({})",
                name.to_string_lossy(),
                self.language
            ),
            None => format!("IKA – untitled{dirty} ({})", self.language),
        }
    }

    fn char_len(&self) -> usize {
        self.contents.chars().count()
    }
}

/// Counts the lines of `text` the way the gutter numbers them.
pub fn line_count(text: &str) -> usize {
    text.bytes().filter(|byte| *byte == b'\n').count() + 1
}

fn detect_line_ending(text: &str) -> LineEnding {
    if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}

fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}
