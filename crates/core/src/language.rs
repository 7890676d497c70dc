use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 編輯器支援的語言標籤。 / Closed set of languages the editor knows how to treat.
///
/// The tag decides which highlighting rules apply, whether the preview pane is
/// shown and how the runner executes the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Html,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Python, Language::Html];

    /// 依副檔名推斷語言；非 `.html` 者一律視為 Python。 / Infers the language from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("html") => Language::Html,
            _ => Language::Python,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Html => "HTML",
        }
    }

    /// Folder under the snippets root holding user snippets for this language.
    pub fn folder_name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Html => "html",
        }
    }

    pub fn default_extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Html => "html",
        }
    }

    /// Fixed file name the runner overwrites on every invocation.
    pub fn temp_file_name(self) -> &'static str {
        match self {
            Language::Python => "__run_temp__.py",
            Language::Html => "__run_temp__.html",
        }
    }

    pub fn has_preview(self) -> bool {
        matches!(self, Language::Html)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language '{0}' (expected python or html)")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "html" | "htm" => Ok(Language::Html),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}
