//! 片段庫：內建片段加上使用者片段。 / Snippet library: built-in entries overlaid by user files.
//!
//! User snippets live one per file at `<root>/<language folder>/<name>.txt`;
//! the file content is the verbatim snippet body.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use ika_core::Language;
use thiserror::Error;
use tracing::{debug, info};

/// Extension of user snippet files.
pub const SNIPPET_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("select text first")]
    EmptySelection,
    #[error("snippet name must not be empty")]
    EmptyName,
    #[error("snippet name '{0}' may not contain path separators")]
    InvalidName(String),
    #[error("snippet '{0}' is built in and cannot be removed")]
    BuiltinReadOnly(String),
    #[error("snippet '{0}' does not exist")]
    NotFound(String),
    #[error("snippet I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnippetError {
    /// Validation failures are reported to the user without touching disk.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SnippetError::EmptySelection | SnippetError::EmptyName | SnippetError::InvalidName(_)
        )
    }

    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 回傳指定語言的內建片段。 / Returns the immutable built-in snippets for `language`.
pub fn builtin_snippets(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Python => &[
            ("forloop", "for i in range():\n    pass\n"),
            ("func", "def function_name():\n    pass\n"),
            (
                "class",
                "class NewClass:\n    def __init__(self):\n        pass\n",
            ),
        ],
        Language::Html => &[
            ("div", "<div></div>"),
            ("h1", "<h1>Title</h1>"),
            ("button", "<button>Click</button>"),
            (
                "page",
                "<!DOCTYPE html>\n<html>\n<head>\n<title>New Page</title>\n</head>\n<body>\n\n</body>\n</html>",
            ),
        ],
    }
}

/// 依語言管理片段的儲存區。 / Per-language snippet storage rooted at one folder.
#[derive(Debug, Clone)]
pub struct SnippetStore {
    root: PathBuf,
}

impl SnippetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folder(&self, language: Language) -> PathBuf {
        self.root.join(language.folder_name())
    }

    /// 建立每個語言的資料夾。 / Creates the per-language folders.
    pub fn ensure_layout(&self) -> Result<(), SnippetError> {
        for language in Language::ALL {
            let folder = self.folder(language);
            fs::create_dir_all(&folder).map_err(|source| SnippetError::io(&folder, source))?;
        }
        Ok(())
    }

    /// 內建片段被同名使用者片段覆蓋後的結果。 / Effective snippet set: built-ins overlaid by user files of the same name.
    pub fn list(&self, language: Language) -> Result<BTreeMap<String, String>, SnippetError> {
        let mut snippets: BTreeMap<String, String> = builtin_snippets(language)
            .iter()
            .map(|(name, body)| (name.to_string(), body.to_string()))
            .collect();

        let folder = self.folder(language);
        let entries = match fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(snippets),
            Err(err) => return Err(SnippetError::io(&folder, err)),
        };

        for entry in entries {
            let entry = entry.map_err(|source| SnippetError::io(&folder, source))?;
            let path = entry.path();
            let Some(name) = snippet_name(&path) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            let body = fs::read_to_string(&path).map_err(|source| SnippetError::io(&path, source))?;
            snippets.insert(name, body);
        }
        Ok(snippets)
    }

    pub fn get(&self, language: Language, name: &str) -> Result<Option<String>, SnippetError> {
        Ok(self.list(language)?.remove(name))
    }

    /// 將選取文字存成使用者片段（覆寫同名檔案）。 / Saves `selection` as user snippet `name`, overwriting any previous one.
    pub fn save(
        &self,
        language: Language,
        name: &str,
        selection: &str,
    ) -> Result<PathBuf, SnippetError> {
        if selection.is_empty() {
            return Err(SnippetError::EmptySelection);
        }
        let name = validate_name(name)?;

        let folder = self.folder(language);
        fs::create_dir_all(&folder).map_err(|source| SnippetError::io(&folder, source))?;
        let path = folder.join(format!("{name}.{SNIPPET_EXTENSION}"));
        fs::write(&path, selection).map_err(|source| SnippetError::io(&path, source))?;
        info!(%language, name, "saved snippet");
        Ok(path)
    }

    /// Deletes a user snippet. Built-ins that are not shadowed cannot be removed.
    pub fn remove(&self, language: Language, name: &str) -> Result<(), SnippetError> {
        let name = validate_name(name)?;
        let path = self
            .folder(language)
            .join(format!("{name}.{SNIPPET_EXTENSION}"));
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(%language, name, "removed snippet");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if builtin_snippets(language).iter().any(|(n, _)| *n == name) {
                    Err(SnippetError::BuiltinReadOnly(name.to_string()))
                } else {
                    Err(SnippetError::NotFound(name.to_string()))
                }
            }
            Err(err) => Err(SnippetError::io(&path, err)),
        }
    }
}

fn validate_name(name: &str) -> Result<&str, SnippetError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SnippetError::EmptyName);
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(SnippetError::InvalidName(trimmed.to_string()));
    }
    Ok(trimmed)
}

fn snippet_name(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if extension != SNIPPET_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn list_without_user_folder_returns_builtins() {
        let dir = tempdir().unwrap();
        let store = SnippetStore::new(dir.path().join("snippets"));
        let python = store.list(Language::Python).unwrap();
        assert_eq!(
            python.keys().collect::<Vec<_>>(),
            ["class", "forloop", "func"]
        );
        let html = store.list(Language::Html).unwrap();
        assert!(html["page"].starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn user_snippet_overrides_builtin() {
        let dir = tempdir().unwrap();
        let store = SnippetStore::new(dir.path());
        store
            .save(Language::Python, "func", "def mine():\n    return 1\n")
            .unwrap();

        let python = store.list(Language::Python).unwrap();
        assert_eq!(python["func"], "def mine():\n    return 1\n");
        assert_eq!(python.len(), 3);
    }

    #[test]
    fn snippets_are_namespaced_by_language() {
        let dir = tempdir().unwrap();
        let store = SnippetStore::new(dir.path());
        store.save(Language::Html, "nav", "<nav></nav>").unwrap();

        assert!(store.get(Language::Html, "nav").unwrap().is_some());
        assert!(store.get(Language::Python, "nav").unwrap().is_none());
        assert!(dir.path().join("html").join("nav.txt").is_file());
    }

    #[test]
    fn save_rejects_missing_input_without_writing() {
        let dir = tempdir().unwrap();
        let store = SnippetStore::new(dir.path().join("root"));

        let err = store.save(Language::Python, "x", "").unwrap_err();
        assert!(matches!(err, SnippetError::EmptySelection));
        assert!(err.is_validation());
        assert!(matches!(
            store.save(Language::Python, "   ", "body"),
            Err(SnippetError::EmptyName)
        ));
        assert!(matches!(
            store.save(Language::Python, "../escape", "body"),
            Err(SnippetError::InvalidName(_))
        ));
        assert!(!dir.path().join("root").exists());
    }

    #[test]
    fn only_txt_files_are_loaded() {
        let dir = tempdir().unwrap();
        let store = SnippetStore::new(dir.path());
        store.ensure_layout().unwrap();
        fs::write(store.folder(Language::Python).join("notes.md"), "ignored").unwrap();
        fs::write(store.folder(Language::Python).join("main.txt"), "if x:\n").unwrap();

        let python = store.list(Language::Python).unwrap();
        assert!(!python.contains_key("notes"));
        assert_eq!(python["main"], "if x:\n");
    }

    #[test]
    fn remove_distinguishes_builtins() {
        let dir = tempdir().unwrap();
        let store = SnippetStore::new(dir.path());
        store.save(Language::Html, "div", "<div class=\"x\"></div>").unwrap();

        store.remove(Language::Html, "div").unwrap();
        assert_eq!(store.get(Language::Html, "div").unwrap().unwrap(), "<div></div>");
        assert!(matches!(
            store.remove(Language::Html, "div"),
            Err(SnippetError::BuiltinReadOnly(_))
        ));
        assert!(matches!(
            store.remove(Language::Html, "missing"),
            Err(SnippetError::NotFound(_))
        ));
    }
}
