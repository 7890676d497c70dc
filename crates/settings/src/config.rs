use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use ika_highlight::{parse_highlight_palette, HighlightPalette, ThemeParseError};

const CONFIG_VERSION: u32 = 1;

/// File name the desktop app looks for in its working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ika.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub runner: RunnerSettings,
    #[serde(default)]
    pub preview: PreviewSettings,
    #[serde(default)]
    pub editor: EditorSettings,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            paths: PathSettings::default(),
            runner: RunnerSettings::default(),
            preview: PreviewSettings::default(),
            editor: EditorSettings::default(),
        }
    }
}

impl IdeConfig {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        self.paths.sanitize();
        self.runner.sanitize();
        self.preview.sanitize();
        self.editor.sanitize();
    }

    /// Returns a copy whose relative paths are anchored at `base`.
    pub fn resolved_against(&self, base: &Path) -> Self {
        let mut resolved = self.clone();
        resolved.paths = self.paths.resolve_against(base);
        resolved
    }
}

/// 管理資料夾位置。 / Folders the editor reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_snippets_root")]
    pub snippets_root: PathBuf,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(default = "default_run_dir")]
    pub run_dir: PathBuf,
}

fn default_snippets_root() -> PathBuf {
    PathBuf::from("snippets")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_run_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            snippets_root: default_snippets_root(),
            assets_dir: default_assets_dir(),
            run_dir: default_run_dir(),
        }
    }
}

impl PathSettings {
    fn sanitize(&mut self) {
        if self.snippets_root.as_os_str().is_empty() {
            self.snippets_root = default_snippets_root();
        }
        if self.assets_dir.as_os_str().is_empty() {
            self.assets_dir = default_assets_dir();
        }
        if self.run_dir.as_os_str().is_empty() {
            self.run_dir = default_run_dir();
        }
    }

    pub fn resolve_against(&self, base: &Path) -> Self {
        let anchor = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };
        Self {
            snippets_root: anchor(&self.snippets_root),
            assets_dir: anchor(&self.assets_dir),
            run_dir: anchor(&self.run_dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

fn default_interpreter() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
        }
    }
}

impl RunnerSettings {
    fn sanitize(&mut self) {
        if self.interpreter.trim().is_empty() {
            self.interpreter = default_interpreter();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSettings {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PreviewSettings {
    fn sanitize(&mut self) {
        self.debounce_ms = self.debounce_ms.clamp(50, 5_000);
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default = "default_true")]
    pub show_line_numbers: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Optional highlight overrides, e.g. `{"keyword": {"foreground": "#ff0000"}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

fn default_font_size() -> u32 {
    14
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            font_size: default_font_size(),
            syntax: None,
        }
    }
}

impl EditorSettings {
    fn sanitize(&mut self) {
        self.font_size = self.font_size.clamp(8, 48);
    }

    /// Highlight palette with the configured overrides applied.
    pub fn palette(&self) -> Result<HighlightPalette, ThemeParseError> {
        match &self.syntax {
            Some(value) => parse_highlight_palette(value),
            None => Ok(HighlightPalette::default()),
        }
    }
}

/// 設定檔的載入與儲存。 / Loads and persists [`IdeConfig`] as JSON.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: IdeConfig,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, config: IdeConfig) -> Self {
        Self {
            path: path.into(),
            data: config,
        }
    }

    /// 載入設定；檔案不存在時回傳預設值。 / Loads the config, falling back to defaults when the file is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "config missing, using defaults");
            let mut data = IdeConfig::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: IdeConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn config(&self) -> &IdeConfig {
        &self.data
    }

    pub fn config_mut(&mut self) -> &mut IdeConfig {
        &mut self.data
    }

    pub fn update<F>(&mut self, mut op: F) -> Result<(), ConfigError>
    where
        F: FnMut(&mut IdeConfig),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
        let payload =
            serde_json::to_string_pretty(&self.data).map_err(|source| ConfigError::Serialize {
                path: self.path.clone(),
                source,
            })?;

        let write_error = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp_file = NamedTempFile::new_in(parent).map_err(write_error)?;
        tmp_file
            .write_all(payload.as_bytes())
            .map_err(write_error)?;
        tmp_file
            .persist(&self.path)
            .map_err(|err| write_error(err.error))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_and_restores_defaults() {
        let mut config = IdeConfig::default();
        config.version = 0;
        config.preview.debounce_ms = 1;
        config.editor.font_size = 200;
        config.runner.interpreter = "   ".into();
        config.paths.assets_dir = PathBuf::new();
        config.sanitize();

        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.preview.debounce_ms, 50);
        assert_eq!(config.editor.font_size, 48);
        assert_eq!(config.runner.interpreter, default_interpreter());
        assert_eq!(config.paths.assets_dir, PathBuf::from("assets"));
    }

    #[cfg(unix)]
    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/work");
        let mut config = IdeConfig::default();
        config.paths.assets_dir = PathBuf::from("/abs/assets");
        let resolved = config.resolved_against(base);
        assert_eq!(resolved.paths.snippets_root, base.join("snippets"));
        assert_eq!(resolved.paths.assets_dir, PathBuf::from("/abs/assets"));
        assert_eq!(resolved.paths.run_dir, base.join("."));
    }

    #[test]
    fn palette_uses_overrides() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.palette().unwrap(), HighlightPalette::default());
        settings.syntax = Some(serde_json::json!({ "tag": { "foreground": "#010203" } }));
        let palette = settings.palette().unwrap();
        assert_ne!(palette, HighlightPalette::default());
    }

    #[test]
    fn update_persists_without_touching_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ika.json");
        let neighbour = dir.path().join("ika.tmp");
        fs::write(&neighbour, "keep me").unwrap();

        let mut store = ConfigStore::load(&path).unwrap();
        store
            .update(|config| config.runner.interpreter = "python3.12".into())
            .unwrap();

        let reloaded = ConfigStore::load(&path).unwrap();
        assert_eq!(reloaded.config().runner.interpreter, "python3.12");
        assert_eq!(fs::read_to_string(&neighbour).unwrap(), "keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
