pub mod config;
pub mod snippets;

pub use config::{
    ConfigError, ConfigStore, EditorSettings, IdeConfig, PathSettings, PreviewSettings,
    RunnerSettings, DEFAULT_CONFIG_FILE,
};
pub use snippets::{builtin_snippets, SnippetError, SnippetStore, SNIPPET_EXTENSION};
