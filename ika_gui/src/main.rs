mod app;
mod editor_view;

use std::path::PathBuf;

use anyhow::anyhow;
use eframe::{egui, NativeOptions};
use ika_settings::{ConfigStore, IdeConfig, DEFAULT_CONFIG_FILE};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::IkaApp;

const APP_TITLE: &str = "IKA";

fn load_config() -> IdeConfig {
    let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let path = base.join(DEFAULT_CONFIG_FILE);
    let config = match ConfigStore::load(&path) {
        Ok(store) => store.config().clone(),
        Err(err) => {
            warn!(%err, path = %path.display(), "falling back to default config");
            IdeConfig::default()
        }
    };
    config.resolved_against(&base)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config();
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);
    info!(run_dir = %config.paths.run_dir.display(), "starting IKA");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([1100.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            let mut app = IkaApp::new(cc, config);
            if let Some(path) = initial_file {
                app.open_path(path);
            }
            Box::new(app)
        }),
    )
    .map_err(|err| anyhow!("failed to start the editor window: {err}"))
}
