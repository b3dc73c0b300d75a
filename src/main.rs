mod artwork;
mod config;
mod error;
mod library;
mod ui;

use anyhow::{Context, Result};
use eframe::NativeOptions;
use log::{info, LevelFilter};

use artwork::{ArtworkHandler, CoverCache, GiantBombClient};
use ui::LauncherApp;

fn main() -> Result<()> {
    // Initialize logger, RUST_LOG overrides the default level
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting Rocket Game Launcher");

    // A missing or unreadable config is fatal
    let config_path = config::default_config_path();
    let config = config::read_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    // GIANT_BOMB_API_KEY may live in a .env file next to the app
    if let Some(env_file) = config::load_env_file() {
        info!("Loaded environment from {}", env_file.display());
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
    let artwork = ArtworkHandler::new(GiantBombClient::from_env(), CoverCache::default_dir())?;
    let app = LauncherApp::new(config_path, config, artwork, rt);

    // GUI Options
    let options = NativeOptions {
        initial_window_size: Some(egui::vec2(1280.0, 800.0)),
        ..Default::default()
    };

    eframe::run_native(
        "Rocket Game Launcher",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(ui::app::visuals(true));
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
