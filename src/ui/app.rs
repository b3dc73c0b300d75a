use eframe::egui;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::artwork::{ArtworkHandler, ArtworkStatus};
use crate::config::LauncherConfig;
use crate::library::{Catalog, CatalogBuilder, Platform};
use crate::ui::helpers;
use crate::ui::library_view::{CoverState, CoverTextures, LibraryAction, LibraryView};
use crate::ui::settings::SettingsView;

/// Application view
pub enum AppView {
    /// Dashboard
    Library,
    /// Settings view
    Settings,
}

/// Rocket Game Launcher app
pub struct LauncherApp {
    /// Current view
    view: AppView,
    /// Location of config.ini
    config_path: PathBuf,
    /// Configuration as last written
    config: LauncherConfig,
    /// Discovered games
    catalog: Catalog,
    library_view: LibraryView,
    settings_view: SettingsView,

    // Cover lookups
    artwork: ArtworkHandler,
    covers: CoverTextures,
    artwork_receiver: Receiver<ArtworkStatus>,

    // Tokio runtime for async operations
    rt: Runtime,

    dark_mode: bool,
    /// Last launch failure, shown under the dashboard
    launch_error: Option<String>,
}

impl LauncherApp {
    /// Create the app and build the initial catalog
    pub fn new(config_path: PathBuf, config: LauncherConfig, mut artwork: ArtworkHandler, rt: Runtime) -> Self {
        let (artwork_tx, artwork_rx) = channel();
        artwork.set_progress_channel(artwork_tx);

        let settings_view = SettingsView::new(&config);

        let mut app = Self {
            view: AppView::Library,
            config_path,
            catalog: Catalog::default(),
            config,
            library_view: LibraryView::new(),
            settings_view,
            artwork,
            covers: CoverTextures::new(),
            artwork_receiver: artwork_rx,
            rt,
            dark_mode: true,
            launch_error: None,
        };

        app.rebuild_catalog();
        app
    }

    /// Rescan every platform and queue covers for new titles
    fn rebuild_catalog(&mut self) {
        self.catalog = CatalogBuilder::build(&self.config);
        info!("Catalog holds {} games", self.catalog.len());
        self.request_covers();
    }

    fn request_covers(&mut self) {
        for platform in Platform::ALL {
            let Some(sub_catalog) = self.catalog.platform(platform) else {
                continue;
            };

            for entry in sub_catalog.iter() {
                let key = (platform, entry.title.clone());
                if self.covers.contains_key(&key) {
                    continue;
                }
                self.covers.insert(key, CoverState::Pending);

                let handler = self.artwork.clone();
                let entry = entry.clone();
                self.rt.spawn(async move {
                    handler.fetch_and_report(entry).await;
                });
            }
        }
    }

    /// Check for artwork status updates
    fn check_artwork_status(&mut self, ctx: &egui::Context) {
        loop {
            match self.artwork_receiver.try_recv() {
                Ok(ArtworkStatus::Loaded { platform, title, image }) => {
                    let texture_id = format!("cover_{:?}_{}", platform, title);
                    let texture = helpers::texture_from_image(ctx, &image, &texture_id);
                    self.covers.insert((platform, title), CoverState::Ready(texture));
                }
                Ok(ArtworkStatus::Missing { platform, title }) => {
                    self.covers.insert((platform, title), CoverState::Missing);
                }
                Ok(ArtworkStatus::Failed { platform, title, error }) => {
                    error!("No cover for {} ({}): {}", title, platform, error);
                    self.covers.insert((platform, title), CoverState::Missing);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Handle library action
    fn handle_library_action(&mut self, ctx: &egui::Context, action: LibraryAction) {
        match action {
            LibraryAction::Launch(platform, title) => self.launch(platform, &title),
            LibraryAction::OpenSettings => {
                self.settings_view = SettingsView::new(&self.config);
                self.view = AppView::Settings;
            }
            LibraryAction::Refresh => {
                // Titles without a cover get another lookup
                self.covers.retain(|_, cover| !matches!(cover, CoverState::Missing));
                self.rebuild_catalog();
            }
            LibraryAction::ToggleTheme => {
                self.dark_mode = !self.dark_mode;
                ctx.set_visuals(visuals(self.dark_mode));
            }
        }
    }

    fn launch(&mut self, platform: Platform, title: &str) {
        let Some(entry) = self.catalog.find(platform, title) else {
            error!("{} is no longer in the {} catalog", title, platform);
            return;
        };

        info!("Launching {} ({})", entry.title, entry.identifier);
        match platform.launcher().launch(entry) {
            Ok(()) => self.launch_error = None,
            Err(e) => {
                error!("{}", e);
                self.launch_error = Some(e.to_string());
            }
        }
    }

    fn close_settings(&mut self) {
        if self.settings_view.is_dirty() {
            let changed = self.settings_view.take_dirty();
            info!("Paths changed for {:?}, rebuilding catalog", changed);
            self.rebuild_catalog();
        }
        self.view = AppView::Library;
    }

    fn has_pending_covers(&self) -> bool {
        self.covers.values().any(|cover| matches!(cover, CoverState::Pending))
    }
}

/// Visuals for the selected theme
pub fn visuals(dark_mode: bool) -> egui::Visuals {
    if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_artwork_status(ctx);

        let mut library_action = None;
        let mut settings_closed = false;

        if let (AppView::Library, Some(message)) = (&self.view, &self.launch_error) {
            egui::TopBottomPanel::bottom("launch_error").show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, message.as_str());
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.view {
            AppView::Library => {
                self.library_view.show(ui, &self.catalog, &self.covers, self.dark_mode, |action| {
                    library_action = Some(action);
                });
            }
            AppView::Settings => {
                settings_closed = self.settings_view.show(ui, &self.config_path, &mut self.config);
            }
        });

        // Handle actions after the UI code, outside the panel borrow
        if let Some(action) = library_action {
            self.handle_library_action(ctx, action);
        }
        if settings_closed {
            self.close_settings();
        }

        if self.has_pending_covers() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
