use eframe::egui;
use egui::{Align, Align2, Color32, FontId, Layout, Sense};
use std::collections::HashMap;

use crate::library::{Catalog, GameEntry, Platform, SubCatalog};
use crate::ui::helpers;

const CARD_WIDTH: f32 = 150.0;
const CARD_HEIGHT: f32 = 225.0;
const CARD_SPACING: f32 = 20.0;
const TITLE_CHARS: usize = 20;

/// Cover textures keyed by platform and title
pub type CoverTextures = HashMap<(Platform, String), CoverState>;

/// Cover of one dashboard card
pub enum CoverState {
    /// Lookup still running
    Pending,
    /// Cover loaded into a texture
    Ready(egui::TextureHandle),
    /// No cover, draw the placeholder
    Missing,
}

/// Library view action
pub enum LibraryAction {
    /// Start a game
    Launch(Platform, String),
    /// Open the settings view
    OpenSettings,
    /// Rescan every configured directory
    Refresh,
    /// Switch between light and dark mode
    ToggleTheme,
}

/// Dashboard listing every platform's games
pub struct LibraryView {
    /// Search query
    search_query: String,
}

impl LibraryView {
    /// Create a new library view
    pub fn new() -> Self {
        Self {
            search_query: String::new(),
        }
    }

    /// Show the library view
    pub fn show<F>(&mut self, ui: &mut egui::Ui, catalog: &Catalog, covers: &CoverTextures, dark_mode: bool, mut on_action: F)
    where
        F: FnMut(LibraryAction),
    {
        ui.horizontal(|ui| {
            ui.heading("Rocket Game Launcher");
            ui.separator();
            ui.label("Search:");
            ui.text_edit_singleline(&mut self.search_query);

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("Settings").clicked() {
                    on_action(LibraryAction::OpenSettings);
                }
                if ui.button("Refresh").clicked() {
                    on_action(LibraryAction::Refresh);
                }
                let theme_label = if dark_mode { "Light Mode" } else { "Dark Mode" };
                if ui.button(theme_label).clicked() {
                    on_action(LibraryAction::ToggleTheme);
                }
            });
        });

        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for platform in Platform::ALL {
                ui.heading(platform.to_string());
                ui.add_space(4.0);

                match catalog.platform(platform) {
                    Some(sub_catalog) if !sub_catalog.is_empty() => {
                        let games = self.filter(sub_catalog);
                        if games.is_empty() {
                            ui.label(format!("No games match '{}'", self.search_query.trim()));
                        } else {
                            show_grid(ui, platform, &games, covers, &mut on_action);
                        }
                    }
                    sub_catalog => show_placeholder(ui, platform, sub_catalog),
                }

                ui.add_space(12.0);
                ui.separator();
            }
        });
    }

    fn filter<'a>(&self, sub_catalog: &'a SubCatalog) -> Vec<&'a GameEntry> {
        let query = self.search_query.trim().to_lowercase();
        sub_catalog
            .iter()
            .filter(|game| query.is_empty() || game.title.to_lowercase().contains(&query))
            .collect()
    }
}

fn show_placeholder(ui: &mut egui::Ui, platform: Platform, sub_catalog: Option<&SubCatalog>) {
    let Some(sub_catalog) = sub_catalog.filter(|s| !s.roots.is_empty()) else {
        ui.label(format!("No {} library configured. Add one in Settings.", platform));
        return;
    };
    for root in &sub_catalog.roots {
        if sub_catalog.missing_roots.contains(root) {
            ui.label(format!("No Games Found in '{}' (folder does not exist)", root.display()));
        } else {
            ui.label(format!("No Games Found in '{}'", root.display()));
        }
    }
}

fn show_grid<F>(ui: &mut egui::Ui, platform: Platform, games: &[&GameEntry], covers: &CoverTextures, on_action: &mut F)
where
    F: FnMut(LibraryAction),
{
    let per_row = ((ui.available_width() + CARD_SPACING) / (CARD_WIDTH + CARD_SPACING))
        .floor()
        .max(1.0) as usize;

    egui::Grid::new(format!("game_grid_{:?}", platform))
        .spacing([CARD_SPACING, CARD_SPACING])
        .min_col_width(CARD_WIDTH)
        .max_col_width(CARD_WIDTH)
        .show(ui, |ui| {
            for (i, game) in games.iter().enumerate() {
                if i > 0 && i % per_row == 0 {
                    ui.end_row();
                }

                ui.vertical(|ui| {
                    let cover = covers.get(&(platform, game.title.clone()));
                    show_cover(ui, &game.title, cover);

                    ui.label(helpers::truncate_title(&game.title, TITLE_CHARS))
                        .on_hover_text(game.title.as_str());
                    if ui.button("Play").clicked() {
                        on_action(LibraryAction::Launch(platform, game.title.clone()));
                    }
                });
            }
        });
}

fn show_cover(ui: &mut egui::Ui, title: &str, cover: Option<&CoverState>) {
    let size = egui::vec2(CARD_WIDTH, CARD_HEIGHT);

    if let Some(CoverState::Ready(texture)) = cover {
        ui.image(texture.id(), size);
        return;
    }

    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    ui.painter().rect_filled(rect, 10.0, Color32::from_rgb(60, 60, 90));

    if let Some(CoverState::Pending) = cover {
        ui.put(rect, egui::Spinner::new());
    } else {
        ui.painter().text(
            rect.center(),
            Align2::CENTER_CENTER,
            helpers::truncate_title(title, TITLE_CHARS),
            FontId::proportional(14.0),
            Color32::WHITE,
        );
    }
}
