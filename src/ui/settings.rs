use eframe::egui;
use log::{error, info};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::{self, LauncherConfig, PathSlot, EPIC_SECTION, STEAM_SECTION};
use crate::error::LauncherResult;
use crate::library::Platform;

/// One editable path of the settings page
struct SlotRow {
    label: &'static str,
    platform: Platform,
    slot: PathSlot,
    input: String,
}

impl SlotRow {
    fn new(label: &'static str, platform: Platform, slot: PathSlot, value: Option<&String>) -> Self {
        Self {
            label,
            platform,
            slot,
            input: value.cloned().unwrap_or_default(),
        }
    }
}

enum RowEdit {
    Apply(usize),
    Clear(usize),
}

/// Settings view
pub struct SettingsView {
    rows: Vec<SlotRow>,
    /// Platforms whose paths changed since the last rebuild
    dirty: BTreeSet<Platform>,
    /// Message of the last failed edit
    error: Option<String>,
}

impl SettingsView {
    /// Create a new settings view showing the current paths
    pub fn new(config: &LauncherConfig) -> Self {
        let steam = config.platform(STEAM_SECTION);
        let epic = config.platform(EPIC_SECTION);

        Self {
            rows: vec![
                SlotRow::new(
                    "Steam Path 1:",
                    Platform::Steam,
                    PathSlot::FirstPath1,
                    steam.and_then(|c| c.path1.as_ref()),
                ),
                SlotRow::new(
                    "Steam Path 2:",
                    Platform::Steam,
                    PathSlot::FirstPath2,
                    steam.and_then(|c| c.path2.as_ref()),
                ),
                SlotRow::new(
                    "Epic Games Path:",
                    Platform::Epic,
                    PathSlot::SecondPath1,
                    epic.and_then(|c| c.path1.as_ref()),
                ),
            ],
            dirty: BTreeSet::new(),
            error: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Platforms changed since the last call, resetting the flags
    pub fn take_dirty(&mut self) -> BTreeSet<Platform> {
        std::mem::take(&mut self.dirty)
    }

    /// Show the settings view. Returns true when Back was clicked.
    pub fn show(&mut self, ui: &mut egui::Ui, config_path: &Path, config: &mut LauncherConfig) -> bool {
        let mut back = false;
        let mut edit = None;

        ui.horizontal(|ui| {
            if ui.button("Back").clicked() {
                back = true;
            }
            ui.heading("Settings");
        });
        ui.separator();

        ui.label(format!("Configuration file: {}", config_path.display()));
        ui.add_space(8.0);

        egui::Grid::new("settings_paths")
            .num_columns(5)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                for (index, row) in self.rows.iter_mut().enumerate() {
                    ui.label(row.label);
                    ui.add(egui::TextEdit::singleline(&mut row.input).desired_width(420.0));

                    if ui.button("Browse").clicked() {
                        let mut dialog = rfd::FileDialog::new();
                        if Path::new(row.input.trim()).is_dir() {
                            dialog = dialog.set_directory(row.input.trim());
                        }
                        if let Some(folder) = dialog.pick_folder() {
                            row.input = folder.to_string_lossy().to_string();
                            edit = Some(RowEdit::Apply(index));
                        }
                    }
                    if ui.button("Apply").clicked() {
                        edit = Some(RowEdit::Apply(index));
                    }
                    if ui.button("Clear").clicked() {
                        edit = Some(RowEdit::Clear(index));
                    }
                    ui.end_row();
                }
            });

        match edit {
            Some(RowEdit::Apply(index)) => self.apply(index, config_path, config),
            Some(RowEdit::Clear(index)) => self.clear(index, config_path, config),
            None => {}
        }

        if let Some(message) = &self.error {
            ui.add_space(8.0);
            ui.colored_label(egui::Color32::RED, message.as_str());
        }

        back
    }

    fn apply(&mut self, index: usize, config_path: &Path, config: &mut LauncherConfig) {
        let value = self.rows[index].input.trim().to_string();
        if value.is_empty() {
            self.error = Some("Enter a folder or use Clear to remove the path".to_string());
            return;
        }

        let slot = self.rows[index].slot;
        let result = config::update_config(config_path, &value, slot).and_then(|_| config.set_slot(slot, &value));
        self.finish_edit(index, result);
    }

    fn clear(&mut self, index: usize, config_path: &Path, config: &mut LauncherConfig) {
        let slot = self.rows[index].slot;
        let result = config::clear_path(config_path, slot).and_then(|_| config.set_slot(slot, config::CLEARED_PATH));
        if result.is_ok() {
            self.rows[index].input.clear();
        }
        self.finish_edit(index, result);
    }

    fn finish_edit(&mut self, index: usize, result: LauncherResult<()>) {
        let row = &self.rows[index];
        match result {
            Ok(()) => {
                info!("{} {} set to '{}'", row.platform, row.label.trim_end_matches(':'), row.input);
                self.dirty.insert(row.platform);
                self.error = None;
            }
            Err(e) => {
                error!("Failed to update {}: {}", row.label.trim_end_matches(':'), e);
                self.error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup(contents: &str) -> (tempfile::TempDir, std::path::PathBuf, LauncherConfig) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, contents).unwrap();
        let config = config::read_config(&path).unwrap();
        (dir, path, config)
    }

    #[test]
    fn test_rows_show_current_paths() {
        let (_dir, _path, config) = setup("[Steam]\npath1 = /a\npath2 = /b\n\n[Epic Games]\npath1 = /e\n");
        let view = SettingsView::new(&config);
        let inputs: Vec<&str> = view.rows.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["/a", "/b", "/e"]);
    }

    #[test]
    fn test_apply_writes_file_and_marks_platform_dirty() {
        let (_dir, path, mut config) = setup("[Steam]\npath1 = /a\npath2 = /b\n\n[Epic Games]\npath1 = /e\n");
        let mut view = SettingsView::new(&config);

        view.rows[2].input = "/epic/manifests".to_string();
        view.apply(2, &path, &mut config);

        assert!(view.error.is_none());
        assert_eq!(view.take_dirty().into_iter().collect::<Vec<_>>(), vec![Platform::Epic]);
        assert!(!view.is_dirty());
        assert_eq!(config::read_config(&path).unwrap(), config);
        assert_eq!(
            config.platform(EPIC_SECTION).unwrap().path1.as_deref(),
            Some("/epic/manifests")
        );
    }

    #[test]
    fn test_clear_blanks_slot() {
        let (_dir, path, mut config) = setup("[Steam]\npath1 = /a\npath2 = /b\n");
        let mut view = SettingsView::new(&config);

        view.clear(1, &path, &mut config);

        assert!(view.rows[1].input.is_empty());
        assert!(view.is_dirty());
        assert_eq!(config.platform(STEAM_SECTION).unwrap().path2.as_deref(), Some(""));
        assert_eq!(config::read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_failed_edit_reports_error_and_stays_clean() {
        let (_dir, path, mut config) = setup("[Steam]\npath1 = /a\n");
        let mut view = SettingsView::new(&config);
        let before = fs::read_to_string(&path).unwrap();

        view.rows[2].input = "/epic".to_string();
        view.apply(2, &path, &mut config);

        assert!(!view.is_dirty());
        assert_eq!(view.error.as_deref(), Some("No matching path found for slot 3"));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_apply_rejects_empty_input() {
        let (_dir, path, mut config) = setup("[Steam]\npath1 = /a\n");
        let mut view = SettingsView::new(&config);

        view.rows[0].input = "   ".to_string();
        view.apply(0, &path, &mut config);

        assert!(view.error.is_some());
        assert!(!view.is_dirty());
        assert_eq!(config.platform(STEAM_SECTION).unwrap().path1.as_deref(), Some("/a"));
    }
}
