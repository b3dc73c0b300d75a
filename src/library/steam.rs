use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Command;

use super::scan::{manifest_files, ManifestScan};
use crate::error::{LauncherError, LauncherResult};

/// Bundled runtime package that Steam lists like a game
pub const REDISTRIBUTABLES_TITLE: &str = "Steamworks Common Redistributables";

lazy_static! {
    static ref MANIFEST_FILE: Regex = Regex::new(r"^appmanifest_(\d+)\.acf$").unwrap();
    static ref TITLE_NOISE: Regex = Regex::new(r"[^\w\s:]").unwrap();
}

/// Strip everything but word characters, whitespace and colons
pub fn sanitize_title(raw: &str) -> String {
    TITLE_NOISE.replace_all(raw, "").into_owned()
}

/// App ID from an `appmanifest_<id>.acf` file name
pub fn app_id_from_file_name(file_name: &str) -> Option<&str> {
    MANIFEST_FILE
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Pull the raw title out of the first line mentioning `name`.
///
/// The value is the 4th `"`-separated token, which is where it sits on a
/// regular `"name"  "<title>"` line. When the quoted `name` key appears later
/// on the line the token after it is used instead.
fn title_from_line(line: &str) -> Option<&str> {
    let tokens: Vec<&str> = line.split('"').collect();

    let value_index = tokens
        .iter()
        .enumerate()
        .skip(1)
        .step_by(2)
        .find(|(_, token)| **token == "name")
        .map(|(i, _)| i + 2)
        .unwrap_or(3);

    tokens.get(value_index).copied()
}

/// Read the sanitized title from a manifest
fn read_manifest_title(path: &Path) -> Result<String, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| e.to_string())?;
        if line.contains("name") {
            return title_from_line(&line)
                .map(sanitize_title)
                .ok_or_else(|| "the 'name' line has no quoted value".to_string());
        }
    }

    Err("no 'name' line found".to_string())
}

/// Collect `title -> app id` for every `appmanifest_<id>.acf` in `dir`.
///
/// A missing directory gives an empty scan. Manifests that cannot be read are
/// skipped and reported in the scan's issues.
pub fn scan_steam_manifests(dir: &Path) -> ManifestScan<String> {
    if !dir.is_dir() {
        debug!("{}", LauncherError::ScanDirectoryMissing(dir.to_path_buf()));
        return ManifestScan::missing(dir);
    }

    let mut scan = ManifestScan::new();

    for path in manifest_files(dir, &mut scan) {
        let app_id = match path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(app_id_from_file_name)
        {
            Some(app_id) => app_id.to_string(),
            None => continue,
        };

        match read_manifest_title(&path) {
            Ok(title) if title == REDISTRIBUTABLES_TITLE => {
                debug!("Ignoring {} ({})", title, app_id);
            }
            Ok(title) => {
                scan.entries.insert(title, app_id);
            }
            Err(reason) => scan.skip(&path, reason),
        }
    }

    info!("Found {} Steam games in {}", scan.entries.len(), dir.display());
    scan
}

/// Start a game through the Steam client
pub fn launch_steam_game(client: &Path, app_id: &str, title: &str) -> LauncherResult<()> {
    info!("Launching Game \"{}\"...", title);

    Command::new(client)
        .arg("-applaunch")
        .arg(app_id)
        .spawn()
        .map_err(|e| LauncherError::Launch {
            title: title.to_string(),
            reason: format!("{} ({})", e, client.display()),
        })?;

    info!("Successfully Launched \"{}\"", title);
    Ok(())
}
