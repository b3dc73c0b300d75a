use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};
use std::process::Command;

use super::scan::{manifest_files, ManifestScan};
use crate::error::{LauncherError, LauncherResult};

/// Fortnite's default entry point only works from inside the Epic launcher
pub const FORTNITE_LAUNCHER: &str = "FortniteGame/Binaries/Win64/FortniteLauncher.exe";
/// Shipping client that starts Fortnite without the launcher UI
pub const FORTNITE_SHIPPING_CLIENT: &str =
    "FortniteGame/Binaries/Win64/FortniteClient-Win64-Shipping_EAC_EOS.exe";

/// The fields of an Epic `.item` manifest the launcher needs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EpicItem {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    install_location: String,
    #[serde(default)]
    launch_executable: String,
}

/// An installed Epic title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicGame {
    /// Absolute path of the game executable
    pub executable: PathBuf,
    /// Epic launcher, started when the game itself cannot be
    pub launcher_executable: Option<PathBuf>,
}

/// Swap executables that refuse to start outside the Epic launcher
pub fn resolve_launch_executable(launch_executable: &str) -> &str {
    if launch_executable == FORTNITE_LAUNCHER {
        FORTNITE_SHIPPING_CLIENT
    } else {
        launch_executable
    }
}

/// Join `base` and `relative`, accepting both separator styles and folding `.` and `..`
pub fn join_normalized(base: &str, relative: &str) -> PathBuf {
    let is_separator = |c: char| c == '/' || c == '\\';
    let rooted = base.starts_with(is_separator);

    let mut parts: Vec<&str> = Vec::new();
    for part in base.split(is_separator).chain(relative.split(is_separator)) {
        match part {
            "" | "." => {}
            ".." if parts.last().map_or(false, |last| *last != "..") => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    let mut path = PathBuf::new();
    if rooted {
        path.push(MAIN_SEPARATOR_STR);
    }
    for (i, part) in parts.into_iter().enumerate() {
        if i == 0 && !rooted && part.ends_with(':') {
            // Drive letter, keep it absolute
            path.push(format!("{}{}", part, MAIN_SEPARATOR));
        } else {
            path.push(part);
        }
    }
    path
}

fn read_item(path: &Path) -> LauncherResult<EpicItem> {
    let json = fs::read_to_string(path)?;
    let item: EpicItem = serde_json::from_str(&json)?;
    if item.display_name.is_empty() {
        return Err(<serde_json::Error as serde::de::Error>::missing_field("DisplayName").into());
    }
    Ok(item)
}

/// Collect `title -> executable` for every `.item` manifest in `dir`.
///
/// A missing directory gives an empty scan. Manifests that are not valid JSON
/// are skipped and reported in the scan's issues.
pub fn scan_epic_manifests(dir: &Path, launcher_executable: Option<&Path>) -> ManifestScan<EpicGame> {
    if !dir.is_dir() {
        debug!("{}", LauncherError::ScanDirectoryMissing(dir.to_path_buf()));
        return ManifestScan::missing(dir);
    }

    let mut scan = ManifestScan::new();

    for path in manifest_files(dir, &mut scan) {
        if path.extension().map_or(true, |ext| ext != "item") {
            continue;
        }

        match read_item(&path) {
            Ok(item) => {
                let launch = resolve_launch_executable(&item.launch_executable);
                let executable = join_normalized(&item.install_location, launch);
                scan.entries.insert(
                    item.display_name,
                    EpicGame {
                        executable,
                        launcher_executable: launcher_executable.map(Path::to_path_buf),
                    },
                );
            }
            Err(e) => scan.skip(&path, e.to_string()),
        }
    }

    info!("Found {} Epic games in {}", scan.entries.len(), dir.display());
    scan
}

/// Start an Epic game directly, falling back to the Epic launcher
pub fn launch_epic_game(executable: &Path, title: &str, launcher: Option<&Path>) -> LauncherResult<()> {
    info!("Launching Game \"{}\"...", title);

    let error = match Command::new(executable).spawn() {
        Ok(_) => {
            info!("Successfully Launched \"{}\"", title);
            return Ok(());
        }
        Err(e) => e,
    };

    warn!(
        "Failed to launch \"{}\" ({}), opening the Epic Games launcher",
        title, error
    );

    let launcher = launcher.ok_or_else(|| LauncherError::Launch {
        title: title.to_string(),
        reason: format!("{} and no Epic Games launcher is configured", error),
    })?;

    Command::new(launcher)
        .spawn()
        .map(|_| ())
        .map_err(|e| LauncherError::Launch {
            title: title.to_string(),
            reason: format!("{} ({})", e, launcher.display()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, location: &str, executable: &str) -> String {
        serde_json::json!({
            "FormatVersion": 0,
            "DisplayName": name,
            "InstallLocation": location,
            "LaunchExecutable": executable,
            "AppName": "Fortnite",
        })
        .to_string()
    }

    #[test]
    fn test_fortnite_substitution() {
        assert_eq!(resolve_launch_executable(FORTNITE_LAUNCHER), FORTNITE_SHIPPING_CLIENT);
        assert_eq!(resolve_launch_executable("Game/Bin/Game.exe"), "Game/Bin/Game.exe");
    }

    #[test]
    fn test_join_normalized() {
        assert_eq!(
            join_normalized("/games/Hades", "x64/Hades.exe"),
            PathBuf::from("/games/Hades/x64/Hades.exe")
        );
        assert_eq!(
            join_normalized("/games/Hades/", "./bin/../x64\\Hades.exe"),
            PathBuf::from("/games/Hades/x64/Hades.exe")
        );
        assert_eq!(join_normalized("games", "a.exe"), PathBuf::from("games").join("a.exe"));
    }

    #[test]
    fn test_scan_substitutes_fortnite_executable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("fortnite.item"),
            item("Fortnite", "/games/Fortnite", FORTNITE_LAUNCHER),
        )
        .unwrap();

        let launcher = PathBuf::from("/epic/EpicGamesLauncher.exe");
        let scan = scan_epic_manifests(dir.path(), Some(launcher.as_path()));
        let game = &scan.entries["Fortnite"];
        assert_eq!(
            game.executable,
            PathBuf::from("/games/Fortnite").join(FORTNITE_SHIPPING_CLIENT)
        );
        assert_eq!(game.launcher_executable.as_deref(), Some(launcher.as_path()));
    }

    #[test]
    fn test_scan_only_reads_item_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.item"), item("Hades", "/games/Hades", "x64/Hades.exe")).unwrap();
        fs::write(dir.path().join("notes.txt"), item("Nope", "/x", "y.exe")).unwrap();

        let scan = scan_epic_manifests(dir.path(), None);
        let titles: Vec<&str> = scan.entries.keys().map(String::as_str).collect();
        assert_eq!(titles, vec!["Hades"]);
        assert_eq!(scan.entries["Hades"].launcher_executable, None);
    }

    #[test]
    fn test_scan_skips_malformed_items() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.item"), "{ not json").unwrap();
        fs::write(dir.path().join("nameless.item"), "{\"InstallLocation\": \"/x\"}").unwrap();
        fs::write(dir.path().join("ok.item"), item("Celeste", "/games/Celeste", "Celeste.exe")).unwrap();

        let scan = scan_epic_manifests(dir.path(), None);
        assert_eq!(scan.entries.len(), 1);
        assert_eq!(scan.issues.len(), 2);
        assert!(!scan.is_directory_missing());
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let scan = scan_epic_manifests(&dir.path().join("Manifests"), None);
        assert!(scan.entries.is_empty());
        assert!(scan.is_directory_missing());
    }

    #[test]
    fn test_read_item_error_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.item");
        let nameless = dir.path().join("nameless.item");
        fs::write(&broken, "{ not json").unwrap();
        fs::write(&nameless, "{\"DisplayName\": \"\", \"InstallLocation\": \"/x\"}").unwrap();

        assert!(matches!(read_item(&broken), Err(LauncherError::Json(_))));
        assert!(matches!(read_item(&nameless), Err(LauncherError::Json(_))));
        assert!(matches!(
            read_item(&dir.path().join("gone.item")),
            Err(LauncherError::Io(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_falls_back_to_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let missing_game = dir.path().join("missing.exe");

        // `true` stands in for the Epic launcher and always starts
        let result = launch_epic_game(&missing_game, "Hades", Some(Path::new("true")));
        assert!(result.is_ok());

        let result = launch_epic_game(&missing_game, "Hades", None);
        assert!(matches!(result, Err(LauncherError::Launch { .. })));
    }
}
