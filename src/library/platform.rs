use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use super::epic::{launch_epic_game, scan_epic_manifests};
use super::scan::ManifestScan;
use super::steam::{launch_steam_game, scan_steam_manifests};
use crate::config::{PlatformConfig, EPIC_SECTION, STEAM_SECTION};
use crate::error::{LauncherError, LauncherResult};

/// Launcher platforms the catalog knows how to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Steam,
    Epic,
}

impl Platform {
    /// Every implemented platform, in dashboard order
    pub const ALL: [Platform; 2] = [Platform::Steam, Platform::Epic];

    /// The scanner and launcher for this platform
    pub fn launcher(&self) -> &'static dyn LauncherPlatform {
        match self {
            Platform::Steam => &SteamLauncher,
            Platform::Epic => &EpicLauncher,
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Steam => write!(f, "Steam"),
            Platform::Epic => write!(f, "Epic Games"),
        }
    }
}

/// How a catalog entry is started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// Through the Steam client with `-applaunch`
    Steam {
        app_id: String,
        client_executable: Option<PathBuf>,
    },
    /// Directly, with the Epic launcher as fallback
    Epic {
        executable: PathBuf,
        launcher_executable: Option<PathBuf>,
    },
}

/// An installed title found in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntry {
    pub title: String,
    /// Steam app ID or the Epic executable path
    pub identifier: String,
    pub platform: Platform,
    pub target: LaunchTarget,
}

/// Scanning and launching for one launcher platform
pub trait LauncherPlatform {
    fn platform(&self) -> Platform;

    /// Config section holding this platform's paths
    fn section(&self) -> &'static str;

    /// Configured, non-blank manifest directories in scan order
    fn scan_roots(&self, config: &PlatformConfig) -> Vec<PathBuf>;

    /// Read the manifests in one directory
    fn scan(&self, root: &Path, config: &PlatformConfig) -> ManifestScan<GameEntry>;

    /// Start the game described by `entry`
    fn launch(&self, entry: &GameEntry) -> LauncherResult<()>;
}

pub struct SteamLauncher;

impl LauncherPlatform for SteamLauncher {
    fn platform(&self) -> Platform {
        Platform::Steam
    }

    fn section(&self) -> &'static str {
        STEAM_SECTION
    }

    fn scan_roots(&self, config: &PlatformConfig) -> Vec<PathBuf> {
        config
            .path1_root()
            .into_iter()
            .chain(config.path2_root())
            .collect()
    }

    fn scan(&self, root: &Path, config: &PlatformConfig) -> ManifestScan<GameEntry> {
        let client_executable = config.executable_path();

        scan_steam_manifests(root).map(|title, app_id| GameEntry {
            title: title.to_string(),
            identifier: app_id.clone(),
            platform: Platform::Steam,
            target: LaunchTarget::Steam {
                app_id,
                client_executable: client_executable.clone(),
            },
        })
    }

    fn launch(&self, entry: &GameEntry) -> LauncherResult<()> {
        match &entry.target {
            LaunchTarget::Steam {
                app_id,
                client_executable: Some(client),
            } => launch_steam_game(client, app_id, &entry.title),
            LaunchTarget::Steam { .. } => Err(LauncherError::Launch {
                title: entry.title.clone(),
                reason: "no Steam executable is configured".to_string(),
            }),
            LaunchTarget::Epic { .. } => Err(wrong_platform(entry, Platform::Steam)),
        }
    }
}

pub struct EpicLauncher;

impl LauncherPlatform for EpicLauncher {
    fn platform(&self) -> Platform {
        Platform::Epic
    }

    fn section(&self) -> &'static str {
        EPIC_SECTION
    }

    // Epic keeps every manifest in a single directory
    fn scan_roots(&self, config: &PlatformConfig) -> Vec<PathBuf> {
        config.path1_root().into_iter().collect()
    }

    fn scan(&self, root: &Path, config: &PlatformConfig) -> ManifestScan<GameEntry> {
        let launcher = config.executable_path();

        scan_epic_manifests(root, launcher.as_deref()).map(|title, game| GameEntry {
            title: title.to_string(),
            identifier: game.executable.to_string_lossy().to_string(),
            platform: Platform::Epic,
            target: LaunchTarget::Epic {
                executable: game.executable,
                launcher_executable: game.launcher_executable,
            },
        })
    }

    fn launch(&self, entry: &GameEntry) -> LauncherResult<()> {
        match &entry.target {
            LaunchTarget::Epic {
                executable,
                launcher_executable,
            } => launch_epic_game(executable, &entry.title, launcher_executable.as_deref()),
            LaunchTarget::Steam { .. } => Err(wrong_platform(entry, Platform::Epic)),
        }
    }
}

fn wrong_platform(entry: &GameEntry, platform: Platform) -> LauncherError {
    LauncherError::Launch {
        title: entry.title.clone(),
        reason: format!("{} entry handed to the {} launcher", entry.platform, platform),
    }
}
