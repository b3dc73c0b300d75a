use ini::{EscapePolicy, Ini, ParseOption, Properties, WriteOption};
use log::{debug, info};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::error::{LauncherError, LauncherResult};

/// Section name for the Steam client
pub const STEAM_SECTION: &str = "Steam";
/// Section name for the Epic Games launcher
pub const EPIC_SECTION: &str = "Epic Games";
/// Sections reserved for launchers that are read but never scanned
pub const RESERVED_SECTIONS: [&str; 2] = ["Battle.NET", "Xbox"];

const PATH1_KEY: &str = "path1";
const PATH2_KEY: &str = "path2";
const EXECUTABLE_KEY: &str = "executable";

/// Value written to a slot when the user clears it. The key stays in the file.
pub const CLEARED_PATH: &str = "";

/// Paths configured for one launcher platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformConfig {
    /// First manifest directory
    pub path1: Option<String>,
    /// Second manifest directory
    pub path2: Option<String>,
    /// The platform's own launcher binary
    pub executable: Option<String>,
}

impl PlatformConfig {
    /// First manifest directory, unless unset or cleared
    pub fn path1_root(&self) -> Option<PathBuf> {
        non_blank(&self.path1)
    }

    /// Second manifest directory, unless unset or cleared
    pub fn path2_root(&self) -> Option<PathBuf> {
        non_blank(&self.path2)
    }

    /// Launcher executable, unless unset or blank
    pub fn executable_path(&self) -> Option<PathBuf> {
        non_blank(&self.executable)
    }
}

fn non_blank(value: &Option<String>) -> Option<PathBuf> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// One `[section]` of the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSection {
    pub name: String,
    pub config: PlatformConfig,
}

/// Parsed config file, sections kept in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    pub sections: Vec<PlatformSection>,
}

impl LauncherConfig {
    /// Look up a platform's paths by section name
    pub fn platform(&self, name: &str) -> Option<&PlatformConfig> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.config)
    }

    /// Apply a slot update to the in-memory copy, using the same addressing as [`update_config`]
    pub fn set_slot(&mut self, slot: PathSlot, value: &str) -> LauncherResult<()> {
        let presence = self
            .sections
            .iter()
            .map(|s| (s.config.path1.is_some(), s.config.path2.is_some()));
        let index = resolve_slot(presence, slot).ok_or(LauncherError::NoMatchingSlot(slot))?;

        let config = &mut self.sections[index].config;
        match slot.key() {
            PATH1_KEY => config.path1 = Some(value.to_string()),
            _ => config.path2 = Some(value.to_string()),
        }
        Ok(())
    }
}

/// Positional address of a path field in the config file.
///
/// Slots count key occurrences across sections in file order, not platform
/// names. With the shipped layout (`Steam` before `Epic Games`) slot 1 and 2
/// are Steam's paths and slot 3 is the Epic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSlot {
    /// First section that has a `path1` key
    FirstPath1,
    /// First section that has a `path2` key
    FirstPath2,
    /// Second section that has a `path1` key
    SecondPath1,
    /// Second section that has a `path2` key
    SecondPath2,
}

impl PathSlot {
    /// Numeric id used by older config tooling (1-4)
    pub fn id(&self) -> u8 {
        match self {
            PathSlot::FirstPath1 => 1,
            PathSlot::FirstPath2 => 2,
            PathSlot::SecondPath1 => 3,
            PathSlot::SecondPath2 => 4,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            PathSlot::FirstPath1 | PathSlot::SecondPath1 => PATH1_KEY,
            PathSlot::FirstPath2 | PathSlot::SecondPath2 => PATH2_KEY,
        }
    }

    fn occurrence(&self) -> usize {
        match self {
            PathSlot::FirstPath1 | PathSlot::FirstPath2 => 1,
            PathSlot::SecondPath1 | PathSlot::SecondPath2 => 2,
        }
    }
}

impl Display for PathSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Walk sections in file order and return the index of the section addressed by `slot`.
///
/// `sections` yields `(has_path1, has_path2)` per section. A key counts as
/// present even when it holds the cleared value.
pub fn resolve_slot<I>(sections: I, slot: PathSlot) -> Option<usize>
where
    I: IntoIterator<Item = (bool, bool)>,
{
    let mut path1_count = 0;
    let mut path2_count = 0;

    for (index, (has_path1, has_path2)) in sections.into_iter().enumerate() {
        if has_path1 {
            path1_count += 1;
        }
        if has_path2 {
            path2_count += 1;
        }

        let hit = match slot.key() {
            PATH1_KEY => has_path1 && path1_count == slot.occurrence(),
            _ => has_path2 && path2_count == slot.occurrence(),
        };
        if hit {
            return Some(index);
        }
    }

    None
}

fn parse_option() -> ParseOption {
    // Windows paths are full of backslashes, read them verbatim
    ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

fn write_option() -> WriteOption {
    WriteOption {
        escape_policy: EscapePolicy::Nothing,
        ..Default::default()
    }
}

/// Value of `key` in a section. Keys match case-insensitively, `Path1` reads as `path1`.
fn get_key<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

// Spelling of `key` as it appears in the file
fn stored_key(props: &Properties, key: &str) -> Option<String> {
    props
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(k, _)| k.to_string())
}

fn load_ini(path: &Path) -> LauncherResult<Ini> {
    if !path.exists() {
        return Err(LauncherError::ConfigNotFound(path.to_path_buf()));
    }
    Ok(Ini::load_from_file_opt(path, parse_option())?)
}

/// Read the config file into per-platform paths
pub fn read_config(path: &Path) -> LauncherResult<LauncherConfig> {
    let ini = load_ini(path)?;

    let sections = ini
        .iter()
        .filter_map(|(name, props)| {
            let name = name?;
            Some(PlatformSection {
                name: name.to_string(),
                config: PlatformConfig {
                    path1: get_key(props, PATH1_KEY).map(str::to_string),
                    path2: get_key(props, PATH2_KEY).map(str::to_string),
                    executable: get_key(props, EXECUTABLE_KEY).map(str::to_string),
                },
            })
        })
        .collect::<Vec<_>>();

    debug!("Read {} sections from {}", sections.len(), path.display());
    Ok(LauncherConfig { sections })
}

/// Write the whole config back, sections in order and only the keys that are set
pub fn write_config(path: &Path, config: &LauncherConfig) -> LauncherResult<()> {
    let mut ini = Ini::new();

    for section in &config.sections {
        // Sections without keys (the reserved launchers) still get a header
        ini.entry(Some(section.name.clone())).or_insert_with(Default::default);

        let entries = [
            (PATH1_KEY, &section.config.path1),
            (PATH2_KEY, &section.config.path2),
            (EXECUTABLE_KEY, &section.config.executable),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                ini.set_to(Some(section.name.as_str()), key.to_string(), value.clone());
            }
        }
    }

    ini.write_to_file_opt(path, write_option())?;
    info!("Configuration saved to {}", path.display());
    Ok(())
}

/// Point the slot at `new_value` and rewrite the file.
///
/// Fails with [`LauncherError::NoMatchingSlot`] without touching the file when
/// the config has no such slot.
pub fn update_config(path: &Path, new_value: &str, slot: PathSlot) -> LauncherResult<()> {
    let mut ini = load_ini(path)?;

    let presence = ini
        .iter()
        .filter(|(name, _)| name.is_some())
        .map(|(_, props)| (get_key(props, PATH1_KEY).is_some(), get_key(props, PATH2_KEY).is_some()))
        .collect::<Vec<_>>();
    let index = resolve_slot(presence, slot).ok_or(LauncherError::NoMatchingSlot(slot))?;

    let props = ini
        .iter_mut()
        .filter(|(name, _)| name.is_some())
        .nth(index)
        .map(|(_, props)| props)
        .ok_or(LauncherError::NoMatchingSlot(slot))?;
    let key = stored_key(props, slot.key()).unwrap_or_else(|| slot.key().to_string());
    props.insert(key, new_value);

    ini.write_to_file_opt(path, write_option())?;
    info!("Path slot {} updated to '{}'", slot, new_value);
    Ok(())
}

/// Blank out a slot, keeping its key so later slots keep their numbering
pub fn clear_path(path: &Path, slot: PathSlot) -> LauncherResult<()> {
    update_config(path, CLEARED_PATH, slot)
}

/// Location of `config.ini`.
///
/// A `Config/config.ini` next to the executable wins, otherwise the file is
/// looked up in the user's config directory.
pub fn default_config_path() -> PathBuf {
    let portable = exe_dir().map(|dir| dir.join("Config").join("config.ini"));

    match portable {
        Some(path) if path.exists() => path,
        _ => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rocket-game-launcher")
            .join("config.ini"),
    }
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Load a `.env` file into the process environment, for `GIANT_BOMB_API_KEY`.
///
/// The working directory and its parents are searched first, then the
/// directory of the executable. Variables that are already set win.
pub fn load_env_file() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }
    let path = exe_dir()?.join(".env");
    load_env_from(&path).then_some(path)
}

fn load_env_from(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            debug!("No environment file at {}: {}", path.display(), e);
            false
        }
    }
}
