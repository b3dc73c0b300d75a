use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::platform::{GameEntry, Platform};
use crate::config::{LauncherConfig, PlatformConfig, RESERVED_SECTIONS};

/// Games of one platform, ordered by title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubCatalog {
    pub games: BTreeMap<String, GameEntry>,
    /// Directories that were scanned, in order
    pub roots: Vec<PathBuf>,
    /// Configured directories that do not exist
    pub missing_roots: Vec<PathBuf>,
}

impl SubCatalog {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Games in title order
    pub fn iter(&self) -> impl Iterator<Item = &GameEntry> {
        self.games.values()
    }
}

/// Every discovered game, split by platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    platforms: BTreeMap<Platform, SubCatalog>,
}

impl Catalog {
    /// Sub-catalog of a platform. Always present after a build.
    pub fn platform(&self, platform: Platform) -> Option<&SubCatalog> {
        self.platforms.get(&platform)
    }

    /// Game with the given title on a platform
    pub fn find(&self, platform: Platform, title: &str) -> Option<&GameEntry> {
        self.platforms.get(&platform)?.games.get(title)
    }

    /// Number of games across all platforms
    pub fn len(&self) -> usize {
        self.platforms.values().map(SubCatalog::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a [`Catalog`] from the configured manifest directories
pub struct CatalogBuilder;

impl CatalogBuilder {
    /// Scan every configured directory of every platform.
    ///
    /// The catalog is rebuilt from scratch. Later directories overwrite
    /// earlier ones on title collisions. A platform without configured
    /// directories ends up with an empty sub-catalog.
    pub fn build(config: &LauncherConfig) -> Catalog {
        info!("Building game catalog");

        for section in &config.sections {
            if RESERVED_SECTIONS.contains(&section.name.as_str()) {
                debug!("Launcher '{}' is not supported yet, skipping", section.name);
            }
        }

        let mut platforms = BTreeMap::new();
        for platform in Platform::ALL {
            let launcher = platform.launcher();
            let platform_config = config
                .platform(launcher.section())
                .cloned()
                .unwrap_or_else(PlatformConfig::default);

            let sub_catalog = Self::build_platform(platform, &platform_config);
            info!("{}: {} games", platform, sub_catalog.len());
            platforms.insert(platform, sub_catalog);
        }

        Catalog { platforms }
    }

    fn build_platform(platform: Platform, config: &PlatformConfig) -> SubCatalog {
        let launcher = platform.launcher();
        let mut sub_catalog = SubCatalog::default();

        for root in launcher.scan_roots(config) {
            // Malformed manifests are logged by the scanners
            let scan = launcher.scan(&root, config);
            if scan.is_directory_missing() {
                warn!("{} directory {} does not exist", platform, root.display());
                sub_catalog.missing_roots.push(root.clone());
            }

            sub_catalog.games.extend(scan.entries);
            sub_catalog.roots.push(root);
        }

        sub_catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlatformSection, EPIC_SECTION, STEAM_SECTION};
    use std::fs;
    use std::path::Path;

    fn steam_manifest(dir: &Path, app_id: &str, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(format!("appmanifest_{}.acf", app_id)),
            format!("\"AppState\"\n{{\n\t\"appid\"\t\t\"{}\"\n\t\"name\"\t\t\"{}\"\n}}\n", app_id, name),
        )
        .unwrap();
    }

    fn epic_item(dir: &Path, file: &str, name: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(file),
            serde_json::json!({
                "DisplayName": name,
                "InstallLocation": "/games/epic",
                "LaunchExecutable": "Game.exe",
            })
            .to_string(),
        )
        .unwrap();
    }

    fn section(name: &str, path1: Option<&Path>, path2: Option<&Path>) -> PlatformSection {
        PlatformSection {
            name: name.to_string(),
            config: PlatformConfig {
                path1: path1.map(|p| p.to_string_lossy().to_string()),
                path2: path2.map(|p| p.to_string_lossy().to_string()),
                executable: Some("/steam/steam".to_string()),
            },
        }
    }

    fn titles(catalog: &Catalog, platform: Platform) -> Vec<String> {
        catalog
            .platform(platform)
            .unwrap()
            .iter()
            .map(|g| g.title.clone())
            .collect()
    }

    #[test]
    fn test_merges_both_steam_paths_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let lib1 = dir.path().join("lib1");
        let lib2 = dir.path().join("lib2");
        steam_manifest(&lib1, "620", "Portal 2");
        steam_manifest(&lib2, "4000", "Garry's Mod");
        steam_manifest(&lib2, "70", "Half Life");

        let config = LauncherConfig {
            sections: vec![section(STEAM_SECTION, Some(&lib1), Some(&lib2))],
        };
        let catalog = CatalogBuilder::build(&config);
        assert_eq!(
            titles(&catalog, Platform::Steam),
            vec!["Garrys Mod", "Half Life", "Portal 2"]
        );

        let gmod = catalog.find(Platform::Steam, "Garrys Mod").unwrap();
        assert_eq!(gmod.identifier, "4000");
        assert_eq!(
            gmod.target,
            crate::library::LaunchTarget::Steam {
                app_id: "4000".to_string(),
                client_executable: Some(PathBuf::from("/steam/steam")),
            }
        );
    }

    #[test]
    fn test_later_path_wins_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let lib1 = dir.path().join("lib1");
        let lib2 = dir.path().join("lib2");
        steam_manifest(&lib1, "1", "Duplicate");
        steam_manifest(&lib2, "2", "Duplicate");

        let config = LauncherConfig {
            sections: vec![section(STEAM_SECTION, Some(&lib1), Some(&lib2))],
        };
        let catalog = CatalogBuilder::build(&config);
        assert_eq!(catalog.find(Platform::Steam, "Duplicate").unwrap().identifier, "2");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_missing_path_does_not_block_other_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let lib2 = dir.path().join("lib2");
        steam_manifest(&lib2, "620", "Portal 2");
        fs::write(lib2.join("appmanifest_9.acf"), "garbage").unwrap();

        let config = LauncherConfig {
            sections: vec![section(STEAM_SECTION, Some(&missing), Some(&lib2))],
        };
        let catalog = CatalogBuilder::build(&config);
        let steam = catalog.platform(Platform::Steam).unwrap();
        assert_eq!(titles(&catalog, Platform::Steam), vec!["Portal 2"]);
        assert_eq!(steam.missing_roots, vec![missing]);
    }

    #[test]
    fn test_cleared_paths_reset_sub_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let lib1 = dir.path().join("lib1");
        steam_manifest(&lib1, "620", "Portal 2");

        let mut config = LauncherConfig {
            sections: vec![section(STEAM_SECTION, Some(&lib1), None)],
        };
        let catalog = CatalogBuilder::build(&config);
        assert_eq!(catalog.platform(Platform::Steam).unwrap().len(), 1);

        config.sections[0].config.path1 = Some(String::new());
        config.sections[0].config.path2 = None;
        let catalog = CatalogBuilder::build(&config);
        let steam = catalog.platform(Platform::Steam).unwrap();
        assert!(steam.is_empty());
        assert!(steam.roots.is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let steam = dir.path().join("steam");
        let epic = dir.path().join("epic");
        steam_manifest(&steam, "620", "Portal 2");
        steam_manifest(&steam, "4000", "Garry's Mod");
        epic_item(&epic, "a.item", "Hades");
        epic_item(&epic, "b.item", "Celeste");

        let config = LauncherConfig {
            sections: vec![
                section(STEAM_SECTION, Some(&steam), None),
                section(EPIC_SECTION, Some(&epic), None),
            ],
        };
        let first = CatalogBuilder::build(&config);
        let second = CatalogBuilder::build(&config);
        assert_eq!(first, second);
        assert_eq!(titles(&first, Platform::Epic), vec!["Celeste", "Hades"]);
    }

    #[test]
    fn test_absent_sections_give_empty_sub_catalogs() {
        let catalog = CatalogBuilder::build(&LauncherConfig::default());
        for platform in Platform::ALL {
            assert!(catalog.platform(platform).unwrap().is_empty());
        }
        assert!(catalog.is_empty());
    }
}
