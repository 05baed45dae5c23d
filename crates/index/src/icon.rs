//! Icon provider: unlike the other domain indexers this isn't backed by a
//! [`shopware_lsp_database::FactStore`] — icon packs rarely change and a
//! workspace rarely has more than a few thousand SVGs, so a plain on-demand
//! `walkdir` scan is cheap enough and avoids keeping a cache in sync with a
//! directory that's usually vendored, not hand-edited.

use std::path::Path;

use walkdir::WalkDir;

/// One `<pack>/<name>.svg` found under a storefront dist asset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    pub pack: String,
    pub name: String,
    pub path: String,
}

pub struct IconProvider;

impl IconProvider {
    /// Scans every known icon root under `workspace_root` for
    /// `Resources/app/storefront/dist/assets/icon/<pack>/<name>.svg` files.
    pub fn scan(workspace_root: &Path) -> Vec<IconEntry> {
        let mut entries = Vec::new();

        for root in icon_roots(workspace_root) {
            for entry in WalkDir::new(&root).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("svg") {
                    continue;
                }

                let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else { continue };
                let Some(pack) = path.parent().and_then(|parent| parent.file_name()).and_then(|name| name.to_str()) else {
                    continue;
                };

                entries.push(IconEntry { pack: pack.to_string(), name: name.to_string(), path: path.to_string_lossy().into_owned() });
            }
        }

        entries
    }

    pub fn packs(workspace_root: &Path) -> Vec<String> {
        let mut packs: Vec<String> = Self::scan(workspace_root).into_iter().map(|entry| entry.pack).collect();
        packs.sort_unstable();
        packs.dedup();
        packs
    }
}

/// Every `Resources/app/storefront/dist/assets/icon` directory reachable
/// under the workspace root, at any nesting depth (bundles, plugins and the
/// core framework all ship their own icon tree at that relative path).
fn icon_roots(workspace_root: &Path) -> Vec<std::path::PathBuf> {
    const SUFFIX: &str = "Resources/app/storefront/dist/assets/icon";

    WalkDir::new(workspace_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| entry.path().to_string_lossy().ends_with(SUFFIX))
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_icons_under_a_pack_directory() {
        let dir = tempfile::tempdir().unwrap();
        let pack_dir = dir.path().join("vendor/framework/src/Storefront/Resources/app/storefront/dist/assets/icon/regular");
        std::fs::create_dir_all(&pack_dir).unwrap();
        std::fs::write(pack_dir.join("chevron-right.svg"), "<svg></svg>").unwrap();

        let entries = IconProvider::scan(dir.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pack, "regular");
        assert_eq!(entries[0].name, "chevron-right");
    }

    #[test]
    fn lists_distinct_packs_across_multiple_roots() {
        let dir = tempfile::tempdir().unwrap();
        let core = dir.path().join("vendor/framework/Resources/app/storefront/dist/assets/icon/regular");
        let plugin = dir.path().join("plugins/MyPlugin/Resources/app/storefront/dist/assets/icon/solid");
        std::fs::create_dir_all(&core).unwrap();
        std::fs::create_dir_all(&plugin).unwrap();
        std::fs::write(core.join("a.svg"), "<svg/>").unwrap();
        std::fs::write(plugin.join("b.svg"), "<svg/>").unwrap();

        let packs = IconProvider::packs(dir.path());
        assert_eq!(packs, vec!["regular".to_string(), "solid".to_string()]);
    }

    #[test]
    fn ignores_non_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        let pack_dir = dir.path().join("Resources/app/storefront/dist/assets/icon/regular");
        std::fs::create_dir_all(&pack_dir).unwrap();
        std::fs::write(pack_dir.join("readme.txt"), "not an icon").unwrap();

        assert!(IconProvider::scan(dir.path()).is_empty());
    }
}
