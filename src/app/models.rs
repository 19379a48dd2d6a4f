use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source folder every asset path is resolved under.
pub const SRC_FOLDER: &str = "src";
/// Output folder rebuilt on every run.
pub const DIST_FOLDER: &str = "dist";

/// Per-invocation build mode, resolved once from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub minify: bool,
    pub purge_css: bool,
    pub lite: bool,
    pub clean_only: bool,
    pub skip_images: bool,
}

impl BuildOptions {
    /// Minification is on when requested directly or through `lite`.
    pub fn minify(&self) -> bool {
        self.minify || self.lite
    }

    /// Purging is on when requested directly or through `lite`.
    pub fn purge(&self) -> bool {
        self.purge_css || self.lite
    }
}

/// The asset classes that carry their own blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Css,
    Js,
    Images,
    Fonts,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Css => "css",
            AssetClass::Js => "js",
            AssetClass::Images => "images",
            AssetClass::Fonts => "fonts",
        }
    }
}

/// Files and folders excluded from one asset class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetBlacklist {
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

/// The merged build configuration. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    #[serde(rename = "assetsBlacklist")]
    pub assets_blacklist: BTreeMap<String, AssetBlacklist>,
    #[serde(rename = "purgeCSSSafeList")]
    pub purge_css_safe_list: Vec<String>,
    #[serde(rename = "sassOptions")]
    pub sass_options: BTreeMap<String, toml::Value>,
}

impl BuildConfig {
    pub fn blacklist(&self, class: AssetClass) -> Option<&AssetBlacklist> {
        self.assets_blacklist.get(class.as_str())
    }
}

/// Resolved source and output roots for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub root: PathBuf,
}

impl BuildPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn src(&self) -> PathBuf {
        self.root.join(SRC_FOLDER)
    }

    pub fn dist(&self) -> PathBuf {
        self.root.join(DIST_FOLDER)
    }

    /// Maps a source file onto the output tree by swapping `from` for `to`.
    pub fn rebase(&self, file: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
        let relative = pathdiff::diff_paths(file, from)?;
        Some(to.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lite_implies_minify_and_purge() {
        let options = BuildOptions {
            lite: true,
            ..BuildOptions::default()
        };
        assert!(options.minify());
        assert!(options.purge());
        assert!(!BuildOptions::default().minify());
        assert!(!BuildOptions::default().purge());
    }

    #[test]
    fn rebase_swaps_root_segment() {
        let paths = BuildPaths::new("/project");
        let out = paths.rebase(
            Path::new("/project/src/assets/js/app/main.js"),
            &paths.src(),
            &paths.dist(),
        );
        assert_eq!(out, Some(PathBuf::from("/project/dist/assets/js/app/main.js")));
    }
}
