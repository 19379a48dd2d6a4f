use crate::app::models::{AssetBlacklist, AssetClass, BuildConfig};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use toml::Value;

/// Optional user configuration, looked up in the project root.
pub const CONFIG_FILE: &str = "build.config.toml";

const CSS_BLACKLIST: &[&str] = &["magic-cursor.css"];

const JS_BLACKLIST: &[&str] = &[
    "app-head.js",
    "uikit-components.js",
    "uni-core-icons.min.js",
    "uni-core.min.js",
    "anime-helper-defined-timelines.js",
    "dynamic-background.js",
    "imgtrigger.js",
];

const JS_BLACKLIST_FOLDERS: &[&str] = &["uni-core/css/components/**", "uni-core/js/components/**"];

const PURGE_SAFE_LIST: &[&str] = &[
    "bp-xs",
    "bp-sm",
    "bp-md",
    "bp-lg",
    "bp-xl",
    "bp-xxl",
    "dom-ready",
    "page-preload",
    "loaded",
    "page-revealer",
    "darkmode-trigger",
    "uc-sticky-placeholder",
    "header",
    "uc-sticky",
    "uc-open",
    "uc-active",
    "uc-sticky-below",
    "uc-sticky-fixed",
    "inner",
    "nav-desktop",
    "wrap",
    "sm:hstack",
    "xl:btn-xl",
    "uc-svg",
    "uc-circle-text",
    "uc-circle-text-path",
    "center-icon",
    "uni-testimonials",
    "image-hover-revealer",
    "[dir=ltr]",
    "[dir=rtl]",
    "swiper-pagination-clickable",
    "swiper-pagination-bullets",
    "swiper-pagination-horizontal",
    "swiper-pagination-bullet",
    "swiper-pagination-bullet-active",
    "swiper-slide-fully-visible",
    "swiper-watch-progress",
    "swiper-initialized",
    "swiper-horizontal",
    "swiper-slide-visible",
    "swiper-slide-prev",
    "swiper-slide-next",
    "swiper-slide-active",
    "uc-accordion",
    "uc-switcher",
    "uc-grid",
    "uc-grid-margin",
    "uc-tab",
    "uc-tooltip",
];

const SILENCED_DEPRECATIONS: &[&str] = &["mixed-decls", "import", "global-builtin", "color-functions"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The compiled-in configuration used when no user file applies.
pub fn default_config() -> BuildConfig {
    let mut assets_blacklist = BTreeMap::new();
    assets_blacklist.insert(
        AssetClass::Css.as_str().to_string(),
        AssetBlacklist {
            files: strings(CSS_BLACKLIST),
            folders: Vec::new(),
        },
    );
    assets_blacklist.insert(
        AssetClass::Js.as_str().to_string(),
        AssetBlacklist {
            files: strings(JS_BLACKLIST),
            folders: strings(JS_BLACKLIST_FOLDERS),
        },
    );
    assets_blacklist.insert(AssetClass::Images.as_str().to_string(), AssetBlacklist::default());
    assets_blacklist.insert(AssetClass::Fonts.as_str().to_string(), AssetBlacklist::default());

    let mut sass_options = BTreeMap::new();
    sass_options.insert(
        "silenceDeprecations".to_string(),
        Value::Array(SILENCED_DEPRECATIONS.iter().map(|s| Value::from(*s)).collect()),
    );

    BuildConfig {
        assets_blacklist,
        purge_css_safe_list: strings(PURGE_SAFE_LIST),
        sass_options,
    }
}

/// Loads `build.config.toml` from `root` over the compiled-in defaults.
pub fn resolve_config(root: &Path) -> BuildConfig {
    load(default_config(), &root.join(CONFIG_FILE))
}

/// Merges the user file at `user_path` over `defaults`. Never fails: a
/// missing, unreadable or malformed file leaves `defaults` untouched.
pub fn load(defaults: BuildConfig, user_path: &Path) -> BuildConfig {
    if !user_path.exists() {
        log::info!("ℹ️  No external build configuration found, using defaults");
        return defaults;
    }

    match read_user_config(user_path).and_then(|user| merge_config(&defaults, user)) {
        Ok(config) => {
            log::info!("📝 Loaded external build configuration");
            config
        }
        Err(err) => {
            log::warn!("⚠️ {:#}", err);
            log::info!("ℹ️  Falling back to default build configuration");
            defaults
        }
    }
}

fn read_user_config(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {:?}", path))?;
    let table: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", CONFIG_FILE))?;
    Ok(Value::Table(table))
}

/// Applies `user` on top of `defaults` with [`merge_values`] and reads the
/// result back as a [`BuildConfig`].
pub fn merge_config(defaults: &BuildConfig, user: Value) -> Result<BuildConfig> {
    let mut merged =
        Value::try_from(defaults).context("Failed to serialize default build configuration")?;
    merge_values(&mut merged, user);
    merged
        .try_into()
        .with_context(|| format!("{} does not match the build configuration shape", CONFIG_FILE))
}

/// Tables merge key by key, arrays concatenate (base first, duplicates
/// kept), everything else is replaced by the overlay.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base), Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(overlay)) => base.extend(overlay),
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(doc: &str) -> Value {
        Value::Table(toml::from_str(doc).unwrap())
    }

    #[test]
    fn empty_user_config_is_identity() {
        let defaults = default_config();
        let merged = merge_config(&defaults, user("")).unwrap();
        assert_eq!(merged, defaults);
    }

    #[test]
    fn list_fields_are_concatenated() {
        let defaults = default_config();
        let merged = merge_config(
            &defaults,
            user(
                r#"
                purgeCSSSafeList = ["bp-xs", "extra"]

                [assetsBlacklist.css]
                files = ["magic-cursor.css", "uni-core-bundle.min.css"]
                folders = ["uni-core/css/components/**"]
                "#,
            ),
        )
        .unwrap();

        let css = merged.blacklist(AssetClass::Css).unwrap();
        assert_eq!(css.files.len(), CSS_BLACKLIST.len() + 2);
        assert_eq!(css.files[..CSS_BLACKLIST.len()], strings(CSS_BLACKLIST)[..]);
        assert_eq!(css.files.last().map(String::as_str), Some("uni-core-bundle.min.css"));
        assert_eq!(css.folders, vec!["uni-core/css/components/**".to_string()]);
        assert_eq!(merged.purge_css_safe_list.len(), PURGE_SAFE_LIST.len() + 2);

        // Untouched classes keep their defaults.
        assert_eq!(merged.blacklist(AssetClass::Js), defaults.blacklist(AssetClass::Js));
    }

    #[test]
    fn scalar_and_map_fields_merge_by_key() {
        let merged = merge_config(
            &default_config(),
            user(
                r#"
                [sassOptions]
                style = "compressed"
                silenceDeprecations = ["slash-div"]

                [assetsBlacklist.fonts]
                files = ["old.woff"]
                "#,
            ),
        )
        .unwrap();

        assert_eq!(merged.sass_options.get("style"), Some(&Value::from("compressed")));
        let silenced = merged.sass_options["silenceDeprecations"].as_array().unwrap();
        assert_eq!(silenced.len(), SILENCED_DEPRECATIONS.len() + 1);
        assert_eq!(
            merged.blacklist(AssetClass::Fonts).unwrap().files,
            vec!["old.woff".to_string()]
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(default_config(), &dir.path().join(CONFIG_FILE));
        assert_eq!(config, default_config());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        fs::write(&path, "assetsBlacklist = [[[").unwrap();
        assert_eq!(load(default_config(), &path), default_config());

        fs::write(&path, "purgeCSSSafeList = 3").unwrap();
        assert_eq!(load(default_config(), &path), default_config());
    }

    #[test]
    fn user_file_is_merged_from_project_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[assetsBlacklist.images]\nfolders = [\"raw/**\"]\n",
        )
        .unwrap();
        let config = resolve_config(dir.path());
        assert_eq!(
            config.blacklist(AssetClass::Images).unwrap().folders,
            vec!["raw/**".to_string()]
        );
    }
}
