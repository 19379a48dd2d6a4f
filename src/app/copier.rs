use crate::app::error::BuildResult;
use crate::app::files::copy_file;
use crate::app::models::{AssetClass, BuildConfig, BuildOptions, BuildPaths, SRC_FOLDER};
use crate::app::patterns::{self, asset_root};
use crate::app::scanner::{match_files, MatchOptions};
use std::path::{Path, PathBuf};

/// Copies every file matched by `patterns` into `dest`, keeping its path
/// relative to `base`. Returns the written destinations.
pub fn copy_files(
    paths: &BuildPaths,
    patterns: &[String],
    dest: &Path,
    base: &Path,
) -> BuildResult<Vec<PathBuf>> {
    let files = match_files(&paths.root, patterns, MatchOptions { dot: true })?;
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let Some(target) = paths.rebase(&file, base, dest) else {
            continue;
        };
        log::debug!("Copying {} -> {}", file.display(), target.display());
        copy_file(&file, &target)?;
        written.push(target);
    }

    Ok(written)
}

fn class_patterns(class: AssetClass, config: &BuildConfig) -> Vec<String> {
    let mut all = vec![format!("{}/**/*", asset_root(class))];
    all.extend(patterns::compile(class, config));
    all
}

/// Fonts, favicon and (when present) images.
pub fn copy_assets(
    paths: &BuildPaths,
    config: &BuildConfig,
    options: &BuildOptions,
) -> BuildResult<Vec<PathBuf>> {
    log::info!("📦 Copying static assets (fonts, images, favicon)...");
    let src = paths.src();
    let dist = paths.dist();

    let mut written = copy_files(
        paths,
        &class_patterns(AssetClass::Fonts, config),
        &dist.join("assets/fonts"),
        &src.join("assets/fonts"),
    )?;

    written.extend(copy_files(
        paths,
        &[format!("{}/favicon.ico", SRC_FOLDER)],
        &dist,
        &src,
    )?);

    let images = src.join("assets/images");
    if options.skip_images {
        log::info!("⏭️  Skipping images (--skip-images)");
    } else if images.is_dir() {
        log::info!("📸 Copying images...");
        written.extend(copy_files(
            paths,
            &class_patterns(AssetClass::Images, config),
            &dist.join("assets/images"),
            &images,
        )?);
    } else {
        log::info!("📁 No images directory found, skipping...");
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::default_config;
    use crate::app::models::AssetBlacklist;
    use std::fs;

    fn touch(root: &Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn copies_fonts_and_favicon_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/assets/fonts/inter/inter.woff2", &[0, 159, 146, 150]);
        touch(root, "src/favicon.ico", b"ico");

        let paths = BuildPaths::new(root);
        copy_assets(&paths, &default_config(), &BuildOptions::default()).unwrap();

        assert_eq!(
            fs::read(root.join("dist/assets/fonts/inter/inter.woff2")).unwrap(),
            vec![0, 159, 146, 150]
        );
        assert_eq!(fs::read(root.join("dist/favicon.ico")).unwrap(), b"ico");
    }

    #[test]
    fn missing_images_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let paths = BuildPaths::new(dir.path());
        let written = copy_assets(&paths, &default_config(), &BuildOptions::default()).unwrap();
        assert!(written.is_empty());
        assert!(!paths.dist().join("assets/images").exists());
    }

    #[test]
    fn blacklisted_images_are_not_copied() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/assets/images/logo.png", b"png");
        touch(root, "src/assets/images/raw/huge.psd", b"psd");
        touch(root, "src/assets/images/icons/draft.svg", b"svg");

        let mut config = default_config();
        config.assets_blacklist.insert(
            "images".to_string(),
            AssetBlacklist {
                files: vec!["draft.svg".to_string()],
                folders: vec!["raw/**".to_string()],
            },
        );

        let paths = BuildPaths::new(root);
        copy_assets(&paths, &config, &BuildOptions::default()).unwrap();

        assert!(root.join("dist/assets/images/logo.png").exists());
        assert!(!root.join("dist/assets/images/raw").exists());
        assert!(!root.join("dist/assets/images/icons/draft.svg").exists());
    }

    #[test]
    fn skip_images_flag_leaves_images_out() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "src/assets/images/logo.png", b"png");

        let options = BuildOptions {
            skip_images: true,
            ..BuildOptions::default()
        };
        copy_assets(&BuildPaths::new(root), &default_config(), &options).unwrap();
        assert!(!root.join("dist/assets/images").exists());
    }
}
