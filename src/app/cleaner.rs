use crate::app::error::{BuildError, BuildResult};
use crate::app::models::BuildPaths;
use crate::app::scanner::{match_files, MatchOptions};
use std::fs;
use std::path::PathBuf;

/// Removes the output tree. A missing tree is already clean.
pub fn wipe(paths: &BuildPaths) -> BuildResult<()> {
    log::info!("🧹 Cleaning dist folder...");
    let dist = paths.dist();
    if !dist.exists() {
        log::debug!("{} does not exist, nothing to wipe", dist.display());
        return Ok(());
    }
    fs::remove_dir_all(&dist).map_err(|e| BuildError::io(&dist, e))
}

/// Deletes the un-minified theme CSS left beside purged output. `.min.css`
/// and `.purge.css` files always survive. Returns the removed paths.
pub fn prune_intermediate(paths: &BuildPaths) -> BuildResult<Vec<PathBuf>> {
    log::info!("🧹 Cleaning up large unminified CSS files...");

    let candidates = match_files(
        &paths.root,
        &[
            "dist/assets/css/theme/*.css",
            "!dist/assets/css/theme/*.min.css",
            "!dist/assets/css/theme/*.purge.css",
        ],
        MatchOptions::default(),
    )?;

    if candidates.is_empty() {
        log::info!("⚠️  No large CSS files to clean");
        return Ok(candidates);
    }

    for file in &candidates {
        log::debug!("Removing {}", file.display());
        fs::remove_file(file).map_err(|e| BuildError::io(file, e))?;
    }
    log::info!("✅ Large CSS files cleaned");
    Ok(candidates)
}
