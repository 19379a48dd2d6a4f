//! Plain CSS minification and beautification.
//!
//! Every CSS artifact in the build (plain stylesheets, compiled themes,
//! purged themes and stylesheets living under the JS tree) goes through
//! [`transform`], so they all share one output format.

use crate::app::error::{BuildError, BuildResult};
use crate::app::files::{read_source, write_output};
use crate::app::models::{AssetClass, BuildConfig, BuildOptions, BuildPaths};
use crate::app::patterns::{self, asset_root};
use crate::app::scanner::{match_files, MatchOptions};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// IE 9, encoded the way lightningcss encodes browser versions.
const IE9: u32 = 9 << 16;

fn legacy_targets() -> Targets {
    Targets::from(Browsers {
        ie: Some(IE9),
        ..Browsers::default()
    })
}

/// Minifies (`minify == true`) or pretty-prints a stylesheet.
///
/// Output is lowered for IE 9, so the printer never introduces syntax an
/// old renderer cannot read.
pub fn transform(input: &str, minify: bool) -> Result<String, String> {
    transform_named(input, minify, "")
}

/// Like [`transform`], with `filename` reported in recovery warnings.
///
/// Invalid rules and declarations (IE `*zoom` hacks and the like) are
/// dropped with a warning instead of failing the whole stylesheet.
pub fn transform_named(input: &str, minify: bool, filename: &str) -> Result<String, String> {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let mut sheet = StyleSheet::parse(
        input,
        ParserOptions {
            filename: filename.to_string(),
            error_recovery: true,
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    if let Ok(recovered) = warnings.read() {
        for warning in recovered.iter() {
            log::warn!("⚠️  Skipped invalid CSS: {}", warning);
        }
    }

    if minify {
        sheet
            .minify(MinifyOptions {
                targets: legacy_targets(),
                ..MinifyOptions::default()
            })
            .map_err(|e| e.to_string())?;
    }

    let printed = sheet
        .to_css(PrinterOptions {
            minify,
            targets: legacy_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    Ok(printed.code)
}

/// Reads `file`, transforms it and writes it to `dest`.
pub fn transform_file(file: &Path, dest: &Path, minify: bool) -> BuildResult<()> {
    let content = read_source(file)?;
    let name = file.display().to_string();
    let processed = transform_named(&content, minify, &name).map_err(|message| BuildError::Css {
        path: file.to_path_buf(),
        message,
    })?;
    write_output(dest, processed)
}

/// Processes `src/assets/css/**/*.css` into `dist/assets/css`.
pub fn process_css(
    paths: &BuildPaths,
    config: &BuildConfig,
    options: &BuildOptions,
) -> BuildResult<Vec<PathBuf>> {
    log::info!("🎨 Processing CSS files...");

    let mut globs = vec![format!("{}/**/*.css", asset_root(AssetClass::Css))];
    globs.extend(patterns::compile(AssetClass::Css, config));
    let files = match_files(&paths.root, &globs, MatchOptions::default())?;

    let base = paths.src().join("assets/css");
    let dest_root = paths.dist().join("assets/css");
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let Some(dest) = paths.rebase(&file, &base, &dest_root) else {
            continue;
        };
        log::debug!("CSS {} -> {}", file.display(), dest.display());
        transform_file(&file, &dest, options.minify())?;
        written.push(dest);
    }

    Ok(written)
}
